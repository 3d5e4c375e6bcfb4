//! Command-line interface definitions for runpack.
//!
//! The CLI definitions are shared between the main binary and the xtask
//! man page generator.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for runpack.
#[derive(Parser)]
#[command(
    name = "runpack",
    version = crate::VERSION,
    about = "Track, package and restore simulation input files",
    long_about = "Records the input files an experiment depends on by content checksum, \
                  relocates them across search roots and packages them as archives"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Track input files in a manifest, creating it if needed
    Add {
        /// Manifest file to create or extend
        #[arg(short, long)]
        manifest: PathBuf,

        /// Experiment id for a new manifest
        #[arg(short, long)]
        experiment: Option<String>,

        /// Source roots to search, in priority order (default: configured roots)
        #[arg(short, long = "root")]
        roots: Vec<PathBuf>,

        /// Skip hashing and keep files where they are
        #[arg(long)]
        no_metadata: bool,

        /// Files to track
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List the files recorded in a manifest
    Show {
        /// Manifest file to read
        #[arg(short, long)]
        manifest: PathBuf,

        /// Re-hash every file and fail on mismatch
        #[arg(long)]
        verify: bool,
    },

    /// Re-attach tracked files to new source roots
    Rebase {
        /// Manifest file to update in place
        #[arg(short, long)]
        manifest: PathBuf,

        /// New source roots, in priority order
        #[arg(short, long = "root", required = true)]
        roots: Vec<PathBuf>,

        /// Also relocate shared static files
        #[arg(long)]
        include_static: bool,

        /// Only replace the roots, leave file locations untouched
        #[arg(long)]
        keep_files: bool,
    },

    /// Package tracked files as one archive per source root
    Pack {
        /// Manifest listing the files to package
        #[arg(short, long)]
        manifest: PathBuf,

        /// Directory to write archives into
        #[arg(short, long)]
        output: PathBuf,

        /// Also package shared static files
        #[arg(long)]
        include_static: bool,
    },

    /// Restore tracked files from archives
    Unpack {
        /// Manifest written alongside the archives
        #[arg(short, long)]
        manifest: PathBuf,

        /// Directories searched recursively for archives, in order
        #[arg(short, long = "search", required = true)]
        search_dirs: Vec<PathBuf>,

        /// Directory to extract into
        #[arg(short, long)]
        output: PathBuf,

        /// Directory holding, or receiving, shared static files (default: output directory)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Also restore shared static files
        #[arg(long)]
        include_static: bool,

        /// Keep files that fail checksum verification instead of aborting
        #[arg(long)]
        no_verify: bool,
    },

    /// Print where each tracked file goes in a run directory
    Plan {
        /// Manifest listing the files to place
        #[arg(short, long)]
        manifest: PathBuf,

        /// Run directory to prefix destinations with
        #[arg(long)]
        rundir: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
