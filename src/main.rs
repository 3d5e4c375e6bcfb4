use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use runpack::cli::{Cli, Commands};
use runpack::output::{self, Verbosity};
use runpack::tracking::ImportOptions;
use runpack::{LOG_ENV, RunpackContext, commands};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = if cli.verbose {
        Verbosity::Verbose
    } else if cli.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };
    output::set_verbosity(verbosity);

    // Completions must work without a readable configuration
    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let ctx = RunpackContext::new()?;
    init_logging(verbosity, &ctx.config.log.level);

    match cli.command {
        Commands::Add {
            manifest,
            experiment,
            roots,
            no_metadata,
            paths,
        } => commands::add::execute(
            &ctx,
            &manifest,
            experiment.as_deref(),
            &roots,
            &paths,
            !no_metadata,
        )?,
        Commands::Show { manifest, verify } => commands::show::execute(&ctx, &manifest, verify)?,
        Commands::Rebase {
            manifest,
            roots,
            include_static,
            keep_files,
        } => commands::rebase::execute(&ctx, &manifest, &roots, include_static, !keep_files)?,
        Commands::Pack {
            manifest,
            output,
            include_static,
        } => commands::pack::execute(&ctx, &manifest, &output, include_static)?,
        Commands::Unpack {
            manifest,
            search_dirs,
            output,
            static_dir,
            include_static,
            no_verify,
        } => {
            let options = ImportOptions {
                include_static,
                static_dir,
                verify_checksum: !no_verify,
                static_marker: None,
            };
            commands::unpack::execute(&ctx, &manifest, &search_dirs, &output, &options)?;
        }
        Commands::Plan { manifest, rundir } => {
            commands::plan::execute(&ctx, &manifest, rundir.as_deref())?;
        }
        Commands::Completion { shell } => print_completions(shell, &mut Cli::command()),
    }

    Ok(())
}

/// Install the global tracing subscriber
///
/// `RUNPACK_LOG` wins over the configured level; `--verbose` and `--quiet`
/// win over both.
fn init_logging(verbosity: Verbosity, configured: &str) {
    let filter = match verbosity {
        Verbosity::Verbose => EnvFilter::new("debug"),
        Verbosity::Quiet => EnvFilter::new("error"),
        Verbosity::Normal => EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(configured))
            .unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
