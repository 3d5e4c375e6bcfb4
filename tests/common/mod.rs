#![allow(dead_code)]

use anyhow::Result;
use runpack::RunpackContext;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch experiment layout for consistent test setup
///
/// ```text
/// <tmp>/data/hz9n/ICMGGhz9nINIT
/// <tmp>/data/hz9n/init/ICMSHhz9nINIT
/// <tmp>/data/ifsdata/rtables/rtable80
/// ```
pub struct TestExperiment {
    pub temp_dir: TempDir,
    pub ctx: RunpackContext,
}

impl TestExperiment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join(".config/runpack/config.toml");
        let ctx = RunpackContext::new_explicit(config_path)?;

        let experiment = Self { temp_dir, ctx };
        experiment.write("data/hz9n/ICMGGhz9nINIT", b"grid point fields")?;
        experiment.write("data/hz9n/init/ICMSHhz9nINIT", b"spectral fields")?;
        experiment.write("data/ifsdata/rtables/rtable80", b"radiation table")?;
        Ok(experiment)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root holding the experiment-specific files
    pub fn exp_root(&self) -> PathBuf {
        self.path().join("data/hz9n")
    }

    /// Root holding the shared static files
    pub fn data_root(&self) -> PathBuf {
        self.path().join("data")
    }

    pub fn input_files(&self) -> Vec<PathBuf> {
        vec![
            self.path().join("data/hz9n/ICMGGhz9nINIT"),
            self.path().join("data/hz9n/init/ICMSHhz9nINIT"),
            self.path().join("data/ifsdata/rtables/rtable80"),
        ]
    }

    pub fn write(&self, relative: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }
}
