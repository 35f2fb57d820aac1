use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Scratch directory holding a config file and its database.
pub struct TempConfig {
    dir: TempDir,
    path: PathBuf,
}

impl TempConfig {
    /// Write `body` followed by a `[history]` section pointing into the temp
    /// dir.
    pub fn with_body(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let database = dir.path().join("rounds.db");
        let contents = format!(
            "{body}\n\n[history]\ndatabase = \"{}\"\n",
            database.display()
        );
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("write temp config");
        Self { dir, path }
    }

    /// Write `contents` verbatim.
    pub fn raw(contents: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("write temp config");
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database(&self) -> PathBuf {
        self.dir.path().join("rounds.db")
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
