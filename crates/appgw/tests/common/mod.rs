use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch config and log directories for one CLI run
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("config")).unwrap();
        Self { root }
    }

    pub fn write_config(&self, environment: &str, content: &str) {
        let path = self.config_dir().join(format!("{}.json", environment));
        fs::write(path, content).unwrap();
    }

    /// Write `<environment>.json` into a directory under the project root
    pub fn write_config_in(&self, dir: &str, environment: &str, content: &str) -> PathBuf {
        let dir = self.root.path().join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.json", environment)), content).unwrap();
        dir
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.path().join("config")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.path().join("logs")
    }

    /// Contents of every run log written so far
    pub fn logs(&self) -> String {
        read_all(&self.log_dir())
    }
}

fn read_all(dir: &Path) -> String {
    let Ok(entries) = fs::read_dir(dir) else {
        return String::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| fs::read_to_string(e.path()).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}
