#![allow(dead_code)]
// Shared setup for CLI tests: a temp HOME with an rc file and a data file.

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::test_env;

pub struct TestEnv {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl TestEnv {
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("leadconverter").unwrap();
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn read_data(&self) -> serde_json::Value {
        let content = fs::read_to_string(&self.data_path).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

/// Create a temporary HOME whose rc points at a data file holding `data`.
/// Extra rc lines are appended verbatim.
pub fn setup_test_env(data: serde_json::Value, extra_rc: &str) -> TestEnv {
    let guard = test_env::lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().join("data.json");
    fs::write(&data_path, serde_json::to_string_pretty(&data).unwrap()).unwrap();

    let config_dir = temp_dir.path().join(".leadconverter");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\n{}", data_path.display(), extra_rc),
    )
    .unwrap();

    std::env::set_var("HOME", temp_dir.path().to_str().unwrap());
    TestEnv { temp_dir, data_path, _guard: guard }
}
