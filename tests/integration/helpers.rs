//! Test helpers for integration tests

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Environment variables that would leak settings into the binary under test
const ISOLATED_ENV: &[&str] = &["DEB_RELEASE_MODE", "DEB_RELEASE_DRY_RUN", "LP_CREDS", "RUST_LOG"];

/// A release directory: config file, working directory and state files
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a workspace whose `release.json` holds `projects` and `mode`
  pub fn new(projects: &[(&str, bool)], mode: Option<&str>) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    let ws = Self { _root: root, path };

    let mut config = Map::new();
    for (name, required) in projects {
      config.insert(name.to_string(), Value::Bool(*required));
    }
    if let Some(mode) = mode {
      config.insert("mode".to_string(), Value::String(mode.to_string()));
    }
    ws.write_config(config)?;

    Ok(ws)
  }

  /// Add or replace one key of `release.json`
  pub fn set_config(&self, key: &str, value: Value) -> Result<()> {
    let mut config: Map<String, Value> = serde_json::from_str(&self.read_file("release.json")?)?;
    config.insert(key.to_string(), value);
    self.write_config(config)
  }

  fn write_config(&self, config: Map<String, Value>) -> Result<()> {
    std::fs::write(self.path.join("release.json"), serde_json::to_string_pretty(&config)?)?;
    Ok(())
  }

  /// Working directory holding the clones
  pub fn work_dir(&self) -> PathBuf {
    self.path.join("src")
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    std::fs::read_to_string(self.path.join(path)).with_context(|| format!("Failed to read {}", path))
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let path = self.path.join(path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
  }

  /// Run a step with `--config release.json`, whatever its exit status
  pub fn step(&self, step: &str, extra: &[&str]) -> Result<Output> {
    let mut args = vec!["--step", step, "--config", "release.json"];
    args.extend_from_slice(extra);
    run_deb_release(&self.path, &args)
  }
}

/// Create an initialized repository with a committer identity
pub fn init_repo(path: &Path) -> Result<()> {
  std::fs::create_dir_all(path)?;
  git(path, &["init", "--initial-branch=master"])?;
  git(path, &["config", "user.name", "Test User"])?;
  git(path, &["config", "user.email", "test@example.com"])?;
  Ok(())
}

/// Write `file` and commit it
pub fn commit_file(repo: &Path, file: &str, content: &str, message: &str) -> Result<()> {
  let path = repo.join(file);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, content)?;
  git(repo, &["add", "--all"])?;
  git(repo, &["commit", "-m", message])?;
  Ok(())
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the deb-release binary. Failures are returned, not raised, so tests
/// can assert on the exit code.
pub fn run_deb_release(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_deb-release");

  let mut cmd = Command::new(bin);
  cmd.current_dir(cwd).args(args);
  for var in ISOLATED_ENV {
    cmd.env_remove(var);
  }

  cmd.output().context("Failed to run deb-release")
}

/// stderr of a finished run, where the console log goes
pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
