//! Release context - build once, pass everywhere
//!
//! `ReleaseContext` gathers everything a step needs: the loaded release
//! config, the resolved command-line settings and the command runner. It is
//! built once in main.rs and handed to the step handlers by reference.

use crate::core::config::{Mode, ReleaseConfig};
use crate::core::error::{ConfigError, ReleaseResult};
use crate::core::exec::CommandRunner;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line settings that feed the context
#[derive(Debug, Clone, Default)]
pub struct Settings {
  pub config_path: PathBuf,
  /// `--mode` or `DEB_RELEASE_MODE`
  pub mode: Option<Mode>,
  /// `--dry-run` or `DEB_RELEASE_DRY_RUN`
  pub dry_run: bool,
  pub user: Option<String>,
  pub target_user: String,
  pub credentials: Option<String>,
}

/// Shared state of one invocation
#[derive(Clone)]
pub struct ReleaseContext {
  /// Directory every relative path in the config is resolved against
  pub root: PathBuf,

  pub config_path: PathBuf,

  pub config: Arc<ReleaseConfig>,

  /// Command line first, then the config file
  pub mode: Mode,

  /// Set by either the command line or the config file
  pub dry_run: bool,

  pub user: Option<String>,

  pub target_user: String,

  pub credentials: Option<String>,

  pub runner: Arc<dyn CommandRunner>,
}

impl ReleaseContext {
  /// Load the config and resolve the settings against it
  pub fn build(root: &Path, settings: Settings, runner: Arc<dyn CommandRunner>) -> ReleaseResult<Self> {
    let config_path = root.join(&settings.config_path);
    let config = ReleaseConfig::load(&config_path)?;
    Self::from_config(root, config_path, config, settings, runner)
  }

  pub fn from_config(
    root: &Path,
    config_path: PathBuf,
    config: ReleaseConfig,
    settings: Settings,
    runner: Arc<dyn CommandRunner>,
  ) -> ReleaseResult<Self> {
    let mode = settings.mode.or(config.mode).ok_or(ConfigError::MissingMode)?;
    let dry_run = settings.dry_run || config.dry_run;

    Ok(Self {
      root: root.to_path_buf(),
      config_path,
      config: Arc::new(config),
      mode,
      dry_run,
      user: settings.user,
      target_user: settings.target_user,
      credentials: settings.credentials,
      runner,
    })
  }

  pub fn runner(&self) -> &dyn CommandRunner {
    self.runner.as_ref()
  }

  /// Directory holding every clone
  pub fn work_dir(&self) -> PathBuf {
    self.root.join(&self.config.work_dir)
  }

  pub fn versions_path(&self) -> PathBuf {
    self.root.join(&self.config.versions_file)
  }

  pub fn changelog_path(&self) -> PathBuf {
    self.root.join(&self.config.changelog_file)
  }

  pub fn projects_path(&self) -> PathBuf {
    self.root.join(&self.config.projects_file)
  }

  /// Path of a hosting-service helper script
  pub fn script(&self, name: &str) -> PathBuf {
    self.config.scripts_dir.join(name)
  }

  /// Hosting-service user, required by `step`
  pub fn require_user(&self, step: &str) -> ReleaseResult<&str> {
    self.user.as_deref().ok_or_else(|| {
      ConfigError::MissingArgument {
        flag: "--user",
        step: step.to_string(),
      }
      .into()
    })
  }

  /// `git+ssh://<user>@<host>`, for steps that talk to the hosting service
  pub fn base_url(&self, step: &str) -> ReleaseResult<String> {
    let user = self.require_user(step)?;
    Ok(format!("git+ssh://{}@{}", user, self.config.git_host))
  }

  /// Credentials for the helper scripts
  pub fn require_credentials(&self, step: &str) -> ReleaseResult<&str> {
    self.credentials.as_deref().ok_or_else(|| {
      ConfigError::MissingArgument {
        flag: "--credentials",
        step: step.to_string(),
      }
      .into()
    })
  }
}
