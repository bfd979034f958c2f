//! Error types for deb-release with contextual messages
//!
//! Every failure aborts the whole run with exit code 1. The categories only
//! exist so the report can carry a useful hint for the operator.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Process exit code used for every fatal error
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for deb-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration and argument errors
  Config(ConfigError),

  /// External command errors
  Command(CommandError),

  /// Missing or malformed release artifacts
  Artifact(ArtifactError),

  /// Batch run where every project flag is false
  NothingToRelease,

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(e) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, e),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Exit code for this error
  pub fn exit_code(&self) -> i32 {
    EXIT_FAILURE
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Command(e) => e.help_message(),
      ReleaseError::Artifact(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Command(e) => write!(f, "{}", e),
      ReleaseError::Artifact(e) => write!(f, "{}", e),
      ReleaseError::NothingToRelease => write!(f, "Release not required, aborting..."),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::Command(CommandError::Spawn { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<CommandError> for ReleaseError {
  fn from(err: CommandError) -> Self {
    ReleaseError::Command(err)
  }
}

impl From<ArtifactError> for ReleaseError {
  fn from(err: ArtifactError) -> Self {
    ReleaseError::Artifact(err)
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for ReleaseError {
  fn from(err: glob::PatternError) -> Self {
    ReleaseError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<walkdir::Error> for ReleaseError {
  fn from(err: walkdir::Error) -> Self {
    ReleaseError::message(format!("Directory walk error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Release config file not found
  NotFound { path: PathBuf },

  /// Release config file is not valid JSON for the expected shape
  Invalid { path: PathBuf, reason: String },

  /// Neither `--mode`, `DEB_RELEASE_MODE` nor the config provides a mode
  MissingMode,

  /// A step needs a command-line argument that was not given
  MissingArgument { flag: &'static str, step: String },

  /// Project not listed in the release config
  ProjectNotFound { name: String },

  /// `.bumpversion.cfg` missing or without `current_version`
  Bumpversion { project: String, path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Pass the release settings file with `--config <path>`.".to_string()),
      ConfigError::MissingMode => {
        Some("Use `--mode testing|stable`, set DEB_RELEASE_MODE, or add \"mode\" to the config.".to_string())
      }
      ConfigError::ProjectNotFound { name } => Some(format!(
        "Add \"{}\": true to the release config to include it in the release.",
        name
      )),
      ConfigError::Bumpversion { .. } => {
        Some("Run the `checkout` step first, or check the [bumpversion] section of the project.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => {
        write!(f, "Release config not found: {}", path.display())
      }
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid release config {}: {}", path.display(), reason)
      }
      ConfigError::MissingMode => write!(f, "Release mode is not set"),
      ConfigError::MissingArgument { flag, step } => {
        write!(f, "The {} step requires {}", step, flag)
      }
      ConfigError::ProjectNotFound { name } => {
        write!(f, "Project '{}' not found in release config", name)
      }
      ConfigError::Bumpversion { project, path } => {
        write!(f, "{} .bumpversion.cfg not found ({})", project, path.display())
      }
    }
  }
}

/// External command errors
#[derive(Debug)]
pub enum CommandError {
  /// The program could not be started at all
  Spawn { command: String, source: io::Error },

  /// The program exited with a non-zero status
  Failed {
    command: String,
    status: Option<i32>,
    output: String,
  },
}

impl CommandError {
  fn help_message(&self) -> Option<String> {
    match self {
      CommandError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
        Some("Make sure git, bumpversion, git-dpm and pristine-tar are installed and on PATH.".to_string())
      }
      CommandError::Failed { output, .. } => {
        if output.contains("Permission denied (publickey)") {
          Some("Check the SSH key registered for --user on the hosting service.".to_string())
        } else if output.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Run the cleanup and checkout steps again.".to_string())
        } else {
          None
        }
      }
      _ => None,
    }
  }
}

impl fmt::Display for CommandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandError::Spawn { command, source } => {
        write!(f, "Failed to execute {}: {}", command, source)
      }
      CommandError::Failed { command, status, output } => {
        match status {
          Some(code) => write!(f, "Command '{}' returned non-zero exit status {}.", command, code)?,
          None => write!(f, "Command '{}' was terminated by a signal.", command)?,
        }
        if !output.trim().is_empty() {
          write!(f, "\n{}", output.trim_end())?;
        }
        Ok(())
      }
    }
  }
}

/// Release artifact errors
#[derive(Debug)]
pub enum ArtifactError {
  /// A repository clone did not produce the expected directory
  CloneMissing { path: PathBuf },

  /// No sdist tarball matching the release version
  TarballMissing { project: String, pattern: String },

  /// bumpversion output had no `new_version=` line
  BumpOutput { project: String, output: String },
}

impl ArtifactError {
  fn help_message(&self) -> Option<String> {
    match self {
      ArtifactError::TarballMissing { .. } => Some("Run the sdist step before dpm.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ArtifactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArtifactError::CloneMissing { path } => write!(f, "Unable to clone {}", path.display()),
      ArtifactError::TarballMissing { project, pattern } => {
        write!(f, "{} sdist tarball not found ({})", project, pattern)
      }
      ArtifactError::BumpOutput { project, output } => {
        write!(f, "{}: no new_version in bumpversion output:\n{}", project, output.trim_end())
      }
    }
  }
}

/// Result type alias for deb-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Report an error through the active logging layers
pub fn report_error(error: &ReleaseError) {
  tracing::error!("{}", error);

  if let Some(help) = error.help_message() {
    tracing::info!("Help: {}", help);
  }
}
