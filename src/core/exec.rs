//! External process execution
//!
//! Every tool this crate drives (git, bumpversion, git-dpm, pristine-tar and
//! the hosting-service scripts) goes through [`CommandRunner`]. Commands are
//! built as argument vectors, never as shell strings.

use crate::core::error::{CommandError, ReleaseResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// A command line to run, with its working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
  program: String,
  args: Vec<String>,
  cwd: Option<PathBuf>,
  allow_failure: bool,
}

impl ExternalCommand {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      allow_failure: false,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// A non-zero exit is returned as output instead of aborting the run
  pub fn allow_failure(mut self) -> Self {
    self.allow_failure = true;
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn get_args(&self) -> &[String] {
    &self.args
  }

  pub fn cwd(&self) -> Option<&Path> {
    self.cwd.as_deref()
  }

  pub fn is_failure_allowed(&self) -> bool {
    self.allow_failure
  }
}

/// Characters a POSIX shell would interpret
const SHELL_SPECIAL: &[char] = &[
  '"', '\'', '(', ')', '*', '[', ']', '?', '$', ';', '&', '|', '<', '>', '`', '\\', '!',
];

fn needs_quoting(arg: &str) -> bool {
  arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || SHELL_SPECIAL.contains(&c))
}

impl fmt::Display for ExternalCommand {
  /// Shell-like rendering, suitable for copy-paste from the logs
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.program)?;
    for arg in &self.args {
      if needs_quoting(arg) {
        write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    Ok(())
  }
}

/// Captured result of a finished process (stderr folded into stdout)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
  /// Exit code, `None` when killed by a signal
  pub status: Option<i32>,
  pub output: String,
}

impl CommandOutput {
  #[cfg(test)]
  pub fn ok(output: impl Into<String>) -> Self {
    Self {
      status: Some(0),
      output: output.into(),
    }
  }

  #[cfg(test)]
  pub fn failed(status: i32, output: impl Into<String>) -> Self {
    Self {
      status: Some(status),
      output: output.into(),
    }
  }

  pub fn success(&self) -> bool {
    self.status == Some(0)
  }

  /// Output without trailing newline
  pub fn trimmed(&self) -> &str {
    self.output.trim_end()
  }
}

/// Executes external commands
pub trait CommandRunner {
  /// Run the command to completion and capture its output.
  ///
  /// Implementations only report what happened; exit codes are mapped to
  /// errors by [`CommandRunner::run`].
  fn execute(&self, command: &ExternalCommand) -> ReleaseResult<CommandOutput>;

  /// Run a command, turning an unexpected non-zero exit into an error
  fn run(&self, command: &ExternalCommand) -> ReleaseResult<CommandOutput> {
    match command.cwd() {
      Some(dir) => debug!("$ {}  (in {})", command, dir.display()),
      None => debug!("$ {}", command),
    }

    let output = self.execute(command)?;
    if output.success() || command.is_failure_allowed() {
      return Ok(output);
    }

    // The caller reports the failure once, output included
    Err(
      CommandError::Failed {
        command: command.to_string(),
        status: output.status,
        output: output.output,
      }
      .into(),
    )
  }
}

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn execute(&self, command: &ExternalCommand) -> ReleaseResult<CommandOutput> {
    let mut cmd = Command::new(command.program());
    cmd.args(command.get_args());
    if let Some(dir) = command.cwd() {
      cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|source| CommandError::Spawn {
      command: command.to_string(),
      source,
    })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(CommandOutput {
      status: output.status.code(),
      output: text,
    })
  }
}
