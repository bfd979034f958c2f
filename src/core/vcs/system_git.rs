//! System git backend
//!
//! Thin wrapper building `git` invocations for one working tree. Everything
//! goes through a [`CommandRunner`], so tests can swap in a fake.

use crate::core::error::ReleaseResult;
use crate::core::exec::{CommandOutput, CommandRunner, ExternalCommand};
use std::path::PathBuf;

/// Git operations rooted at a working directory
pub struct SystemGit<'r> {
  pub(crate) runner: &'r dyn CommandRunner,

  /// Directory every git command runs in
  pub(crate) work_tree: PathBuf,
}

impl<'r> SystemGit<'r> {
  pub fn new(runner: &'r dyn CommandRunner, work_tree: impl Into<PathBuf>) -> Self {
    Self {
      runner,
      work_tree: work_tree.into(),
    }
  }

  /// Clone `url` into the working directory, optionally under another name.
  ///
  /// Returns false when git failed, e.g. because the destination already
  /// exists. Callers check the resulting directory themselves.
  pub fn clone_repo(&self, url: &str, dest: Option<&str>) -> ReleaseResult<bool> {
    let mut cmd = self.git_cmd().args(["clone", url]);
    if let Some(dest) = dest {
      cmd = cmd.arg(dest);
    }
    Ok(self.try_run(cmd)?.success())
  }

  /// Latest tag reachable from HEAD matching `pattern`, if any
  pub fn describe_tag(&self, pattern: &str) -> ReleaseResult<Option<String>> {
    let output = self.runner.run(
      &self
        .git_cmd()
        .args(["describe", "--abbrev=0", "--tags", "--match", pattern])
        .allow_failure(),
    )?;

    if !output.success() {
      return Ok(None);
    }

    let tag = output.trimmed().trim();
    Ok((!tag.is_empty()).then(|| tag.to_string()))
  }

  /// Like [`SystemGit::describe_tag`], but a missing tag aborts the run
  pub fn require_tag(&self, pattern: &str) -> ReleaseResult<String> {
    let output = self
      .runner
      .run(&self.git_cmd().args(["describe", "--abbrev=0", "--tags", "--match", pattern]))?;
    Ok(output.trimmed().trim().to_string())
  }

  /// Full diff against `rev`, restricted to `pathspec`
  pub fn diff(&self, rev: &str, pathspec: &[&str]) -> ReleaseResult<String> {
    let mut cmd = self.git_cmd().args(["diff", rev]);
    if !pathspec.is_empty() {
      cmd = cmd.arg("--").args(pathspec.iter().copied());
    }
    Ok(self.runner.run(&cmd)?.output)
  }

  /// Names of the files changed since `rev`
  pub fn diff_name_only(&self, rev: &str) -> ReleaseResult<String> {
    Ok(self.runner.run(&self.git_cmd().args(["diff", rev, "--name-only"]))?.output)
  }

  /// Number of commits on `left` that are not on `right`.
  ///
  /// A failed probe (e.g. missing branch) counts as zero.
  pub fn commits_behind(&self, left: &str, right: &str) -> ReleaseResult<u32> {
    let output = self.runner.run(
      &self
        .git_cmd()
        .args(["rev-list", "--left-only", "--count"])
        .arg(format!("{}...{}", left, right))
        .allow_failure(),
    )?;
    Ok(output.trimmed().trim().parse().unwrap_or(0))
  }

  /// Merge `branch` into the current branch, resolving conflicts in its favor
  pub fn merge_favoring(&self, branch: &str) -> ReleaseResult<()> {
    self
      .runner
      .run(&self.git_cmd().args(["merge", branch, "-s", "recursive", "-Xtheirs"]))?;
    Ok(())
  }

  /// `git add --all`
  pub fn add_all(&self) -> ReleaseResult<()> {
    self.runner.run(&self.git_cmd().args(["add", "--all"]))?;
    Ok(())
  }

  pub fn commit(&self, message: &str) -> ReleaseResult<()> {
    self.runner.run(&self.git_cmd().args(["commit", "-m", message]))?;
    Ok(())
  }

  /// Create an annotated tag
  pub fn tag(&self, name: &str, message: &str) -> ReleaseResult<()> {
    self.runner.run(&self.git_cmd().args(["tag", name, "-m", message]))?;
    Ok(())
  }

  /// One `+ <subject>` line per non-merge commit in `range`
  pub fn log_subjects(&self, range: &str) -> ReleaseResult<String> {
    Ok(
      self
        .runner
        .run(&self.git_cmd().args(["log", "--no-merges", "--pretty=format:+ %s", range]))?
        .output,
    )
  }

  /// Base command with the working directory set
  pub(crate) fn git_cmd(&self) -> ExternalCommand {
    ExternalCommand::new("git").current_dir(&self.work_tree)
  }

  /// Run a prepared command, tolerating failure
  pub(crate) fn try_run(&self, cmd: ExternalCommand) -> ReleaseResult<CommandOutput> {
    self.runner.run(&cmd.allow_failure())
  }
}
