//! Additional operations for SystemGit (remotes, branches, pushes)

use super::system_git::SystemGit;
use crate::core::error::ReleaseResult;
use crate::core::exec::ExternalCommand;

impl SystemGit<'_> {
  /// Fetch `refspec` from `remote`; a missing remote ref is not an error
  pub fn fetch_optional(&self, remote: &str, refspec: &str) -> ReleaseResult<bool> {
    let output = self.try_run(self.git_cmd().args(["fetch", remote, refspec]))?;
    Ok(output.success())
  }

  /// Get remote URL
  pub fn remote_url(&self, name: &str) -> ReleaseResult<String> {
    let output = self.runner.run(&self.git_cmd().args(["remote", "get-url", name]))?;
    Ok(output.trimmed().trim().to_string())
  }

  pub fn set_remote_url(&self, name: &str, url: &str) -> ReleaseResult<()> {
    self.runner.run(&self.git_cmd().args(["remote", "set-url", name, url]))?;
    Ok(())
  }

  /// Create and checkout a branch. Returns false if it could not be created.
  pub fn try_create_branch(&self, branch_name: &str) -> ReleaseResult<bool> {
    let output = self.try_run(self.git_cmd().args(["checkout", "-b", branch_name]))?;
    Ok(output.success())
  }

  /// Checkout a branch
  pub fn checkout_branch(&self, branch_name: &str) -> ReleaseResult<()> {
    self.runner.run(&self.git_cmd().args(["checkout", branch_name]))?;
    Ok(())
  }

  /// Checkout `branch_name`, creating it on first use
  pub fn create_or_checkout_branch(&self, branch_name: &str) -> ReleaseResult<()> {
    if !self.try_create_branch(branch_name)? {
      self.checkout_branch(branch_name)?;
    }
    Ok(())
  }

  /// Push `refs` to `url`. With `dry_run` the remote is left untouched.
  pub fn push(&self, url: &str, refs: &[&str], dry_run: bool) -> ReleaseResult<()> {
    self.runner.run(&self.push_cmd(url, refs, dry_run))?;
    Ok(())
  }

  /// Delete `branch` on the remote at `url`.
  ///
  /// A dry run is allowed to fail, e.g. when the branch was never pushed.
  pub fn delete_remote_branch(&self, url: &str, branch: &str, dry_run: bool) -> ReleaseResult<()> {
    let cmd = self.push_cmd(url, &["--delete", branch], dry_run);
    if dry_run {
      self.try_run(cmd)?;
    } else {
      self.runner.run(&cmd)?;
    }
    Ok(())
  }

  fn push_cmd(&self, url: &str, refs: &[&str], dry_run: bool) -> ExternalCommand {
    let mut cmd = self.git_cmd().arg("push");
    if dry_run {
      cmd = cmd.arg("--dry-run");
    }
    cmd.arg(url).args(refs.iter().copied())
  }
}
