//! `push` and `merge` steps

use crate::core::config::Mode;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::exec::ExternalCommand;
use crate::core::vcs::{RELEASE_BRANCH, SystemGit};
use crate::release::ProjectContext;
use crate::ui::banner;
use tracing::{debug, info};

/// Push the release branch and tags, then the whole packaging repository
pub fn run_push(ctx: &ReleaseContext, project: &ProjectContext) -> ReleaseResult<()> {
  banner(&format!(
    "Push {} code and packaging repositories to Launchpad...",
    project.name
  ));
  let base_url = ctx.base_url("push")?;
  let code_url = project.code_url(&base_url, &ctx.target_user);
  let packaging_url = project.packaging_url(&base_url, &ctx.target_user);

  let code = SystemGit::new(ctx.runner(), &project.clone_dir);
  code.push(&code_url, &[RELEASE_BRANCH, "--tags"], ctx.dry_run)?;

  let packaging = SystemGit::new(ctx.runner(), &project.packaging_dir);
  packaging.push(&packaging_url, &["--all"], ctx.dry_run)?;
  packaging.push(&packaging_url, &["--tags"], ctx.dry_run)?;
  Ok(())
}

/// Propose the release branch for merging into master, wait for the merge,
/// then delete the remote release branch
pub fn run_merge(ctx: &ReleaseContext, project: &ProjectContext) -> ReleaseResult<()> {
  banner(&format!("Merge the {} release branch into master...", project.name));
  if ctx.mode != Mode::Stable {
    debug!("{} mode: {} release branch is kept", ctx.mode, project.name);
    return Ok(());
  }

  let base_url = ctx.base_url("merge")?;
  let code_url = project.code_url(&base_url, &ctx.target_user);
  let code = SystemGit::new(ctx.runner(), &project.clone_dir);

  if ctx.dry_run {
    return code.delete_remote_branch(&code_url, RELEASE_BRANCH, true);
  }

  let credentials = ctx.require_credentials("merge")?;
  let output = ctx.runner().run(
    &ExternalCommand::new(ctx.script("lp-propose-merge").to_string_lossy())
      .arg(format!("~{}/{}", ctx.target_user, project.name))
      .arg("-s")
      .args(["--merged-timeout".to_string(), ctx.config.merge_timeout.to_string()])
      .args(["--credentials", credentials]),
  )?;
  info!("{}", output.trimmed());

  code.delete_remote_branch(&code_url, RELEASE_BRANCH, false)
}
