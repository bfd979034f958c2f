//! `clone` step: fetch the monorepo and record its packaged projects

use crate::core::config::write_json_pretty;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::core::vcs::SystemGit;
use crate::release::discovery::discover;
use crate::ui::banner;
use std::fs;
use tracing::{info, warn};

/// Clone `origin` into an empty working directory, then discover the
/// packaged projects and write them to the projects file
pub fn run_clone(ctx: &ReleaseContext) -> ReleaseResult<()> {
  let work_dir = ctx.work_dir();
  if !work_dir.is_dir() {
    return Err(ReleaseError::with_help(
      format!("Working directory {} does not exist", work_dir.display()),
      "Run the cleanup step first",
    ));
  }

  let is_empty = fs::read_dir(&work_dir)
    .with_context(|| format!("Failed to read {}", work_dir.display()))?
    .next()
    .is_none();

  if is_empty {
    banner(&format!("Cloning {} ...", ctx.config.origin));
    let workspace = SystemGit::new(ctx.runner(), &work_dir);
    if !workspace.clone_repo(&ctx.config.origin, None)? {
      warn!("Unable to clone {}", ctx.config.origin);
    }
  }

  let projects = discover(ctx.runner(), &work_dir, ctx.mode)?;
  for project in &projects {
    info!(
      "{} {} {} {}",
      project.path,
      project.name,
      project.last_tag,
      work_dir.join(&project.repository).display()
    );
  }

  write_json_pretty(&ctx.projects_path(), &projects)?;
  info!("{} packaged project(s) written to {}", projects.len(), ctx.projects_path().display());
  Ok(())
}
