//! `checkout` step: prepare both clones of a project on the release branch

use crate::core::config::ReleaseConfig;
use crate::core::context::ReleaseContext;
use crate::core::error::{ArtifactError, ReleaseResult};
use crate::core::vcs::{RELEASE_BRANCH, SystemGit};
use crate::release::ProjectContext;
use crate::release::necessity;
use crate::release::project::packaging_name;
use tracing::info;

pub fn run_checkout(ctx: &ReleaseContext, project: &ProjectContext) -> ReleaseResult<()> {
  let user = ctx.require_user("checkout")?;
  let base_url = ctx.base_url("checkout")?;
  let runner = ctx.runner();

  let workspace = SystemGit::new(runner, ctx.work_dir());
  let code_url = project.code_url(&base_url, &ctx.target_user);
  info!("# Cloning {}", code_url);
  workspace.clone_repo(&code_url, None)?;

  let packaging_url = project.packaging_url(&base_url, &ctx.target_user);
  info!("# Cloning {}", packaging_url);
  workspace.clone_repo(&packaging_url, Some(&packaging_name(&project.name)))?;

  for path in [&project.clone_dir, &project.packaging_dir] {
    if !path.is_dir() {
      return Err(ArtifactError::CloneMissing { path: path.clone() }.into());
    }
  }

  let code = SystemGit::new(runner, &project.clone_dir);
  code.fetch_optional("origin", "release:release")?;

  if ctx.target_user != user {
    let url = code.remote_url("origin")?;
    code.set_remote_url("origin", &url.replace(user, &ctx.target_user))?;
  }

  code.create_or_checkout_branch(RELEASE_BRANCH)?;

  let packaging = SystemGit::new(runner, &project.packaging_dir);
  let necessity = necessity::evaluate(&code, &packaging, ctx.mode)?;
  if necessity.is_required() {
    info!("Release required: true ({})", necessity);
  } else {
    ReleaseConfig::persist_required(&ctx.config_path, &project.name, false)?;
    info!("Release required: false ({}, {} updated)", necessity, ctx.config_path.display());
  }

  Ok(())
}
