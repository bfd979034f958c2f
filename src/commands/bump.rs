//! `bump` and `open` steps: version changes in the code repository

use crate::core::config::{Mode, STABLE_TAG_GLOB};
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::vcs::SystemGit;
use crate::release::bumpversion::{self, BumpPart};
use crate::release::{ProjectContext, VersionRecord, VersionStore};
use crate::ui::banner;
use tracing::debug;

/// Bump to the next release version, commit, record and tag it
pub fn run_bump(ctx: &ReleaseContext, project: &ProjectContext) -> ReleaseResult<()> {
  let runner = ctx.runner();
  let current = bumpversion::read_current_version(&project.name, &project.clone_dir)?;
  let sequence = bumpversion::bump_sequence(ctx.mode, &current);
  let new = bumpversion::apply_sequence(runner, &project.name, &project.clone_dir, sequence)?;

  let git = SystemGit::new(runner, &project.clone_dir);
  git.add_all()?;
  git.commit(&format!("Bump to v{}", new))?;

  let last_stable = git.require_tag(STABLE_TAG_GLOB)?;
  let mut store = VersionStore::load(&ctx.versions_path())?;
  store.record(
    &project.name,
    VersionRecord {
      current,
      last_stable: last_stable.strip_prefix('v').unwrap_or(&last_stable).to_string(),
      new: new.clone(),
    },
  );
  store.save()?;

  git.tag(&format!("v{}", new), &format!("Release {} v{}", project.name, new))?;

  banner(&format!("Bump {} to version {}", project.name, new));
  Ok(())
}

/// Open the next minor version for development after a stable release
pub fn run_open(ctx: &ReleaseContext, project: &ProjectContext) -> ReleaseResult<()> {
  banner(&format!("Open {} next version for development...", project.name));
  if ctx.mode != Mode::Stable {
    debug!("{} mode: {} stays on its release candidate", ctx.mode, project.name);
    return Ok(());
  }

  let dev_version = bumpversion::bump(ctx.runner(), &project.name, &project.clone_dir, BumpPart::Minor)?;

  let git = SystemGit::new(ctx.runner(), &project.clone_dir);
  git.add_all()?;
  git.commit(&format!("increment version to v{}", dev_version))?;

  banner(&format!("Bump {} to version {}", project.name, dev_version));
  Ok(())
}
