//! `changelog` step

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::core::vcs::SystemGit;
use crate::release::{ProjectContext, VersionStore};
use crate::ui::banner;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// Append the commit subjects between the last stable and the new version
/// of every released project to the changelog file
pub fn run_changelog(ctx: &ReleaseContext) -> ReleaseResult<()> {
  banner("Create the changelog...");
  let store = VersionStore::load(&ctx.versions_path())?;
  let work_dir = ctx.work_dir();
  let changelog_path = ctx.changelog_path();

  for name in ctx.config.required_projects() {
    let Some(record) = store.get(name) else {
      continue;
    };

    let project = ProjectContext::new(&work_dir, name);
    let range = format!("v{}...v{}", record.last_stable, record.new);
    let log = SystemGit::new(ctx.runner(), &project.clone_dir).log_subjects(&range)?;
    if log.is_empty() {
      continue;
    }

    debug!("# {}: {}", name, range);
    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&changelog_path)
      .with_context(|| format!("Failed to open {}", changelog_path.display()))?;
    write!(file, "\n{}:\n{}\n", name, log).with_context(|| format!("Failed to write {}", changelog_path.display()))?;
  }

  Ok(())
}
