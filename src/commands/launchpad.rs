//! `build` and `milestone` steps, run through the hosting-service helper scripts

use crate::core::config::Mode;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::exec::ExternalCommand;
use crate::release::{ProjectContext, VersionStore};
use crate::ui::banner;
use tracing::{debug, info, warn};

/// Update the project recipe to the new version and kick off the builds
pub fn run_build(ctx: &ReleaseContext, project: &ProjectContext) -> ReleaseResult<()> {
  banner(&format!(
    "Update {} {} PPA recipe and kick-off the builds",
    project.name, ctx.mode
  ));

  let Some(new_version) = released_version(ctx, project, "build")? else {
    return Ok(());
  };

  let credentials = ctx.require_credentials("build")?;
  let output = ctx.runner().run(
    &ExternalCommand::new(ctx.script("lp-recipe-update-build").to_string_lossy())
      .arg(&project.name)
      .args(["--recipe".to_string(), format!("{}-{}", project.name, ctx.mode)])
      .args(["-n", new_version.as_str()])
      .args(["--credentials", credentials]),
  )?;
  info!("{}", output.trimmed());
  Ok(())
}

/// Release the milestone of the new version (stable releases only)
pub fn run_milestone(ctx: &ReleaseContext, project: &ProjectContext) -> ReleaseResult<()> {
  banner(&format!("Release the {} current milestone...", project.name));
  if ctx.mode != Mode::Stable {
    debug!("{} mode: no milestone to release for {}", ctx.mode, project.name);
    return Ok(());
  }

  let Some(new_version) = released_version(ctx, project, "milestone")? else {
    return Ok(());
  };

  let credentials = ctx.require_credentials("milestone")?;
  let output = ctx.runner().run(
    &ExternalCommand::new(ctx.script("lp-release-milestone").to_string_lossy())
      .arg(&project.name)
      .args(["-m", new_version.as_str()])
      .args(["--credentials", credentials]),
  )?;
  info!("{}", output.trimmed());
  Ok(())
}

/// Version recorded by `bump`, or `None` when the step has to be skipped
fn released_version(ctx: &ReleaseContext, project: &ProjectContext, step: &str) -> ReleaseResult<Option<String>> {
  let store = VersionStore::load(&ctx.versions_path())?;
  let Some(new_version) = store.new_version(&project.name) else {
    warn!("# Skipping {} {} step", project.name, step);
    return Ok(None);
  };

  if ctx.dry_run {
    info!("# Dry run: Skipping {} {} {} step", project.name, new_version, step);
    return Ok(None);
  }

  Ok(Some(new_version.to_string()))
}
