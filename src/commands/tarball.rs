//! `sdist` and `dpm` steps: source tarball and its import into packaging

use crate::core::context::ReleaseContext;
use crate::core::error::{ArtifactError, ReleaseResult, ResultExt};
use crate::core::exec::ExternalCommand;
use crate::release::ProjectContext;
use crate::release::bumpversion;
use crate::release::project::debian_version;
use crate::ui::banner;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Build entrypoints, in order of preference
const SDIST_ENTRYPOINTS: &[&str] = &["manage.py", "setup.py"];

/// Create the source tarball under `<clone>/dist`
pub fn run_sdist(ctx: &ReleaseContext, project: &ProjectContext) -> ReleaseResult<()> {
  banner(&format!("Create {} source tarball...", project.name));
  let version = bumpversion::read_current_version(&project.name, &project.clone_dir)?;

  let Some(entrypoint) = SDIST_ENTRYPOINTS.iter().find(|e| project.clone_dir.join(e).is_file()) else {
    warn!("{}: neither manage.py nor setup.py found, no tarball built", project.name);
    return Ok(());
  };

  ctx.runner().run(
    &ExternalCommand::new(format!("./{}", entrypoint))
      .arg("sdist")
      .current_dir(&project.clone_dir),
  )?;
  info!("{} {} source tarball created", project.name, version);
  Ok(())
}

/// Copy the release tarball to its orig name and run the git-dpm import
pub fn run_dpm(ctx: &ReleaseContext, project: &ProjectContext) -> ReleaseResult<()> {
  banner(&format!("Do the git-dpm dance ({})...", project.name));
  let version = bumpversion::read_current_version(&project.name, &project.clone_dir)?;
  let deb_version = debian_version(&version);

  let tarball = find_tarball(project, &version)?;
  let orig_name = project.orig_tarball_name(&version);
  let orig_path = ctx.work_dir().join(&orig_name);
  fs::copy(&tarball, &orig_path)
    .with_context(|| format!("Failed to copy {} to {}", tarball.display(), orig_path.display()))?;

  let orig = format!("../{}", orig_name);
  let changelog_version = format!("{}-1", deb_version);
  let commands: [&[&str]; 7] = [
    &["git-dpm", "import-new-upstream", orig.as_str()],
    &["pristine-tar", "commit", orig.as_str()],
    &["git-dpm", "prepare"],
    &["git-dpm", "rebase-patched"],
    &[
      "git-dpm",
      "dch",
      "--",
      "-v",
      changelog_version.as_str(),
      "-D",
      "UNRELEASED",
      "new upstream version",
    ],
    &["git-dpm", "status"],
    &["git-dpm", "tag"],
  ];

  for argv in commands {
    ctx.runner().run(
      &ExternalCommand::new(argv[0])
        .args(argv[1..].iter().copied())
        .current_dir(&project.packaging_dir),
    )?;
  }
  Ok(())
}

/// Last `<clone>/dist/*<version>.tar.gz`
fn find_tarball(project: &ProjectContext, version: &str) -> ReleaseResult<PathBuf> {
  let dist = glob::Pattern::escape(&project.clone_dir.join("dist").to_string_lossy());
  let pattern = format!("{}/*{}.tar.gz", dist, glob::Pattern::escape(version));

  let mut matches: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(Result::ok).collect();
  matches.sort();
  matches.pop().ok_or_else(|| {
    ArtifactError::TarballMissing {
      project: project.name.clone(),
      pattern: display_pattern(&project.clone_dir, version),
    }
    .into()
  })
}

fn display_pattern(clone_dir: &Path, version: &str) -> String {
  format!("{}/dist/*{}.tar.gz", clone_dir.display(), version)
}
