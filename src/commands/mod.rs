//! Release step handlers
//!
//! ## Workspace steps
//! - **cleanup**: recreate the working directory
//! - **clone**: clone the monorepo and discover packaged projects
//! - **changelog**: append the release notes of every released project
//!
//! ## Project steps
//! - **checkout**: clone code and packaging repositories, decide if a release is needed
//! - **bump**, **open**: version bumps in the code repository
//! - **sdist**, **dpm**: source tarball and packaging import
//! - **push**, **merge**: publish to the hosting service
//! - **build**, **milestone**: hosting-service helper scripts
//!
//! Project steps only run for projects whose release flag is set. All
//! handlers take `&ReleaseContext` so the config is loaded once per run.

pub mod bump;
pub mod changelog;
pub mod checkout;
pub mod cleanup;
pub mod clone;
pub mod launchpad;
pub mod publish;
pub mod tarball;

pub use bump::{run_bump, run_open};
pub use changelog::run_changelog;
pub use checkout::run_checkout;
pub use cleanup::run_cleanup;
pub use clone::run_clone;
pub use launchpad::{run_build, run_milestone};
pub use publish::{run_merge, run_push};
pub use tarball::{run_dpm, run_sdist};

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::release::{ProjectContext, Step};
use tracing::debug;

/// Handler of a step acting on one project
pub type ProjectHandler = fn(&ReleaseContext, &ProjectContext) -> ReleaseResult<()>;

/// Run `step`, for `project` or for every configured project
pub fn run_step(ctx: &ReleaseContext, step: Step, project: Option<&str>) -> ReleaseResult<()> {
  let handler: ProjectHandler = match step {
    Step::Cleanup => return run_cleanup(ctx),
    Step::Clone => return run_clone(ctx),
    Step::Changelog => return run_changelog(ctx),
    Step::Checkout => run_checkout,
    Step::Bump => run_bump,
    Step::Sdist => run_sdist,
    Step::Dpm => run_dpm,
    Step::Open => run_open,
    Step::Push => run_push,
    Step::Merge => run_merge,
    Step::Build => run_build,
    Step::Milestone => run_milestone,
  };

  match project {
    Some(name) => run_for_project(ctx, step, name, handler),
    None => run_for_all_projects(ctx, step, handler),
  }
}

/// Batch mode: every configured project in name order
fn run_for_all_projects(ctx: &ReleaseContext, step: Step, handler: ProjectHandler) -> ReleaseResult<()> {
  if ctx.config.required_projects().next().is_none() {
    return Err(ReleaseError::NothingToRelease);
  }

  for name in ctx.config.project_names() {
    run_for_project(ctx, step, name, handler)?;
  }
  Ok(())
}

fn run_for_project(ctx: &ReleaseContext, step: Step, name: &str, handler: ProjectHandler) -> ReleaseResult<()> {
  if !ctx.config.is_required(name)? {
    debug!("Release not required for {}, skipping {} step", name, step);
    return Ok(());
  }

  let project = ProjectContext::new(&ctx.work_dir(), name);
  handler(ctx, &project)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::config::Mode;
  use crate::core::context::testing::context;
  use crate::core::error::ConfigError;
  use crate::core::exec::fake::FakeRunner;
  use std::sync::Arc;
  use tempfile::TempDir;

  const PROJECT_STEPS: &[Step] = &[
    Step::Checkout,
    Step::Bump,
    Step::Sdist,
    Step::Dpm,
    Step::Open,
    Step::Push,
    Step::Merge,
    Step::Build,
    Step::Milestone,
  ];

  #[test]
  fn test_cleared_flag_issues_no_commands() {
    let dir = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::succeeding());
    let ctx = context(
      dir.path(),
      Mode::Stable,
      &[("checkbox-ng", false), ("checkbox-support", true)],
      runner.clone(),
    );

    for step in PROJECT_STEPS {
      run_step(&ctx, *step, Some("checkbox-ng")).unwrap();
    }
    assert!(runner.calls().is_empty());
  }

  #[test]
  fn test_batch_without_required_projects_aborts() {
    let dir = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::succeeding());
    let ctx = context(dir.path(), Mode::Testing, &[("checkbox-ng", false)], runner.clone());

    let err = run_step(&ctx, Step::Push, None).unwrap_err();
    assert!(matches!(err, ReleaseError::NothingToRelease));
    assert_eq!(err.to_string(), "Release not required, aborting...");
    assert!(runner.calls().is_empty());
  }

  #[test]
  fn test_batch_runs_required_projects_in_order() {
    let dir = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::succeeding());
    let ctx = context(
      dir.path(),
      Mode::Testing,
      &[("checkbox-support", true), ("checkbox-ng", true), ("checkbox-gui", false)],
      runner.clone(),
    );

    run_step(&ctx, Step::Push, None).unwrap();

    let urls: Vec<String> = runner
      .calls()
      .iter()
      .filter_map(|c| c.get_args().get(1).cloned())
      .collect();
    assert_eq!(urls.len(), 6);
    assert!(urls[0].ends_with("/~checkbox-dev/checkbox-ng"));
    assert!(urls[3].ends_with("/~checkbox-dev/checkbox-support"));
  }

  #[test]
  fn test_unknown_project_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let ctx = context(
      dir.path(),
      Mode::Testing,
      &[("checkbox-ng", true)],
      Arc::new(FakeRunner::succeeding()),
    );

    let err = run_step(&ctx, Step::Bump, Some("checkbox-typo")).unwrap_err();
    assert!(matches!(err, ReleaseError::Config(ConfigError::ProjectNotFound { .. })));
  }
}
