//! Release steps

use clap::ValueEnum;
use std::fmt;

/// One step of the release, selected with `--step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
  /// Delete and recreate the working directory
  Cleanup,
  /// Clone the monorepo and discover packaged projects
  Clone,
  /// Clone code and packaging repositories, decide if a release is needed
  Checkout,
  /// Bump the version, commit and tag
  Bump,
  /// Build the source tarball
  Sdist,
  /// Import the tarball into the packaging repository
  Dpm,
  /// Open the next development version (stable only)
  Open,
  /// Push code and packaging repositories
  Push,
  /// Merge the release branch into master (stable only)
  Merge,
  /// Update the build recipe and start the builds
  Build,
  /// Release the current milestone (stable only)
  Milestone,
  /// Append the release notes of every released project
  Changelog,
}

impl Step {
  pub fn as_str(self) -> &'static str {
    match self {
      Step::Cleanup => "cleanup",
      Step::Clone => "clone",
      Step::Checkout => "checkout",
      Step::Bump => "bump",
      Step::Sdist => "sdist",
      Step::Dpm => "dpm",
      Step::Open => "open",
      Step::Push => "push",
      Step::Merge => "merge",
      Step::Build => "build",
      Step::Milestone => "milestone",
      Step::Changelog => "changelog",
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
