//! Version bumping through `bumpversion`
//!
//! The project version lives in `.bumpversion.cfg` and follows
//! `X.Y.Z.devN` → `X.Y.ZrcN` → `X.Y.Z`. bumpversion can only bump one part
//! per call, so reaching the next release takes a short sequence of calls
//! that depends on the release mode and the stage of the current version.

use crate::core::config::Mode;
use crate::core::error::{ArtifactError, ConfigError, ReleaseError, ReleaseResult};
use crate::core::exec::{CommandRunner, ExternalCommand};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = ".bumpversion.cfg";

/// Version part given to one bumpversion call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpPart {
  /// Next minor version, opens `X.Y+1.0.dev0`
  Minor,
  /// Next release stage: dev → rc0 → final
  Release,
  /// Next release candidate number
  Candidate,
}

impl BumpPart {
  pub fn as_arg(self) -> &'static str {
    match self {
      BumpPart::Minor => "minor",
      BumpPart::Release => "release",
      BumpPart::Candidate => "N",
    }
  }
}

/// Stage of a version string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStage {
  Dev,
  Candidate,
  Final,
}

impl VersionStage {
  pub fn of(version: &str) -> Self {
    if version.contains("dev") {
      VersionStage::Dev
    } else if version.contains("rc") {
      VersionStage::Candidate
    } else {
      VersionStage::Final
    }
  }
}

/// Calls needed to go from `current` to the next release in `mode`.
///
/// Stable releases end on a final version, testing releases on the next rc.
pub fn bump_sequence(mode: Mode, current: &str) -> &'static [BumpPart] {
  use BumpPart::*;

  match (mode, VersionStage::of(current)) {
    (Mode::Stable, VersionStage::Dev) => &[Release, Release],
    (Mode::Stable, VersionStage::Candidate) => &[Release],
    (Mode::Stable, VersionStage::Final) => &[Minor, Release, Release],
    (Mode::Testing, VersionStage::Dev) => &[Release, Candidate],
    (Mode::Testing, VersionStage::Candidate) => &[Candidate],
    (Mode::Testing, VersionStage::Final) => &[Minor, Release, Candidate],
  }
}

/// `current_version` from the `[bumpversion]` section of the project config
pub fn read_current_version(project: &str, clone_dir: &Path) -> ReleaseResult<String> {
  let path = clone_dir.join(CONFIG_FILE);
  let missing = || ConfigError::Bumpversion {
    project: project.to_string(),
    path: path.clone(),
  };

  let content = fs::read_to_string(&path).map_err(|_| missing())?;
  parse_current_version(&content).ok_or_else(|| missing().into())
}

/// INI lookup of `[bumpversion] current_version`
fn parse_current_version(content: &str) -> Option<String> {
  let mut in_section = false;

  for line in content.lines() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
      continue;
    }
    if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
      in_section = section.trim() == "bumpversion";
      continue;
    }
    if !in_section {
      continue;
    }
    let Some((key, value)) = line.split_once(['=', ':']) else {
      continue;
    };
    if key.trim().eq_ignore_ascii_case("current_version") {
      return Some(value.trim().to_string());
    }
  }

  None
}

/// Value of the last `new_version=` line printed by `bumpversion --list`
pub fn parse_new_version(output: &str) -> Option<String> {
  output
    .lines()
    .rev()
    .find_map(|line| line.trim().strip_prefix("new_version="))
    .map(|v| v.trim().to_string())
}

/// Run one `bumpversion <part> --allow-dirty --list` and return the new version
pub fn bump(runner: &dyn CommandRunner, project: &str, clone_dir: &Path, part: BumpPart) -> ReleaseResult<String> {
  let output = runner.run(
    &ExternalCommand::new("bumpversion")
      .args([part.as_arg(), "--allow-dirty", "--list"])
      .current_dir(clone_dir),
  )?;

  parse_new_version(&output.output).ok_or_else(|| {
    ArtifactError::BumpOutput {
      project: project.to_string(),
      output: output.output,
    }
    .into()
  })
}

/// Run every part of `sequence`; the last call decides the new version
pub fn apply_sequence(
  runner: &dyn CommandRunner,
  project: &str,
  clone_dir: &Path,
  sequence: &[BumpPart],
) -> ReleaseResult<String> {
  let mut new_version = None;
  for part in sequence {
    new_version = Some(bump(runner, project, clone_dir, *part)?);
  }
  new_version.ok_or_else(|| ReleaseError::message(format!("{}: empty bump sequence", project)))
}
