//! Release-necessity decision
//!
//! A project needs a release when its code changed since the last release
//! tag (ignoring lines that only move the version number) or its packaging
//! changed since the last `debian-` tag.

use crate::core::config::Mode;
use crate::core::error::ReleaseResult;
use crate::core::vcs::{MAIN_BRANCH, RELEASE_BRANCH, SystemGit};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

/// Lines that only carry a version number
static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"__version__|current_version|^\s*version\s*=").expect("version line regex is valid")
});

/// Markers of changes that have no +/- content lines
const STRUCTURAL_MARKERS: &[&str] = &[
  "Binary files ",
  "new file mode",
  "deleted file mode",
  "old mode",
  "new mode",
  "rename from",
  "copy from",
];

/// Dotfiles such as `.gitignore` never trigger a release
const CODE_PATHSPEC: &[&str] = &[".", ":(exclude).*ignore"];

/// Why a project needs (or does not need) a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Necessity {
  /// `master` has commits the release branch lacks (testing mode)
  BehindMaster(u32),
  /// No release tag to compare against
  NoTag,
  CodeChanged,
  PackagingChanged,
  NotRequired,
}

impl Necessity {
  pub fn is_required(self) -> bool {
    self != Necessity::NotRequired
  }
}

impl fmt::Display for Necessity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Necessity::BehindMaster(count) => write!(f, "release branch is {} commit(s) behind master", count),
      Necessity::NoTag => f.write_str("no previous release tag"),
      Necessity::CodeChanged => f.write_str("code changed since the last release"),
      Necessity::PackagingChanged => f.write_str("packaging changed since the last release"),
      Necessity::NotRequired => f.write_str("nothing changed since the last release"),
    }
  }
}

/// True when `diff` changes anything beyond version lines
pub fn has_code_changes(diff: &str) -> bool {
  // `---`/`+++` are file headers only before the first hunk of a file
  let mut in_hunk = false;
  for line in diff.lines() {
    if line.starts_with("diff --git ") {
      in_hunk = false;
      continue;
    }
    if line.starts_with("@@") {
      in_hunk = true;
      continue;
    }
    if !in_hunk {
      if STRUCTURAL_MARKERS.iter().any(|m| line.starts_with(m)) {
        return true;
      }
      continue;
    }
    if let Some(content) = line.strip_prefix('+').or_else(|| line.strip_prefix('-'))
      && !VERSION_LINE.is_match(content)
    {
      return true;
    }
  }
  false
}

/// Decide whether the project cloned in `code` / `packaging` needs a release.
///
/// In testing mode, a release branch behind `master` is brought up to date
/// first (merge favoring `master`).
pub fn evaluate(code: &SystemGit<'_>, packaging: &SystemGit<'_>, mode: Mode) -> ReleaseResult<Necessity> {
  let behind = code.commits_behind(MAIN_BRANCH, RELEASE_BRANCH)?;
  debug!("Release branch is {} commit(s) behind local {}", behind, MAIN_BRANCH);

  if behind > 0 && mode == Mode::Testing {
    code.merge_favoring(MAIN_BRANCH)?;
    return Ok(Necessity::BehindMaster(behind));
  }

  let Some(code_tag) = code.describe_tag(&format!("v{}", mode.tag_glob()))? else {
    return Ok(Necessity::NoTag);
  };
  let code_diff = code.diff(&code_tag, CODE_PATHSPEC)?;
  if has_code_changes(&code_diff) {
    return Ok(Necessity::CodeChanged);
  }

  let Some(packaging_tag) = packaging.describe_tag(&format!("debian-{}", mode.tag_glob()))? else {
    return Ok(Necessity::NoTag);
  };
  if !packaging.diff_name_only(&packaging_tag)?.trim().is_empty() {
    return Ok(Necessity::PackagingChanged);
  }

  Ok(Necessity::NotRequired)
}
