//! Packaged project discovery in a monorepo checkout
//!
//! Every directory holding a `debian/` directory is a packaged project. Under
//! the working directory, the first path component is the repository and the
//! rest is the project path: `providers/base` becomes `provider-base`.

use crate::core::config::Mode;
use crate::core::error::ReleaseResult;
use crate::core::exec::CommandRunner;
use crate::core::vcs::SystemGit;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A packaged project with its latest release tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredProject {
  pub name: String,
  /// Repository directory under the working directory
  pub repository: String,
  /// Project path inside the repository, empty at the repository root
  pub path: String,
  pub last_tag: String,
}

/// Project name for a path inside a repository
pub fn project_name(repository: &str, project_path: &str) -> String {
  if project_path.is_empty() {
    repository.to_string()
  } else {
    project_path.replace("s/", "-")
  }
}

/// Directories under `work_dir` that contain a `debian/` directory, as
/// `(repository, project path)` pairs in path order
pub fn packaged_dirs(work_dir: &Path) -> ReleaseResult<Vec<(String, String)>> {
  let mut found = Vec::new();

  let walker = WalkDir::new(work_dir)
    .min_depth(1)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.file_name() != ".git" && e.file_name() != "debian");

  for entry in walker {
    let entry = entry?;
    if !entry.file_type().is_dir() || !entry.path().join("debian").is_dir() {
      continue;
    }

    let Ok(relative) = entry.path().strip_prefix(work_dir) else {
      continue;
    };
    let mut components = relative.components();
    let Some(repository) = components.next() else {
      continue;
    };
    let repository = repository.as_os_str().to_string_lossy().into_owned();
    // Forward slashes on every platform, as git and `projects.json` expect
    let project_path = components
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    found.push((repository, project_path));
  }

  Ok(found)
}

/// Discover packaged projects and their latest tag matching `<name>-v<glob>`.
///
/// Projects that were never tagged are skipped.
pub fn discover(runner: &dyn CommandRunner, work_dir: &Path, mode: Mode) -> ReleaseResult<Vec<DiscoveredProject>> {
  let mut projects = Vec::new();

  for (repository, path) in packaged_dirs(work_dir)? {
    let name = project_name(&repository, &path);
    let repo_root: PathBuf = work_dir.join(&repository);
    let git = SystemGit::new(runner, repo_root);

    let Some(last_tag) = git.describe_tag(&format!("{}-v{}", name, mode.tag_glob()))? else {
      debug!("No tag found for {}", name);
      continue;
    };

    projects.push(DiscoveredProject {
      name,
      repository,
      path,
      last_tag,
    });
  }

  Ok(projects)
}
