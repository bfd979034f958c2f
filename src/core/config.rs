use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Release mode: a new release candidate or a final version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  Testing,
  Stable,
}

impl Mode {
  /// Glob appended to tag prefixes when looking up the last release.
  ///
  /// Stable releases exclude `rcN` tags (up to 9 release candidates).
  pub fn tag_glob(self) -> &'static str {
    match self {
      Mode::Testing => "*",
      Mode::Stable => "*[^c][0-9]",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Mode::Testing => "testing",
      Mode::Stable => "stable",
    }
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Glob matching stable version tags, regardless of mode
pub const STABLE_TAG_GLOB: &str = "v*[^c][0-9]";

/// Release settings (the JSON file given with `--config`)
///
/// Every key that is not one of the named settings is a project name
/// mapped to its "release required" flag:
///
/// ```json
/// {
///     "checkbox-ng": true,
///     "checkbox-support": false,
///     "dry_run": false,
///     "mode": "testing"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  #[serde(default)]
  pub mode: Option<Mode>,

  #[serde(default)]
  pub dry_run: bool,

  /// Monorepo cloned by the `clone` step
  #[serde(default = "default_origin")]
  pub origin: String,

  /// Host serving the code and packaging repositories
  #[serde(default = "default_git_host")]
  pub git_host: String,

  /// Directory holding every clone
  #[serde(default = "default_work_dir")]
  pub work_dir: PathBuf,

  #[serde(default = "default_versions_file")]
  pub versions_file: PathBuf,

  #[serde(default = "default_changelog_file")]
  pub changelog_file: PathBuf,

  /// Where `clone` records the packaged projects it found
  #[serde(default = "default_projects_file")]
  pub projects_file: PathBuf,

  /// Directory of the hosting-service helper scripts
  #[serde(default = "default_scripts_dir")]
  pub scripts_dir: PathBuf,

  /// Seconds the merge proposal tool waits for the merge
  #[serde(default = "default_merge_timeout")]
  pub merge_timeout: u64,

  #[serde(flatten)]
  pub projects: BTreeMap<String, bool>,
}

fn default_origin() -> String {
  "git@github.com:yphus/monorepo-sandbox.git".to_string()
}

fn default_git_host() -> String {
  "git.launchpad.net".to_string()
}

fn default_work_dir() -> PathBuf {
  PathBuf::from("src")
}

fn default_versions_file() -> PathBuf {
  PathBuf::from("versions.json")
}

fn default_changelog_file() -> PathBuf {
  PathBuf::from("changelog")
}

fn default_projects_file() -> PathBuf {
  PathBuf::from("projects.json")
}

fn default_scripts_dir() -> PathBuf {
  PathBuf::from("./support/release/git")
}

fn default_merge_timeout() -> u64 {
  3600
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      mode: None,
      dry_run: false,
      origin: default_origin(),
      git_host: default_git_host(),
      work_dir: default_work_dir(),
      versions_file: default_versions_file(),
      changelog_file: default_changelog_file(),
      projects_file: default_projects_file(),
      scripts_dir: default_scripts_dir(),
      merge_timeout: default_merge_timeout(),
      projects: BTreeMap::new(),
    }
  }
}

impl ReleaseConfig {
  /// Load the release settings from a JSON file
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    if !path.exists() {
      return Err(ConfigError::NotFound {
        path: path.to_path_buf(),
      }
      .into());
    }

    let content = fs::read_to_string(path).with_context(|| format!("Failed to read config from {}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| {
      ReleaseError::Config(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })
  }

  /// Release flag for a project
  pub fn is_required(&self, project: &str) -> ReleaseResult<bool> {
    self.projects.get(project).copied().ok_or_else(|| {
      ConfigError::ProjectNotFound {
        name: project.to_string(),
      }
      .into()
    })
  }

  /// Configured project names, sorted
  pub fn project_names(&self) -> impl Iterator<Item = &str> {
    self.projects.keys().map(String::as_str)
  }

  /// Projects whose release flag is set, sorted
  pub fn required_projects(&self) -> impl Iterator<Item = &str> {
    self.projects.iter().filter(|(_, required)| **required).map(|(name, _)| name.as_str())
  }

  /// Rewrite one project flag in the config file.
  ///
  /// Works on the raw JSON document so keys this tool does not know about
  /// survive the rewrite.
  pub fn persist_required(path: &Path, project: &str, required: bool) -> ReleaseResult<()> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read config from {}", path.display()))?;
    let mut doc: serde_json::Value = serde_json::from_str(&content)?;
    let map = doc.as_object_mut().ok_or_else(|| ConfigError::Invalid {
      path: path.to_path_buf(),
      reason: "top-level value is not an object".to_string(),
    })?;
    map.insert(project.to_string(), serde_json::Value::Bool(required));
    write_json_pretty(path, &doc)
  }
}

/// Write JSON with sorted keys and 4-space indentation
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> ReleaseResult<()> {
  // serde_json::Map is ordered by key, so going through Value sorts them
  let value = serde_json::to_value(value)?;
  let mut buf = Vec::new();
  let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
  let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
  value.serialize(&mut ser)?;
  fs::write(path, buf).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(())
}
