//! Version records shared between release steps
//!
//! `bump` writes one record per project to `versions.json`; tarball,
//! changelog, build and milestone steps read it back.

use crate::core::config::write_json_pretty;
use crate::core::error::{ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Versions of one project around a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
  /// Version before the bump
  pub current: String,

  /// Latest stable (non-rc) tag, without the `v`
  pub last_stable: String,

  /// Version produced by the bump
  pub new: String,
}

/// The `versions.json` file
pub struct VersionStore {
  path: PathBuf,
  records: BTreeMap<String, VersionRecord>,
}

impl VersionStore {
  /// Load the store. A missing file is an empty store.
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let records = if path.exists() {
      let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
      serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
      BTreeMap::new()
    };

    Ok(Self {
      path: path.to_path_buf(),
      records,
    })
  }

  pub fn get(&self, project: &str) -> Option<&VersionRecord> {
    self.records.get(project)
  }

  /// `new` version of a project, if it was bumped
  pub fn new_version(&self, project: &str) -> Option<&str> {
    self.get(project).map(|r| r.new.as_str())
  }

  /// Replace the record of a project
  pub fn record(&mut self, project: &str, record: VersionRecord) {
    self.records.insert(project.to_string(), record);
  }

  /// Write the store back with sorted keys
  pub fn save(&self) -> ReleaseResult<()> {
    write_json_pretty(&self.path, &self.records)
  }
}
