//! Per-project paths, URLs and Debian naming rules

use std::path::{Path, PathBuf};

/// Projects whose Debian source package is named differently
const DEBIAN_SOURCE_RENAMES: &[(&str, &str)] = &[("plainbox-provider-resource", "plainbox-provider-resource-generic")];

/// Derived locations of one project, rebuilt on every invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
  pub name: String,

  /// Clone of the code repository
  pub clone_dir: PathBuf,

  /// Clone of the packaging repository
  pub packaging_dir: PathBuf,
}

impl ProjectContext {
  pub fn new(work_dir: &Path, name: &str) -> Self {
    Self {
      name: name.to_string(),
      clone_dir: work_dir.join(name),
      packaging_dir: work_dir.join(packaging_name(name)),
    }
  }

  /// `<base>/~<owner>/<project>`
  pub fn code_url(&self, base_url: &str, owner: &str) -> String {
    format!("{}/~{}/{}", base_url, owner, self.name)
  }

  /// `<base>/~<owner>/<project>/+git/packaging`
  pub fn packaging_url(&self, base_url: &str, owner: &str) -> String {
    format!("{}/+git/packaging", self.code_url(base_url, owner))
  }

  /// Debian source package name
  pub fn debian_source(&self) -> &str {
    DEBIAN_SOURCE_RENAMES
      .iter()
      .find(|(project, _)| *project == self.name)
      .map(|(_, source)| *source)
      .unwrap_or(&self.name)
  }

  /// `<source>_<debian version>.orig.tar.gz`
  pub fn orig_tarball_name(&self, upstream_version: &str) -> String {
    format!("{}_{}.orig.tar.gz", self.debian_source(), debian_version(upstream_version))
  }
}

/// Directory name of the packaging clone
pub fn packaging_name(project: &str) -> String {
  format!("packaging_{}", project)
}

/// Upstream version in Debian ordering: `1.2.0rc1` sorts before `1.2.0` as `1.2.0~rc1`
pub fn debian_version(upstream_version: &str) -> String {
  upstream_version.replace("rc", "~rc")
}
