//! Integration tests for the release steps that need no hosting service

use crate::helpers::{TestWorkspace, commit_file, git, init_repo, stderr};
use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Monorepo with two packaged projects: `checkbox-ng` released as 1.0.0,
/// `providers/base` only as a release candidate
fn monorepo_origin() -> Result<TempDir> {
  let dir = TempDir::new()?;
  let repo = dir.path().join("monorepo-sandbox");
  init_repo(&repo)?;
  commit_file(&repo, "checkbox-ng/debian/control", "Source: checkbox-ng\n", "Add checkbox-ng")?;
  commit_file(&repo, "providers/base/debian/control", "Source: plainbox-provider-base\n", "Add base provider")?;
  commit_file(&repo, "docs/index.md", "# Docs\n", "Add docs")?;
  git(&repo, &["tag", "checkbox-ng-v1.0.0"])?;
  git(&repo, &["tag", "provider-base-v2.0.0rc1"])?;
  Ok(dir)
}

fn origin_path(origin: &TempDir) -> String {
  origin.path().join("monorepo-sandbox").to_string_lossy().into_owned()
}

#[test]
fn test_cleanup_creates_empty_work_dir() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("testing"))?;
  ws.write_file("src/stale/setup.py", "")?;

  let output = ws.step("cleanup", &[])?;
  assert!(output.status.success(), "cleanup failed: {}", stderr(&output));

  assert!(ws.work_dir().is_dir());
  assert_eq!(std::fs::read_dir(ws.work_dir())?.count(), 0);
  assert!(ws.file_exists("release.log"));
  Ok(())
}

#[test]
fn test_clone_discovers_tagged_projects() -> Result<()> {
  let origin = monorepo_origin()?;
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("testing"))?;
  ws.set_config("origin", Value::String(origin_path(&origin)))?;

  assert!(ws.step("cleanup", &[])?.status.success());
  let output = ws.step("clone", &[])?;
  assert!(output.status.success(), "clone failed: {}", stderr(&output));

  let projects: Vec<Value> = serde_json::from_str(&ws.read_file("projects.json")?)?;
  let names: Vec<&str> = projects.iter().filter_map(|p| p["name"].as_str()).collect();
  assert_eq!(names, ["checkbox-ng", "provider-base"]);
  assert_eq!(projects[1]["path"], "providers/base");
  assert_eq!(projects[1]["last_tag"], "provider-base-v2.0.0rc1");
  Ok(())
}

#[test]
fn test_clone_in_stable_mode_skips_release_candidates() -> Result<()> {
  let origin = monorepo_origin()?;
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("stable"))?;
  ws.set_config("origin", Value::String(origin_path(&origin)))?;

  assert!(ws.step("cleanup", &[])?.status.success());
  assert!(ws.step("clone", &[])?.status.success());

  let projects: Vec<Value> = serde_json::from_str(&ws.read_file("projects.json")?)?;
  assert_eq!(projects.len(), 1);
  assert_eq!(projects[0]["last_tag"], "checkbox-ng-v1.0.0");
  Ok(())
}

#[test]
fn test_clone_does_not_clone_twice() -> Result<()> {
  let origin = monorepo_origin()?;
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("testing"))?;
  ws.set_config("origin", Value::String(origin_path(&origin)))?;

  assert!(ws.step("cleanup", &[])?.status.success());
  assert!(ws.step("clone", &[])?.status.success());
  ws.write_file("src/monorepo-sandbox/local-change.txt", "keep me")?;

  let output = ws.step("clone", &[])?;
  assert!(output.status.success(), "second clone failed: {}", stderr(&output));

  assert!(ws.file_exists("src/monorepo-sandbox/local-change.txt"));
  let log = ws.read_file("release.log")?;
  assert_eq!(log.matches("# Cloning ").count(), 1);
  Ok(())
}

#[test]
fn test_missing_mode_fails() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], None)?;

  let output = ws.step("cleanup", &[])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("mode"));

  let output = ws.step("cleanup", &["--mode", "stable"])?;
  assert!(output.status.success(), "cleanup failed: {}", stderr(&output));
  Ok(())
}

#[test]
fn test_batch_without_required_projects_aborts() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", false), ("checkbox-support", false)], Some("testing"))?;

  let output = ws.step("push", &["--user", "releaser"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("ERROR    Release not required, aborting..."));
  Ok(())
}

#[test]
fn test_project_with_cleared_flag_is_skipped() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", false)], Some("testing"))?;

  // No clone exists: any real work would fail
  let output = ws.step("bump", &["--project", "checkbox-ng"])?;
  assert!(output.status.success(), "bump failed: {}", stderr(&output));
  assert!(!ws.file_exists("versions.json"));
  Ok(())
}

#[test]
fn test_unknown_project_fails() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("testing"))?;

  let output = ws.step("sdist", &["--project", "checkbox-typo"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("checkbox-typo"));
  Ok(())
}

#[test]
fn test_build_skips_without_version_record() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("testing"))?;

  let output = ws.step("build", &["--project", "checkbox-ng"])?;
  assert!(output.status.success(), "build failed: {}", stderr(&output));
  assert!(stderr(&output).contains("# Skipping checkbox-ng build step"));
  Ok(())
}

#[test]
fn test_build_dry_run_skips_helper_script() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("testing"))?;
  ws.write_file(
    "versions.json",
    r#"{"checkbox-ng": {"current": "1.0.0rc0", "last_stable": "0.9.0", "new": "1.0.0rc1"}}"#,
  )?;

  let output = ws.step("build", &["--project", "checkbox-ng", "--dry-run"])?;
  assert!(output.status.success(), "build failed: {}", stderr(&output));
  assert!(stderr(&output).contains("# Dry run: Skipping checkbox-ng 1.0.0rc1 build step"));
  Ok(())
}

#[test]
fn test_changelog_lists_commits_since_last_stable() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true), ("checkbox-support", false)], Some("stable"))?;

  let clone = ws.work_dir().join("checkbox-ng");
  init_repo(&clone)?;
  commit_file(&clone, "setup.py", "version='1.0.0'\n", "Release 1.0.0")?;
  git(&clone, &["tag", "v1.0.0"])?;
  commit_file(&clone, "launcher.py", "print('launch')\n", "Add launcher")?;
  commit_file(&clone, "launcher.py", "print('launched')\n", "Fix launcher")?;
  git(&clone, &["tag", "v1.1.0"])?;

  ws.write_file(
    "versions.json",
    r#"{
    "checkbox-ng": {"current": "1.1.0rc1", "last_stable": "1.0.0", "new": "1.1.0"},
    "checkbox-support": {"current": "0.3.0rc1", "last_stable": "0.2.0", "new": "0.3.0"}
}"#,
  )?;

  let output = ws.step("changelog", &[])?;
  assert!(output.status.success(), "changelog failed: {}", stderr(&output));

  assert_eq!(
    ws.read_file("changelog")?,
    "\ncheckbox-ng:\n+ Fix launcher\n+ Add launcher\n"
  );
  Ok(())
}

const CHECKOUT_ARGS: &[&str] = &["--project", "checkbox-ng", "--user", "releaser", "--target-user", "releaser"];

fn setup_py(version: &str) -> String {
  format!("from setuptools import setup\n\nsetup(\n    name='checkbox-ng',\n    version='{}',\n)\n", version)
}

/// Code and packaging clones of `checkbox-ng`, both tagged for 1.0.0.
///
/// The clones already exist, so the `git clone` calls of `checkout` fail
/// locally and never reach the hosting service.
fn released_clones(ws: &TestWorkspace) -> Result<(PathBuf, PathBuf)> {
  ws.set_config("git_host", Value::String("git.invalid".to_string()))?;

  let code = ws.work_dir().join("checkbox-ng");
  init_repo(&code)?;
  commit_file(&code, ".bumpversion.cfg", "[bumpversion]\ncurrent_version = 1.0.0\n", "Add bumpversion config")?;
  commit_file(&code, "setup.py", &setup_py("1.0.0"), "Add setup.py")?;
  commit_file(&code, "checkbox_ng/launcher.py", "print('launch')\n", "Add launcher")?;
  git(&code, &["tag", "v1.0.0"])?;

  let packaging = ws.work_dir().join("packaging_checkbox-ng");
  init_repo(&packaging)?;
  commit_file(&packaging, "debian/control", "Source: checkbox-ng\n", "Add control")?;
  git(&packaging, &["tag", "debian-1.0.0-1"])?;

  Ok((code, packaging))
}

fn release_flag(ws: &TestWorkspace) -> Result<Value> {
  let config: Value = serde_json::from_str(&ws.read_file("release.json")?)?;
  Ok(config["checkbox-ng"].clone())
}

#[test]
fn test_checkout_clears_flag_after_version_only_bump() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("stable"))?;
  let (code, _) = released_clones(&ws)?;
  commit_file(&code, ".bumpversion.cfg", "[bumpversion]\ncurrent_version = 1.0.1\n", "Bump config")?;
  commit_file(&code, "setup.py", &setup_py("1.0.1"), "Bump setup.py")?;

  let output = ws.step("checkout", CHECKOUT_ARGS)?;
  assert!(output.status.success(), "checkout failed: {}", stderr(&output));

  assert_eq!(release_flag(&ws)?, Value::Bool(false));
  assert!(stderr(&output).contains("Release required: false"));
  Ok(())
}

#[test]
fn test_checkout_keeps_flag_after_source_change() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("stable"))?;
  let (code, _) = released_clones(&ws)?;
  commit_file(&code, "checkbox_ng/launcher.py", "print('launched')\n", "Fix launcher")?;

  let output = ws.step("checkout", CHECKOUT_ARGS)?;
  assert!(output.status.success(), "checkout failed: {}", stderr(&output));

  assert_eq!(release_flag(&ws)?, Value::Bool(true));
  assert!(stderr(&output).contains("Release required: true (code changed"));
  Ok(())
}

#[test]
fn test_checkout_ignores_gitignore_changes() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("stable"))?;
  let (code, _) = released_clones(&ws)?;
  commit_file(&code, ".gitignore", "dist/\n", "Ignore dist")?;

  let output = ws.step("checkout", CHECKOUT_ARGS)?;
  assert!(output.status.success(), "checkout failed: {}", stderr(&output));

  assert_eq!(release_flag(&ws)?, Value::Bool(false));
  Ok(())
}

#[test]
fn test_checkout_keeps_flag_after_packaging_change() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("stable"))?;
  let (_, packaging) = released_clones(&ws)?;
  commit_file(&packaging, "debian/rules", "#!/usr/bin/make -f\n", "Add rules")?;

  let output = ws.step("checkout", CHECKOUT_ARGS)?;
  assert!(output.status.success(), "checkout failed: {}", stderr(&output));

  assert_eq!(release_flag(&ws)?, Value::Bool(true));
  assert!(stderr(&output).contains("Release required: true (packaging changed"));
  Ok(())
}

#[test]
fn test_checkout_in_testing_mode_merges_master_into_release() -> Result<()> {
  let ws = TestWorkspace::new(&[("checkbox-ng", true)], Some("testing"))?;
  let (code, _) = released_clones(&ws)?;
  git(&code, &["branch", "release"])?;
  commit_file(&code, "checkbox_ng/launcher.py", "print('launched')\n", "Fix launcher")?;

  let output = ws.step("checkout", CHECKOUT_ARGS)?;
  assert!(output.status.success(), "checkout failed: {}", stderr(&output));

  assert_eq!(release_flag(&ws)?, Value::Bool(true));
  assert!(stderr(&output).contains("1 commit(s) behind master"));
  let branch = git(&code, &["rev-parse", "--abbrev-ref", "HEAD"])?;
  assert_eq!(String::from_utf8_lossy(&branch.stdout).trim(), "release");
  assert_eq!(std::fs::read_to_string(code.join("checkbox_ng/launcher.py"))?, "print('launched')\n");
  Ok(())
}
