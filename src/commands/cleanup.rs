//! `cleanup` step

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt};
use std::fs;
use tracing::info;

/// Delete and recreate the working directory
pub fn run_cleanup(ctx: &ReleaseContext) -> ReleaseResult<()> {
  let work_dir = ctx.work_dir();

  if work_dir.exists() {
    fs::remove_dir_all(&work_dir).with_context(|| format!("Failed to remove {}", work_dir.display()))?;
  }
  fs::create_dir_all(&work_dir).with_context(|| format!("Failed to create {}", work_dir.display()))?;

  info!("Working directory {} is empty", work_dir.display());
  Ok(())
}
