//! Release model shared by the step handlers
//!
//! # Invariants
//!
//! 1. **A project is released only when its flag is set**
//!    - `checkout` clears the flag when nothing changed since the last release
//!    - every project step is a no-op for a cleared flag
//!
//! 2. **Versions flow through `versions.json`**
//!    - `bump` is the only writer
//!    - `build`, `milestone` and `changelog` read it back
//!
//! 3. **Every project has two repositories**
//!    - code: `~<owner>/<project>`, cloned as `<work_dir>/<project>`
//!    - packaging: `~<owner>/<project>/+git/packaging`, cloned as `<work_dir>/packaging_<project>`

pub mod bumpversion;
pub mod discovery;
pub mod necessity;
pub mod project;
pub mod step;
pub mod versions;

pub use project::ProjectContext;
pub use step::Step;
pub use versions::{VersionRecord, VersionStore};
