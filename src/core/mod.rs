//! Core building blocks shared by every release step
//!
//! - **config**: release settings file (project flags, mode, paths)
//! - **context**: per-invocation context built once in main.rs
//! - **error**: error types with contextual help messages
//! - **exec**: external command abstraction (`CommandRunner`)
//! - **logging**: console and `release.log` subscriber
//! - **vcs**: git operations over a `CommandRunner` (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod logging;
pub mod vcs;
