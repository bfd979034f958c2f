pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

/// Name of the branch holding the in-progress release commits
pub const RELEASE_BRANCH: &str = "release";

/// Main development branch of every code repository
pub const MAIN_BRANCH: &str = "master";
