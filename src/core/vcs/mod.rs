pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use std::path::PathBuf;

/// The version-control operations a release run needs
///
/// Implementations report failure through typed errors only; callers never
/// inspect tool output.
pub trait ReleaseVcs {
  /// Current branch name; `HEAD` when detached
  fn current_branch(&self) -> ReleaseResult<String>;

  fn has_remote(&self, name: &str) -> ReleaseResult<bool>;

  fn tag_exists(&self, tag: &str) -> ReleaseResult<bool>;

  /// Create an annotated tag on the current commit
  fn create_annotated_tag(&self, tag: &str, message: &str) -> ReleaseResult<()>;

  fn push_tag(&self, remote: &str, tag: &str) -> ReleaseResult<()>;

  /// Commit exactly `paths` (nothing else that happens to be staged)
  fn commit_paths(&self, message: &str, paths: &[PathBuf]) -> ReleaseResult<()>;

  fn push_branch(&self, remote: &str, branch: &str) -> ReleaseResult<()>;
}
