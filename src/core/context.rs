//! Release context - build once, pass everywhere
//!
//! Every operation receives the repository root and configuration explicitly
//! rather than reading the process working directory.

use crate::core::config::{ReleaseConfig, ToolConfig};
use crate::core::error::ReleaseResult;
use std::path::{Path, PathBuf};

/// Repository root plus release configuration
#[derive(Debug, Clone)]
pub struct ReleaseContext {
  /// Repository root (absolute path)
  pub root: PathBuf,

  /// Release settings (defaults when no release.toml exists)
  pub config: ReleaseConfig,
}

impl ReleaseContext {
  /// Build context from a root directory, loading release.toml if present.
  ///
  /// `remote` overrides the configured remote when given.
  pub fn build(root: &Path, remote: Option<String>) -> ReleaseResult<Self> {
    let mut config = ToolConfig::load(root)?.release;
    if let Some(remote) = remote {
      config.remote = remote;
    }
    config.validate()?;

    Ok(Self {
      root: root.to_path_buf(),
      config,
    })
  }

  /// Absolute path of a file named relative to the root
  pub fn path(&self, relative: &Path) -> PathBuf {
    self.root.join(relative)
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.path(&self.config.manifest)
  }
}
