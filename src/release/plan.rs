//! Release planning: everything a run will do, computed before doing any of it

use crate::core::config::{ReleaseConfig, RewriteMode};
use crate::core::context::ReleaseContext;
use crate::core::error::{ParseError, ReleaseResult};
use crate::release::manifest;
use crate::release::version::{BumpKind, Version};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A fully resolved release run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePlan {
  /// Version being released (read from the manifest)
  pub release_version: Version,
  /// Version the manifest moves to afterwards
  pub next_version: Version,
  pub bump: BumpKind,
  pub tag_name: String,
  pub tag_message: String,
  pub commit_message: String,
  pub remote: String,
  /// Manifest path, relative to the root
  pub manifest: PathBuf,
  /// Descriptor paths, relative to the root
  pub descriptors: Vec<PathBuf>,
  /// Lock file to include in the commit, if it exists on disk
  pub lockfile: Option<PathBuf>,
  pub rewrite: RewriteMode,
}

impl ReleasePlan {
  /// Read the manifest and resolve the plan for `bump`
  pub fn prepare(ctx: &ReleaseContext, bump: BumpKind) -> ReleaseResult<Self> {
    let release_version = manifest::extract_version(&ctx.manifest_path())?;

    let lockfile = match &ctx.config.lockfile {
      Some(lock) if ctx.path(lock).exists() => Some(lock.clone()),
      Some(lock) => {
        log::warn!("lock file {} not found, committing without it", lock.display());
        None
      }
      None => None,
    };

    Ok(Self::new(&ctx.config, release_version, bump, lockfile)?)
  }

  /// Build a plan from an already known version
  pub fn new(
    config: &ReleaseConfig,
    release_version: Version,
    bump: BumpKind,
    lockfile: Option<PathBuf>,
  ) -> Result<Self, ParseError> {
    let next_version = release_version.bump(bump)?;

    Ok(Self {
      release_version,
      next_version,
      bump,
      tag_name: ReleaseConfig::render(&config.tag_format, &release_version),
      tag_message: ReleaseConfig::render(&config.tag_message, &release_version),
      commit_message: ReleaseConfig::render(&config.commit_message, &next_version),
      remote: config.remote.clone(),
      manifest: config.manifest.clone(),
      descriptors: config.descriptors.clone(),
      lockfile,
      rewrite: config.rewrite,
    })
  }

  /// Files rewritten with the next version, manifest first
  pub fn rewrite_targets(&self) -> impl Iterator<Item = &PathBuf> {
    std::iter::once(&self.manifest).chain(self.descriptors.iter())
  }

  /// Exactly the paths committed in the bump commit
  pub fn commit_paths(&self) -> Vec<PathBuf> {
    let mut paths = vec![self.manifest.clone()];
    paths.extend(self.lockfile.iter().cloned());
    paths.extend(self.descriptors.iter().cloned());
    paths
  }
}
