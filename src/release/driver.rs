//! Release driver: runs a [`ReleasePlan`] against a [`ReleaseVcs`]
//!
//! The run is strictly linear:
//!
//! ```text
//! preflight -> tag -> push tag -> rewrite manifest -> rewrite descriptors -> commit -> push branch
//! ```
//!
//! The first failing step stops the run. Nothing is retried or rolled back;
//! the returned error records which steps already happened so the maintainer
//! can finish or undo by hand.

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::vcs::ReleaseVcs;
use crate::release::manifest;
use crate::release::plan::ReleasePlan;
use std::path::PathBuf;

/// One mutating step of a release run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseStep {
  CreateTag,
  PushTag,
  RewriteFile(PathBuf),
  Commit,
  PushBranch,
}

impl ReleaseStep {
  /// Human-readable description, e.g. `push tag v1.2.3 to origin`
  pub fn describe(&self, plan: &ReleasePlan, branch: &str) -> String {
    match self {
      ReleaseStep::CreateTag => format!("create tag {}", plan.tag_name),
      ReleaseStep::PushTag => format!("push tag {} to {}", plan.tag_name, plan.remote),
      ReleaseStep::RewriteFile(path) => format!("rewrite {}", path.display()),
      ReleaseStep::Commit => format!("commit '{}'", plan.commit_message),
      ReleaseStep::PushBranch => format!("push {} to {}", branch, plan.remote),
    }
  }
}

/// What a successful run did
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
  pub branch: String,
  pub steps: Vec<ReleaseStep>,
}

pub struct ReleaseDriver<'a, V: ReleaseVcs> {
  ctx: &'a ReleaseContext,
  vcs: &'a V,
}

impl<'a, V: ReleaseVcs> ReleaseDriver<'a, V> {
  pub fn new(ctx: &'a ReleaseContext, vcs: &'a V) -> Self {
    Self { ctx, vcs }
  }

  /// Steps in execution order
  pub fn steps(plan: &ReleasePlan) -> Vec<ReleaseStep> {
    let mut steps = vec![ReleaseStep::CreateTag, ReleaseStep::PushTag];
    steps.extend(plan.rewrite_targets().cloned().map(ReleaseStep::RewriteFile));
    steps.push(ReleaseStep::Commit);
    steps.push(ReleaseStep::PushBranch);
    steps
  }

  /// Read-only checks; returns the branch that will be pushed
  pub fn preflight(&self, plan: &ReleasePlan) -> ReleaseResult<String> {
    if !self.vcs.has_remote(&plan.remote)? {
      return Err(ReleaseError::with_help(
        format!("Remote '{}' is not configured", plan.remote),
        format!("Add it with `git remote add {} <url>` or pass --remote", plan.remote),
      ));
    }

    let branch = self.vcs.current_branch()?;
    if branch == "HEAD" {
      return Err(ReleaseError::with_help(
        "HEAD is detached",
        "Check out the branch the release should be committed to",
      ));
    }

    if self.vcs.tag_exists(&plan.tag_name)? {
      return Err(ReleaseError::with_help(
        format!("Tag '{}' already exists", plan.tag_name),
        "Was this version already released? Bump the manifest or delete the stale tag.",
      ));
    }

    for path in plan.rewrite_targets() {
      let full = self.ctx.path(path);
      if !full.is_file() {
        return Err(ReleaseError::message(format!("File to rewrite not found: {}", path.display())));
      }
      // A descriptor out of step with the manifest must fail before the tag exists
      manifest::rewritten_content(&full, &plan.release_version, &plan.next_version, plan.rewrite)?;
    }

    Ok(branch)
  }

  /// Run preflight and every step, reporting each completed step to `on_step`
  pub fn execute<F>(&self, plan: &ReleasePlan, mut on_step: F) -> ReleaseResult<ReleaseOutcome>
  where
    F: FnMut(&ReleaseStep, &str),
  {
    let branch = self.preflight(plan).map_err(|e| self.aborted(plan, "preflight", &[], "", e))?;

    let mut done = Vec::new();
    for step in Self::steps(plan) {
      log::info!("{}", step.describe(plan, &branch));

      if let Err(e) = self.run_step(&step, plan, &branch) {
        let name = step.describe(plan, &branch);
        return Err(self.aborted(plan, &name, &done, &branch, e));
      }

      on_step(&step, &branch);
      done.push(step);
    }

    Ok(ReleaseOutcome { branch, steps: done })
  }

  fn run_step(&self, step: &ReleaseStep, plan: &ReleasePlan, branch: &str) -> ReleaseResult<()> {
    match step {
      ReleaseStep::CreateTag => self.vcs.create_annotated_tag(&plan.tag_name, &plan.tag_message),
      ReleaseStep::PushTag => self.vcs.push_tag(&plan.remote, &plan.tag_name),
      ReleaseStep::RewriteFile(path) => manifest::rewrite_version_in_file(
        &self.ctx.path(path),
        &plan.release_version,
        &plan.next_version,
        plan.rewrite,
      ),
      ReleaseStep::Commit => self.vcs.commit_paths(&plan.commit_message, &plan.commit_paths()),
      ReleaseStep::PushBranch => self.vcs.push_branch(&plan.remote, branch),
    }
  }

  fn aborted(&self, plan: &ReleasePlan, step: &str, done: &[ReleaseStep], branch: &str, source: ReleaseError) -> ReleaseError {
    let tagged = done.contains(&ReleaseStep::CreateTag);
    ReleaseError::Aborted {
      step: step.to_string(),
      completed: done.iter().map(|s| s.describe(plan, branch)).collect(),
      tag: tagged.then(|| plan.tag_name.clone()),
      remote: plan.remote.clone(),
      source: Box::new(source),
    }
  }
}
