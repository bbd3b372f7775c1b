//! Release command implementation
//!
//! `tagbump <major|minor|patch>`: tag the version in the manifest, move the
//! manifest (and descriptors) to the next version, commit and push.

use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::vcs::ReleaseVcs;
use crate::release::{BumpKind, ReleaseDriver, ReleasePlan, ReleaseStep};

/// Run the release command
pub fn run_release<V: ReleaseVcs>(
  ctx: &ReleaseContext,
  vcs: &V,
  bump: BumpKind,
  dry_run: bool,
  json: bool,
) -> ReleaseResult<()> {
  let plan = ReleasePlan::prepare(ctx, bump)?;

  if dry_run {
    if json {
      println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
      print_plan(&plan);
      println!("🔍 Dry-run mode (no changes applied)");
    }
    return Ok(());
  }

  print_plan(&plan);
  println!("✅ Applying release...");

  let outcome = ReleaseDriver::new(ctx, vcs).execute(&plan, |step, branch| match step {
    ReleaseStep::CreateTag => println!("   Created tag: {}", plan.tag_name),
    ReleaseStep::PushTag => println!("   Pushed {} to {}", plan.tag_name, plan.remote),
    ReleaseStep::RewriteFile(path) => println!("   Updated {}", path.display()),
    ReleaseStep::Commit => println!("   Committed: {}", plan.commit_message),
    ReleaseStep::PushBranch => println!("   Pushed {} to {}", branch, plan.remote),
  })?;

  println!();
  println!(
    "✅ Released {} ({} step(s)), {} is now at {}",
    plan.release_version,
    outcome.steps.len(),
    outcome.branch,
    plan.next_version
  );

  Ok(())
}

fn print_plan(plan: &ReleasePlan) {
  println!("📦 Release Plan");
  println!();
  println!("  Release:  {} (tag {})", plan.release_version, plan.tag_name);
  println!("  Next:     {} ({})", plan.next_version, plan.bump);
  println!("  Remote:   {}", plan.remote);
  println!("  Rewrite:  {:?}", plan.rewrite);
  println!("  Files:");
  for path in plan.commit_paths() {
    println!("    {}", path.display());
  }
  println!();
}
