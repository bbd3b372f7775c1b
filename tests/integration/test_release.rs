//! End-to-end tests for `tagbump <bump>`

use crate::helpers::{TestRepo, run_tagbump, run_tagbump_raw};
use anyhow::Result;

#[test]
fn test_patch_release_tags_bumps_commits_and_pushes() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;

  run_tagbump(&repo.path, &["patch"])?;

  // Tag points at the release commit, locally and on the remote
  assert_eq!(repo.local_tags()?, vec!["v1.2.3"]);
  assert_eq!(repo.remote_tags()?, vec!["v1.2.3"]);
  assert_eq!(repo.tag_message("v1.2.3")?, "Release 1.2.3");
  assert_eq!(
    repo.rev_parse(&repo.path, "v1.2.3^{commit}")?,
    repo.rev_parse(&repo.path, "HEAD~1")?
  );

  // Manifest and descriptor moved on; only the package version changed
  let manifest = repo.read_file("Cargo.toml")?;
  assert!(manifest.contains("version = \"1.2.4\""));
  assert!(manifest.contains("rust-version = \"1.91.0\""));
  assert!(manifest.contains("serde = { version = \"1.0.228\""));
  assert!(repo.read_file("frontend/package.json")?.contains("\"version\": \"1.2.4\""));

  // Bump commit contains exactly the rewritten files and reached the remote
  assert_eq!(repo.head_subject()?, "Bump version to 1.2.4");
  let mut files = repo.head_files()?;
  files.sort();
  assert_eq!(files, vec!["Cargo.toml", "frontend/package.json"]);
  assert_eq!(
    repo.rev_parse(&repo.remote, "main")?,
    repo.rev_parse(&repo.path, "HEAD")?
  );

  Ok(())
}

#[test]
fn test_major_release_keeps_minor_and_patch() -> Result<()> {
  let repo = TestRepo::new("2.5.9")?;

  run_tagbump(&repo.path, &["major"])?;

  assert_eq!(repo.remote_tags()?, vec!["v2.5.9"]);
  assert!(repo.read_file("Cargo.toml")?.contains("version = \"3.5.9\""));
  assert_eq!(repo.head_subject()?, "Bump version to 3.5.9");

  Ok(())
}

#[test]
fn test_minor_release() -> Result<()> {
  let repo = TestRepo::new("0.4.2")?;

  run_tagbump(&repo.path, &["minor"])?;

  assert!(repo.read_file("Cargo.toml")?.contains("version = \"0.5.2\""));
  assert!(repo.read_file("frontend/package.json")?.contains("\"version\": \"0.5.2\""));

  Ok(())
}

#[test]
fn test_invalid_bump_kind_is_rejected_before_any_action() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  let before = repo.read_file("Cargo.toml")?;

  let output = run_tagbump_raw(&repo.path, &["beta"])?;

  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(2));
  assert!(repo.local_tags()?.is_empty());
  assert_eq!(repo.read_file("Cargo.toml")?, before);
  assert_eq!(repo.commit_count(&repo.path, "HEAD")?, 1);

  Ok(())
}

#[test]
fn test_dry_run_json_changes_nothing() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;

  let output = run_tagbump(&repo.path, &["patch", "--dry-run", "--json"])?;
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(plan["release_version"], "1.2.3");
  assert_eq!(plan["next_version"], "1.2.4");
  assert_eq!(plan["tag_name"], "v1.2.3");
  assert_eq!(plan["commit_message"], "Bump version to 1.2.4");
  assert_eq!(plan["remote"], "origin");

  assert!(repo.local_tags()?.is_empty());
  assert!(repo.read_file("Cargo.toml")?.contains("version = \"1.2.3\""));

  Ok(())
}

#[test]
fn test_dry_run_text_output() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;

  let output = run_tagbump(&repo.path, &["minor", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("v1.2.3"), "got: {}", stdout);
  assert!(stdout.contains("1.3.3"), "got: {}", stdout);
  assert!(stdout.contains("Dry-run"), "got: {}", stdout);
  assert!(repo.local_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_manifest_without_version_fails_with_parse_error() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  repo.write_file("Cargo.toml", "[package]\nname = \"game-server\"\n")?;
  repo.commit("Drop version")?;

  let output = run_tagbump_raw(&repo.path, &["patch"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("No version line found"), "got: {}", stderr);
  assert!(repo.local_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_existing_tag_aborts_before_changes() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  crate::helpers::git(&repo.path, &["tag", "v1.2.3"])?;

  let output = run_tagbump_raw(&repo.path, &["patch"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(!output.status.success());
  assert!(stderr.contains("already exists"), "got: {}", stderr);
  assert!(repo.read_file("Cargo.toml")?.contains("version = \"1.2.3\""));
  assert!(repo.remote_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_push_failure_leaves_tagged_but_unbumped_repo() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  std::fs::remove_dir_all(&repo.remote)?;

  let output = run_tagbump_raw(&repo.path, &["patch"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(!output.status.success());
  assert_ne!(output.status.code(), Some(0));
  // Tag was created before the push failed; nothing was rolled back
  assert_eq!(repo.local_tags()?, vec!["v1.2.3"]);
  assert!(repo.read_file("Cargo.toml")?.contains("version = \"1.2.3\""));
  assert!(stderr.contains("git tag -d v1.2.3"), "got: {}", stderr);

  Ok(())
}

#[test]
fn test_unknown_remote_is_rejected() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;

  let output = run_tagbump_raw(&repo.path, &["patch", "--remote", "upstream"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(!output.status.success());
  assert!(stderr.contains("upstream"), "got: {}", stderr);
  assert!(repo.local_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_literal_rewrite_mode_replaces_every_occurrence() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  repo.write_file(
    "frontend/package.json",
    "{\n  \"name\": \"frontend\",\n  \"version\": \"1.2.3\",\n  \"dependencies\": {\n    \"left-pad\": \"1.2.3\"\n  }\n}\n",
  )?;
  repo.commit("Add dependency")?;
  repo.write_file("release.toml", "[release]\nrewrite = \"literal\"\n")?;

  run_tagbump(&repo.path, &["patch"])?;

  let descriptor = repo.read_file("frontend/package.json")?;
  assert_eq!(descriptor.matches("1.2.4").count(), 2);
  assert_eq!(descriptor.matches("1.2.3").count(), 0);

  Ok(())
}

#[test]
fn test_structured_rewrite_leaves_unrelated_occurrences() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  repo.write_file(
    "frontend/package.json",
    "{\n  \"name\": \"frontend\",\n  \"version\": \"1.2.3\",\n  \"dependencies\": {\n    \"left-pad\": \"1.2.3\"\n  }\n}\n",
  )?;
  repo.commit("Add dependency")?;

  run_tagbump(&repo.path, &["patch"])?;

  let descriptor = repo.read_file("frontend/package.json")?;
  assert!(descriptor.contains("\"version\": \"1.2.4\""));
  assert!(descriptor.contains("\"left-pad\": \"1.2.3\""));

  Ok(())
}

#[test]
fn test_runs_from_subdirectory() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;

  run_tagbump(&repo.path.join("frontend"), &["patch"])?;

  assert!(repo.read_file("Cargo.toml")?.contains("version = \"1.2.4\""));
  assert_eq!(repo.remote_tags()?, vec!["v1.2.3"]);

  Ok(())
}

#[test]
fn test_descriptor_out_of_step_leaves_repo_untagged() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  repo.write_file(
    "frontend/package.json",
    "{\n  \"name\": \"frontend\",\n  \"version\": \"0.9.0\"\n}\n",
  )?;
  repo.commit("Drift frontend version")?;

  let output = run_tagbump_raw(&repo.path, &["patch"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("package.json"), "got: {}", stderr);
  assert!(repo.local_tags()?.is_empty());
  assert!(repo.remote_tags()?.is_empty());
  assert!(repo.read_file("Cargo.toml")?.contains("version = \"1.2.3\""));

  Ok(())
}

#[test]
fn test_descriptor_formatting_survives_release() -> Result<()> {
  let repo = TestRepo::new("1.2.3")?;
  let descriptor = "{\n    \"name\": \"frontend\",\n    \"author\": \"Ren\\u00e9\",\n    \"version\": \"1.2.3\",\n    \"files\": [\"dist\"]\n}\n";
  repo.write_file("frontend/package.json", descriptor)?;
  repo.commit("Reformat descriptor")?;

  run_tagbump(&repo.path, &["patch"])?;

  assert_eq!(
    repo.read_file("frontend/package.json")?,
    descriptor.replace("\"version\": \"1.2.3\"", "\"version\": \"1.2.4\"")
  );

  Ok(())
}
