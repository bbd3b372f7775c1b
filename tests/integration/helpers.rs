//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A checkout with a bare `origin` remote next to it
pub struct TestRepo {
  _root: TempDir,
  /// Working tree
  pub path: PathBuf,
  /// Bare repository acting as `origin`
  pub remote: PathBuf,
}

impl TestRepo {
  /// Create a checkout whose manifest and frontend descriptor carry `version`
  pub fn new(version: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let remote = root.path().join("remote.git");
    let path = root.path().join("work");
    std::fs::create_dir_all(&path)?;

    git(root.path(), &["init", "--bare", "--initial-branch=main", "remote.git"])?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;
    git(&path, &["config", "tag.gpgsign", "false"])?;
    git(&path, &["remote", "add", "origin", &remote.to_string_lossy()])?;

    std::fs::write(
      path.join("Cargo.toml"),
      format!(
        r#"[package]
name = "game-server"
version = "{}"
edition = "2024"
rust-version = "1.91.0"

[dependencies]
serde = {{ version = "1.0.228", features = ["derive"] }}
"#,
        version
      ),
    )?;

    std::fs::write(
      path.join("Cargo.lock"),
      format!(
        "# This file is automatically @generated by Cargo.\nversion = 4\n\n[[package]]\nname = \"game-server\"\nversion = \"{}\"\n",
        version
      ),
    )?;

    std::fs::create_dir_all(path.join("frontend"))?;
    std::fs::write(
      path.join("frontend/package.json"),
      format!(
        "{{\n  \"name\": \"frontend\",\n  \"version\": \"{}\",\n  \"private\": true\n}}\n",
        version
      ),
    )?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;
    git(&path, &["push", "-u", "origin", "main"])?;

    Ok(Self {
      _root: root,
      path,
      remote,
    })
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// Write a file
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(path), content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Tags in the working repository
  pub fn local_tags(&self) -> Result<Vec<String>> {
    lines(git(&self.path, &["tag", "--list"])?)
  }

  /// Tags that reached the remote
  pub fn remote_tags(&self) -> Result<Vec<String>> {
    lines(git(&self.remote, &["tag", "--list"])?)
  }

  /// Subject line of HEAD
  pub fn head_subject(&self) -> Result<String> {
    let output = git(&self.path, &["log", "-1", "--format=%s"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Files touched by HEAD
  pub fn head_files(&self) -> Result<Vec<String>> {
    lines(git(&self.path, &["show", "--name-only", "--format=", "HEAD"])?)
  }

  /// Commit count on a ref
  pub fn commit_count(&self, repo: &Path, rev: &str) -> Result<usize> {
    let output = git(repo, &["rev-list", "--count", rev])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().parse()?)
  }

  /// Resolve a ref in a repository
  pub fn rev_parse(&self, repo: &Path, rev: &str) -> Result<String> {
    let output = git(repo, &["rev-parse", rev])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Annotated tag message
  pub fn tag_message(&self, tag: &str) -> Result<String> {
    let output = git(&self.path, &["tag", "-l", "--format=%(contents:subject)", tag])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }
}

fn lines(output: Output) -> Result<Vec<String>> {
  Ok(
    String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(str::trim)
      .filter(|l| !l.is_empty())
      .map(String::from)
      .collect(),
  )
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run tagbump and return its output whatever the exit status
pub fn run_tagbump_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let tagbump_bin = env!("CARGO_BIN_EXE_tagbump");

  Command::new(tagbump_bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run tagbump")
}

/// Run tagbump, failing unless it exits successfully
pub fn run_tagbump(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_tagbump_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "tagbump command failed: tagbump {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
