//! System git backend
//!
//! Every operation is one `git -C <root>` subprocess with an isolated
//! environment. Success is decided by exit status alone; stderr is kept only
//! to explain failures.

use super::ReleaseVcs;
use crate::core::error::{GitError, ReleaseError, ReleaseResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Environment variables git still sees after the environment is cleared
///
/// Pushing and signing need the maintainer's SSH agent, GPG setup and proxy.
const FORWARDED_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "XDG_CONFIG_HOME",
  "SSH_AUTH_SOCK",
  "SSH_AGENT_PID",
  "SSH_ASKPASS",
  "GIT_SSH",
  "GIT_SSH_COMMAND",
  "GIT_ASKPASS",
  "GNUPGHOME",
  "GPG_TTY",
  "HTTP_PROXY",
  "HTTPS_PROXY",
  "ALL_PROXY",
  "NO_PROXY",
  "http_proxy",
  "https_proxy",
  "all_proxy",
  "no_proxy",
];

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Working tree root; every command runs here
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open the git repository containing `path`
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  /// Commands then run from the top of the working tree, so relative paths
  /// are always relative to the repository root.
  pub fn open(path: &Path) -> ReleaseResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .map_err(|e| GitError::Spawn {
        command: "git rev-parse".to_string(),
        reason: e.to_string(),
      })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ReleaseError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ReleaseError::message(format!("Failed to open git repository: {}", stderr.trim())));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root as reported by git
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree
  /// - Clears environment variables
  /// - Forwards only [`FORWARDED_ENV`] (credentials, signing, proxies)
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    self.isolated_cmd(|key| std::env::var_os(key))
  }

  fn isolated_cmd(&self, lookup: impl Fn(&str) -> Option<OsString>) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.work_tree);

    // Ambient GIT_DIR, GIT_INDEX_FILE and friends must not redirect the run
    cmd.env_clear();
    for key in FORWARDED_ENV {
      if let Some(value) = lookup(key) {
        cmd.env(key, value);
      }
    }

    // Never open an editor or pager; tag/commit messages come from -m
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd.env("GIT_EDITOR", "true");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }

  /// Run git with `args`, turning spawn failures and non-zero exits into errors
  fn run(&self, args: &[&str]) -> ReleaseResult<Output> {
    let command = format!("git {}", args.join(" "));
    log::debug!("running {}", command);

    let output = self.git_cmd().args(args).output().map_err(|e| GitError::Spawn {
      command: command.clone(),
      reason: e.to_string(),
    })?;

    if !output.status.success() {
      log::debug!("{} exited with {:?}", command, output.status.code());
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status.code(),
      }));
    }

    Ok(output)
  }

  fn push(&self, remote: &str, refspec: &str) -> ReleaseResult<()> {
    match self.run(&["push", remote, refspec]) {
      Ok(_) => Ok(()),
      Err(ReleaseError::Git(GitError::CommandFailed { stderr, status, .. })) => {
        Err(ReleaseError::Git(GitError::PushFailed {
          remote: remote.to_string(),
          refspec: refspec.to_string(),
          reason: stderr,
          status,
        }))
      }
      Err(e) => Err(e),
    }
  }
}

impl ReleaseVcs for SystemGit {
  fn current_branch(&self) -> ReleaseResult<String> {
    let output = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  fn has_remote(&self, name: &str) -> ReleaseResult<bool> {
    let output = self.run(&["remote"])?;
    Ok(String::from_utf8_lossy(&output.stdout).lines().any(|l| l.trim() == name))
  }

  fn tag_exists(&self, tag: &str) -> ReleaseResult<bool> {
    let refname = format!("refs/tags/{}", tag);
    let status = self
      .git_cmd()
      .args(["rev-parse", "--quiet", "--verify", &refname])
      .output()
      .map_err(|e| GitError::Spawn {
        command: "git rev-parse --verify".to_string(),
        reason: e.to_string(),
      })?
      .status;

    Ok(status.success())
  }

  fn create_annotated_tag(&self, tag: &str, message: &str) -> ReleaseResult<()> {
    self.run(&["tag", "-a", tag, "-m", message])?;
    Ok(())
  }

  fn push_tag(&self, remote: &str, tag: &str) -> ReleaseResult<()> {
    self.push(remote, &format!("refs/tags/{}", tag))
  }

  fn commit_paths(&self, message: &str, paths: &[PathBuf]) -> ReleaseResult<()> {
    let paths: Vec<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();

    let mut args = vec!["commit", "-m", message, "--"];
    args.extend(paths.iter().map(String::as_str));
    self.run(&args)?;
    Ok(())
  }

  fn push_branch(&self, remote: &str, branch: &str) -> ReleaseResult<()> {
    self.push(remote, branch)
  }
}
