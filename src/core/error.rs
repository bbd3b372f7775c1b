//! Error types for tagbump with contextual messages and exit codes
//!
//! Two failure families matter to a release run: the manifest or a descriptor
//! could not be understood (`Parse`), or a git process exited non-zero (`Git`).
//! Everything else is plumbing (I/O, configuration, aborted runs).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for tagbump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, unparsable manifest, missing files)
  User,
  /// System error (git could not run, I/O)
  System,
  /// A git process failed; carries its own exit status
  Process(i32),
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    match self {
      ExitCode::User => 1,
      ExitCode::System => 2,
      ExitCode::Process(code) => code,
    }
  }
}

/// Main error type for tagbump
#[derive(Debug)]
pub enum ReleaseError {
  /// Manifest or descriptor could not be understood
  Parse(ParseError),

  /// Git operation errors
  Git(GitError),

  /// Configuration errors
  Config(ConfigError),

  /// I/O errors
  Io(io::Error),

  /// A release run stopped part way through
  Aborted {
    step: String,
    completed: Vec<String>,
    tag: Option<String>,
    remote: String,
    source: Box<ReleaseError>,
  },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      ReleaseError::Parse(err) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: err.help_message(),
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  ///
  /// A failed git process propagates its own status so callers scripting
  /// around tagbump see the same code git produced.
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Parse(_) => ExitCode::User,
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Git(e) => match e.exit_status() {
        Some(code) if code != 0 => ExitCode::Process(code),
        _ => ExitCode::System,
      },
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Aborted { source, .. } => source.exit_code(),
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Parse(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Aborted {
        tag, remote, completed, ..
      } => aborted_help(tag.as_deref(), remote, completed),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Io(_) => None,
    }
  }
}

fn aborted_help(tag: Option<&str>, remote: &str, completed: &[String]) -> Option<String> {
  if completed.is_empty() {
    return Some("Nothing was changed. Fix the problem above and run the release again.".to_string());
  }

  let mut help = format!("Completed before the failure: {}.", completed.join(", "));
  if let Some(tag) = tag {
    help.push_str(&format!(
      "\n   The repository is tagged but not bumped. Either finish the bump by hand, or remove the tag with:\n     git tag -d {tag}\n     git push {remote} :refs/tags/{tag}"
    ));
  }
  Some(help)
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Parse(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Aborted { step, source, .. } => write!(f, "Release aborted at step '{}': {}", step, source),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::Aborted { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<ParseError> for ReleaseError {
  fn from(err: ParseError) -> Self {
    ReleaseError::Parse(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

/// Manifest and descriptor parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
  /// No `version = "X.Y.Z"` line in the manifest
  NoVersionLine { path: PathBuf },

  /// A string that should be `MAJOR.MINOR.PATCH` is not
  InvalidVersion { input: String },

  /// Structured field absent from the document
  MissingField { field: String },

  /// Structured field holds something other than the version being replaced
  FieldMismatch {
    field: String,
    expected: String,
    found: String,
  },

  /// Document could not be parsed at all
  InvalidDocument { kind: &'static str, reason: String },

  /// Incrementing a component would overflow it
  VersionOverflow { version: String, component: &'static str },
}

impl ParseError {
  fn help_message(&self) -> Option<String> {
    match self {
      ParseError::NoVersionLine { .. } => {
        Some("The manifest needs a line of the form: version = \"MAJOR.MINOR.PATCH\"".to_string())
      }
      ParseError::InvalidVersion { .. } => {
        Some("Versions are three non-negative integers, e.g. 1.2.3. Pre-release suffixes are not supported.".to_string())
      }
      ParseError::FieldMismatch { .. } => Some(
        "The file was edited out of step with the manifest. Align the versions, or set `rewrite = \"literal\"` in release.toml."
          .to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ParseError::NoVersionLine { path } => {
        write!(f, "No version line found in {}", path.display())
      }
      ParseError::InvalidVersion { input } => {
        write!(f, "Invalid version '{}'", input)
      }
      ParseError::MissingField { field } => {
        write!(f, "Field '{}' not found", field)
      }
      ParseError::FieldMismatch { field, expected, found } => {
        write!(f, "Field '{}' is '{}', expected '{}'", field, found, expected)
      }
      ParseError::InvalidDocument { kind, reason } => {
        write!(f, "Failed to parse {}: {}", kind, reason)
      }
      ParseError::VersionOverflow { version, component } => {
        write!(f, "Cannot bump the {} component of {}: it is already at its maximum", component, version)
      }
    }
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A value in release.toml is unusable
  InvalidValue { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::InvalidValue { field, .. } => Some(format!("Fix `{}` under [release] in release.toml.", field)),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid config value for '{}': {}", field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// git could not be started at all
  Spawn { command: String, reason: String },

  /// Git command failed
  CommandFailed {
    command: String,
    stderr: String,
    status: Option<i32>,
  },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed {
    remote: String,
    refspec: String,
    reason: String,
    status: Option<i32>,
  },
}

impl GitError {
  /// Exit status of the failed git process, if it ran
  pub fn exit_status(&self) -> Option<i32> {
    match self {
      GitError::CommandFailed { status, .. } | GitError::PushFailed { status, .. } => *status,
      _ => None,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") || reason.contains("rejected") {
          Some("The remote has commits you don't have. Pull first, then push again.".to_string())
        } else if reason.contains("Permission denied") || reason.contains("403") {
          Some("Check your SSH key or access token for the remote.".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run tagbump from inside a git checkout, or pass --root: {}",
        path.display()
      )),
      GitError::Spawn { .. } => Some("Make sure `git` is installed and on PATH.".to_string()),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::Spawn { command, reason } => {
        write!(f, "Failed to run {}: {}", command, reason)
      }
      GitError::CommandFailed { command, stderr, status } => {
        write!(f, "Git command failed: {}", command)?;
        if let Some(code) = status {
          write!(f, " (exit code {})", code)?;
        }
        let stderr = stderr.trim();
        if !stderr.is_empty() {
          write!(f, "\n{}", stderr)?;
        }
        Ok(())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { remote, refspec, reason, .. } => {
        write!(f, "Push of {} to {} failed: {}", refspec, remote, reason.trim())
      }
    }
  }
}

/// Result type alias for tagbump
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
