use crate::core::error::{ConfigError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for tagbump
/// Searched in order: release.toml, .release.toml, .cargo/release.toml, .config/release.toml
///
/// Every key is optional; a repository without a config file gets the
/// defaults below.
///
/// ```toml
/// [release]
/// remote = "origin"
/// manifest = "Cargo.toml"
/// lockfile = "Cargo.lock"
/// descriptors = ["frontend/package.json"]
/// tag_format = "v{version}"
/// tag_message = "Release {version}"
/// commit_message = "Bump version to {version}"
/// rewrite = "structured"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
  #[serde(default)]
  pub release: ReleaseConfig,
}

/// How the version is written back into files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
  /// Parse the document and set only the version field
  #[default]
  Structured,
  /// Replace every textual occurrence of the old version
  Literal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Remote that receives the tag and the bump commit
  #[serde(default = "default_remote")]
  pub remote: String,

  /// Manifest holding the authoritative version (relative to the root)
  #[serde(default = "default_manifest")]
  pub manifest: PathBuf,

  /// Lock file committed alongside the bump; never read
  #[serde(default = "default_lockfile")]
  pub lockfile: Option<PathBuf>,

  /// Other files carrying the same version string
  #[serde(default = "default_descriptors")]
  pub descriptors: Vec<PathBuf>,

  /// Tag name template
  #[serde(default = "default_tag_format")]
  pub tag_format: String,

  /// Annotated tag message template
  #[serde(default = "default_tag_message")]
  pub tag_message: String,

  /// Bump commit message template
  #[serde(default = "default_commit_message")]
  pub commit_message: String,

  #[serde(default)]
  pub rewrite: RewriteMode,
}

/// Placeholder substituted in the templates
pub const VERSION_PLACEHOLDER: &str = "{version}";

fn default_remote() -> String {
  "origin".to_string()
}

fn default_manifest() -> PathBuf {
  PathBuf::from("Cargo.toml")
}

fn default_lockfile() -> Option<PathBuf> {
  Some(PathBuf::from("Cargo.lock"))
}

fn default_descriptors() -> Vec<PathBuf> {
  vec![Path::new("frontend").join("package.json")]
}

fn default_tag_format() -> String {
  "v{version}".to_string()
}

fn default_tag_message() -> String {
  "Release {version}".to_string()
}

fn default_commit_message() -> String {
  "Bump version to {version}".to_string()
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      remote: default_remote(),
      manifest: default_manifest(),
      lockfile: default_lockfile(),
      descriptors: default_descriptors(),
      tag_format: default_tag_format(),
      tag_message: default_tag_message(),
      commit_message: default_commit_message(),
      rewrite: RewriteMode::default(),
    }
  }
}

impl ReleaseConfig {
  /// Validate release configuration
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.remote.trim().is_empty() {
      return Err(invalid("remote", "must not be empty"));
    }

    for (field, template) in [
      ("tag_format", &self.tag_format),
      ("tag_message", &self.tag_message),
      ("commit_message", &self.commit_message),
    ] {
      if !template.contains(VERSION_PLACEHOLDER) {
        return Err(invalid(field, &format!("must contain {}", VERSION_PLACEHOLDER)));
      }
    }

    if self.tag_format.chars().any(|c| c.is_whitespace()) {
      return Err(invalid("tag_format", "tag names cannot contain whitespace"));
    }

    let paths = std::iter::once(("manifest", &self.manifest))
      .chain(self.lockfile.iter().map(|p| ("lockfile", p)))
      .chain(self.descriptors.iter().map(|p| ("descriptors", p)));
    for (field, path) in paths {
      if path.is_absolute() || path.as_os_str().is_empty() {
        return Err(invalid(
          field,
          &format!("'{}' must be a path relative to the repository root", path.display()),
        ));
      }
    }

    Ok(())
  }

  /// Render a template with the given version
  pub fn render(template: &str, version: &impl std::fmt::Display) -> String {
    template.replace(VERSION_PLACEHOLDER, &version.to_string())
  }
}

fn invalid(field: &str, reason: &str) -> crate::core::error::ReleaseError {
  ConfigError::InvalidValue {
    field: field.to_string(),
    reason: reason.to_string(),
  }
  .into()
}

impl ToolConfig {
  /// Find config file in search order: release.toml, .release.toml, .cargo/release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".cargo").join("release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      log::debug!("no release.toml under {}, using defaults", path.display());
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ToolConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .release
      .validate()
      .with_context(|| format!("Invalid release configuration in {}", config_path.display()))?;

    log::debug!("loaded config from {}", config_path.display());
    Ok(config)
  }
}
