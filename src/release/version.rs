//! Release version triple and bump kinds

use crate::core::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `MAJOR.MINOR.PATCH` version
///
/// Only the plain three-integer form is understood; pre-release and build
/// metadata suffixes are rejected by [`Version::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Version {
  pub major: u64,
  pub minor: u64,
  pub patch: u64,
}

impl Version {
  pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self { major, minor, patch }
  }

  /// Return the version that follows this one for the given bump kind
  ///
  /// A major bump keeps minor and patch as they are: `2.5.9` becomes `3.5.9`.
  /// Fails instead of wrapping when the component is already `u64::MAX`.
  pub fn bump(&self, kind: BumpKind) -> Result<Self, ParseError> {
    let overflow = || ParseError::VersionOverflow {
      version: self.to_string(),
      component: kind.as_str(),
    };

    Ok(match kind {
      BumpKind::Major => Self::new(self.major.checked_add(1).ok_or_else(overflow)?, self.minor, self.patch),
      BumpKind::Minor => Self::new(self.major, self.minor.checked_add(1).ok_or_else(overflow)?, self.patch),
      BumpKind::Patch => Self::new(self.major, self.minor, self.patch.checked_add(1).ok_or_else(overflow)?),
    })
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
  }
}

impl FromStr for Version {
  type Err = ParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || ParseError::InvalidVersion { input: s.to_string() };

    let mut parts = s.split('.');
    let mut next = || -> Result<u64, ParseError> {
      let part = parts.next().ok_or_else(invalid)?;
      // u64::from_str accepts a leading '+', so check digits first
      if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
      }
      part.parse().map_err(|_| invalid())
    };

    let version = Version::new(next()?, next()?, next()?);
    if parts.next().is_some() {
      return Err(invalid());
    }
    Ok(version)
  }
}

impl From<Version> for String {
  fn from(v: Version) -> Self {
    v.to_string()
  }
}

impl TryFrom<String> for Version {
  type Error = ParseError;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.parse()
  }
}

/// Which component of the version to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
  Major,
  Minor,
  Patch,
}

impl BumpKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      BumpKind::Major => "major",
      BumpKind::Minor => "minor",
      BumpKind::Patch => "patch",
    }
  }
}

impl fmt::Display for BumpKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
