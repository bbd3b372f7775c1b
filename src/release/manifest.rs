//! Reading and rewriting the version in project files
//!
//! Two rewrite strategies are available:
//!
//! - **literal**: replace every occurrence of the old version string in the
//!   file, wherever it appears
//! - **structured**: parse the document and change exactly one field
//!   (`toml_edit` for TOML; for JSON, `serde_json` locates the string value
//!   and only those bytes are replaced)
//!
//! The structured helpers are pure functions of `(document, field, value)`;
//! only [`rewrite_version_in_file`] touches the filesystem.

use crate::core::config::RewriteMode;
use crate::core::error::{ParseError, ReleaseResult, ResultExt};
use crate::release::version::Version;
use regex::Regex;
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

/// First `version = "X.Y.Z"` that starts a line (indentation allowed)
fn version_line() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r#"(?m)^[ \t]*version[ \t]*=[ \t]*"([0-9]+\.[0-9]+\.[0-9]+)""#).unwrap())
}

/// Manifest fields that may hold the release version, in lookup order
const MANIFEST_VERSION_FIELDS: &[&str] = &["package.version", "workspace.package.version"];

/// Descriptor (package.json) field holding the release version
const DESCRIPTOR_VERSION_FIELD: &str = "version";

/// Kind of document, decided from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
  Toml,
  Json,
}

impl DocumentKind {
  pub fn from_path(path: &Path) -> Option<Self> {
    match path.extension().and_then(|e| e.to_str()) {
      Some("toml") => Some(DocumentKind::Toml),
      Some("json") => Some(DocumentKind::Json),
      _ => None,
    }
  }
}

/// Find the release version in manifest text
///
/// Only the first matching line counts. Keys like `rust-version` and inline
/// dependency tables never match because the key must start the line.
pub fn find_version(content: &str) -> Option<Result<Version, ParseError>> {
  version_line()
    .captures(content)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str().parse())
}

/// Read the manifest at `path` and extract its version
pub fn extract_version(path: &Path) -> ReleaseResult<Version> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

  match find_version(&content) {
    Some(version) => Ok(version?),
    None => Err(
      ParseError::NoVersionLine {
        path: path.to_path_buf(),
      }
      .into(),
    ),
  }
}

/// Replace every occurrence of `old` with `new` in `content`
pub fn replace_version_text(content: &str, old: &Version, new: &Version) -> String {
  content.replace(&old.to_string(), &new.to_string())
}

/// Set a dotted `field` (e.g. `package.version`) in a TOML document
///
/// The field must already exist and hold a string; surrounding formatting,
/// comments and key order are left alone.
pub fn set_toml_field(document: &str, field: &str, value: &str) -> Result<String, ParseError> {
  let mut doc: toml_edit::DocumentMut = document.parse().map_err(|e: toml_edit::TomlError| {
    ParseError::InvalidDocument {
      kind: "TOML",
      reason: e.to_string(),
    }
  })?;

  let item = toml_item_mut(doc.as_item_mut(), field)?;
  let decor = item.as_value().map(|v| v.decor().clone());
  *item = toml_edit::value(value);
  if let (Some(decor), Some(v)) = (decor, item.as_value_mut()) {
    *v.decor_mut() = decor;
  }

  Ok(doc.to_string())
}

/// Read a dotted string `field` from a TOML document
pub fn get_toml_field(document: &str, field: &str) -> Result<String, ParseError> {
  let mut doc: toml_edit::DocumentMut = document.parse().map_err(|e: toml_edit::TomlError| {
    ParseError::InvalidDocument {
      kind: "TOML",
      reason: e.to_string(),
    }
  })?;
  let item = toml_item_mut(doc.as_item_mut(), field)?;
  item
    .as_str()
    .map(str::to_string)
    .ok_or_else(|| ParseError::MissingField { field: field.to_string() })
}

fn toml_item_mut<'a>(root: &'a mut toml_edit::Item, field: &str) -> Result<&'a mut toml_edit::Item, ParseError> {
  let missing = || ParseError::MissingField { field: field.to_string() };

  let mut item = root;
  for key in field.split('.') {
    item = item
      .as_table_like_mut()
      .and_then(|t| t.get_mut(key))
      .ok_or_else(missing)?;
  }

  if item.as_str().is_none() {
    // e.g. `version.workspace = true`
    return Err(missing());
  }
  Ok(item)
}

/// Set a dotted `field` in a JSON document
///
/// Only the bytes of the existing string value are replaced; indentation,
/// key order, escapes and the trailing newline stay exactly as they were.
pub fn set_json_field(document: &str, field: &str, value: &str) -> Result<String, ParseError> {
  let (span, _) = json_string_span(document, field)?;
  let encoded = serde_json::to_string(value).map_err(|e| ParseError::InvalidDocument {
    kind: "JSON",
    reason: e.to_string(),
  })?;

  let mut out = String::with_capacity(document.len() + encoded.len());
  out.push_str(&document[..span.start]);
  out.push_str(&encoded);
  out.push_str(&document[span.end..]);
  Ok(out)
}

/// Read a dotted string `field` from a JSON document
pub fn get_json_field(document: &str, field: &str) -> Result<String, ParseError> {
  json_string_span(document, field).map(|(_, text)| text)
}

/// Byte range of the string value at `field` (quotes included) and its text
fn json_string_span(document: &str, field: &str) -> Result<(Range<usize>, String), ParseError> {
  let missing = || ParseError::MissingField { field: field.to_string() };

  serde_json::from_str::<serde::de::IgnoredAny>(document).map_err(|e| ParseError::InvalidDocument {
    kind: "JSON",
    reason: e.to_string(),
  })?;

  // Each RawValue borrows from `document`, so its offset is a pointer difference
  let mut raw = document;
  for key in field.split('.') {
    let object: HashMap<String, &RawValue> = serde_json::from_str(raw).map_err(|_| missing())?;
    let value: &RawValue = *object.get(key).ok_or_else(missing)?;
    raw = value.get();
  }

  let text: String = serde_json::from_str(raw).map_err(|_| missing())?;
  let start = raw.as_ptr() as usize - document.as_ptr() as usize;
  Ok((start..start + raw.len(), text))
}

/// Structured update of the version field in a document
///
/// TOML documents try each of [`MANIFEST_VERSION_FIELDS`]; JSON documents use
/// the top-level `version`. The chosen field must currently hold `old`.
pub fn update_version_field(document: &str, kind: DocumentKind, old: &Version, new: &Version) -> Result<String, ParseError> {
  let expected = old.to_string();
  let fields: &[&str] = match kind {
    DocumentKind::Toml => MANIFEST_VERSION_FIELDS,
    DocumentKind::Json => &[DESCRIPTOR_VERSION_FIELD],
  };

  let mut last_err = None;
  for field in fields {
    let current = match kind {
      DocumentKind::Toml => get_toml_field(document, field),
      DocumentKind::Json => get_json_field(document, field),
    };

    match current {
      Ok(found) if found == expected => {
        return match kind {
          DocumentKind::Toml => set_toml_field(document, field, &new.to_string()),
          DocumentKind::Json => set_json_field(document, field, &new.to_string()),
        };
      }
      Ok(found) => {
        last_err = Some(ParseError::FieldMismatch {
          field: field.to_string(),
          expected: expected.clone(),
          found,
        });
      }
      Err(ParseError::MissingField { .. }) => {
        // Keep a mismatch from an earlier field; it is more useful
        last_err.get_or_insert(ParseError::MissingField {
          field: field.to_string(),
        });
      }
      Err(e) => return Err(e),
    }
  }

  Err(last_err.unwrap_or_else(|| ParseError::MissingField {
    field: fields.join(" or "),
  }))
}

/// Compute the new contents of the file at `path` without writing them
///
/// Files that are neither `.toml` nor `.json` always use literal
/// replacement, whatever the configured mode.
pub fn rewritten_content(path: &Path, old: &Version, new: &Version, mode: RewriteMode) -> ReleaseResult<String> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

  match (mode, DocumentKind::from_path(path)) {
    (RewriteMode::Structured, Some(kind)) => update_version_field(&content, kind, old, new)
      .with_context(|| format!("Failed to update version in {}", path.display())),
    _ => Ok(replace_version_text(&content, old, new)),
  }
}

/// Rewrite the version in the file at `path`
pub fn rewrite_version_in_file(path: &Path, old: &Version, new: &Version, mode: RewriteMode) -> ReleaseResult<()> {
  let updated = rewritten_content(path, old, new, mode)?;

  fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
  log::debug!("rewrote {} ({} -> {})", path.display(), old, new);
  Ok(())
}
