//! Release tagging and version bumping
//!
//! A run reads the version from the manifest, tags it, pushes the tag, writes
//! the next version into the manifest and descriptors, commits exactly those
//! files (plus the lock file) and pushes the branch.
//!
//! - **version**: the `MAJOR.MINOR.PATCH` triple and bump kinds
//! - **manifest**: version extraction and rewriting (literal or structured)
//! - **plan**: resolved description of a run, printable as a dry run
//! - **driver**: executes a plan step by step against a VCS backend

pub mod driver;
pub mod manifest;
pub mod plan;
pub mod version;

pub use driver::{ReleaseDriver, ReleaseStep};
pub use plan::ReleasePlan;
pub use version::BumpKind;
