//! Core building blocks shared by the release command
//!
//! - **config**: release.toml discovery, defaults and validation
//! - **context**: repository root + configuration, built once in main
//! - **error**: error types with contextual help and exit codes
//! - **vcs**: the `ReleaseVcs` collaborator and the system git backend

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
