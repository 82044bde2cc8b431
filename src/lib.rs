//! verbump library
//!
//! Scripted, idempotent edits to version-pinning build manifests: each step
//! verifies a pinned version, rewrites it when it differs, and verifies again.

pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod mutate;
pub mod runner;
pub mod step;
pub mod steps;

// Re-export main types for convenience
pub use cli::{Cli, VersionPair};
pub use config::{ManifestPaths, UpdaterConfig};
pub use error::{Result, UpdateError};
pub use manifest::{BuildManifest, VersionEntry, update_version_map, verify_version_map};
pub use mutate::{MutateOptions, search_replace};
pub use runner::{RunReport, StepOutcome, check, run, run_with_report};
pub use step::{Logger, Phase, Step, StepConfig, default_logger, silent_logger};
pub use steps::StepKind;
