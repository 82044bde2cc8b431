//! Two-phase step contract.
//!
//! A step is one idempotent check-then-fix unit of work. The runner calls
//! `verify` first and only calls `apply` when verification fails, then calls
//! `verify` again to confirm the fix.
//!
//! # Contract
//!
//! - `verify()` must not modify anything.
//! - Immediately after a successful `apply()`, `verify()` with the same
//!   config must succeed. The runner reports a violation as a post-check
//!   failure, distinct from an apply failure.
//! - Steps are stateless; everything they need travels in `StepConfig`.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::ManifestPaths;
use crate::error::Result;

/// Callback receiving human-readable progress messages from steps and the
/// search-replace engine.
pub type Logger = Arc<dyn Fn(&str) + Send + Sync>;

/// Default logger: indented lines on stdout, mirrored to tracing.
pub fn default_logger() -> Logger {
    Arc::new(|msg: &str| {
        debug!(target: "verbump::step", "{}", msg);
        println!("  > {}", msg);
    })
}

/// Logger that drops every message.
pub fn silent_logger() -> Logger {
    Arc::new(|_: &str| {})
}

/// Phase of a step invocation, used when attributing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreCheck,
    Apply,
    PostCheck,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreCheck => "pre-check",
            Phase::Apply => "apply",
            Phase::PostCheck => "post-check",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options shared by every step invocation in a run.
#[derive(Clone)]
pub struct StepConfig {
    /// Key identifying what to update, e.g. the `1.0` in `1.0=1.0.13`.
    pub target: String,
    /// New value for the target. Steps that need no value ignore it.
    pub value: String,
    /// Manifest locations the steps read and rewrite.
    pub manifests: ManifestPaths,
    /// Progress callback.
    pub logger: Logger,
}

impl StepConfig {
    /// Config with default manifest paths and the stdout logger.
    pub fn new(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            value: value.into(),
            manifests: ManifestPaths::default(),
            logger: default_logger(),
        }
    }

    pub fn with_manifests(mut self, manifests: ManifestPaths) -> Self {
        self.manifests = manifests;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Send a message through the configured logger.
    pub fn log(&self, msg: impl AsRef<str>) {
        (self.logger)(msg.as_ref());
    }
}

impl fmt::Debug for StepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepConfig")
            .field("target", &self.target)
            .field("value", &self.value)
            .field("manifests", &self.manifests)
            .finish_non_exhaustive()
    }
}

/// An idempotent update with a verify and an apply phase.
pub trait Step {
    /// Display name used in progress output and error messages.
    fn name(&self) -> String;

    /// Check whether the desired state already holds.
    fn verify(&self, config: &StepConfig) -> Result<()>;

    /// Bring the system into the desired state.
    fn apply(&self, config: &StepConfig) -> Result<()>;
}

impl<S: Step + ?Sized> Step for &S {
    fn name(&self) -> String {
        (**self).name()
    }

    fn verify(&self, config: &StepConfig) -> Result<()> {
        (**self).verify(config)
    }

    fn apply(&self, config: &StepConfig) -> Result<()> {
        (**self).apply(config)
    }
}

impl<S: Step + ?Sized> Step for Box<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn verify(&self, config: &StepConfig) -> Result<()> {
        (**self).verify(config)
    }

    fn apply(&self, config: &StepConfig) -> Result<()> {
        (**self).apply(config)
    }
}
