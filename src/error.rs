//! Error handling module for verbump
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Step failures are wrapped with the step name and phase so the runner can
//! report several of them at once.

use std::path::PathBuf;

use thiserror::Error;

use crate::step::Phase;

/// Main error type for verbump
#[derive(Error, Debug)]
pub enum UpdateError {
    /// IO errors (manifest missing, unreadable, unwritable)
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid YAML for the build step schema
    #[error("{}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Manifest parsed but contains no build steps
    #[error("no steps found in {}", .path.display())]
    NoSteps { path: PathBuf },

    /// A version map token that is not exactly `tag=value`
    #[error("unexpected data: {0}")]
    MalformedEntry(String),

    /// The version map entry exists but holds a different value
    #[error("{tag} has unexpected value: {actual}")]
    ValueMismatch { tag: String, actual: String },

    /// The version map has no entry for the target
    #[error("{target} not in {} version map, found: {seen:?}", .path.display())]
    TargetMissing {
        target: String,
        path: PathBuf,
        seen: Vec<String>,
    },

    /// The region start marker never matched
    #[error("start missing: {0}")]
    StartMissing(String),

    /// The mutation matched nothing within the region
    #[error("no changes could be made")]
    NoChanges,

    /// A generated pattern failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Command line argument without `=` or with an empty side
    #[error("argument is not TAG=VERSION: {0}")]
    InvalidPair(String),

    /// A failure attributed to one step and phase
    #[error("{step} {phase}: {source}")]
    Step {
        step: String,
        phase: Phase,
        #[source]
        source: Box<UpdateError>,
    },

    /// Several steps failed in one run
    #[error("{} steps failed: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<UpdateError>),
}

/// Result type alias for verbump operations
pub type Result<T> = std::result::Result<T, UpdateError>;

impl UpdateError {
    /// Create an IO error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap an error with the step and phase it came from
    pub fn step(step: impl Into<String>, phase: Phase, source: UpdateError) -> Self {
        Self::Step {
            step: step.into(),
            phase,
            source: Box::new(source),
        }
    }

    /// Collapse accumulated failures: none, one, or many
    pub fn from_failures(mut failures: Vec<UpdateError>) -> Result<()> {
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(Self::Multiple(failures)),
        }
    }

    /// Number of underlying step failures this error represents
    pub fn failure_count(&self) -> usize {
        match self {
            Self::Multiple(errors) => errors.len(),
            _ => 1,
        }
    }
}

fn join_errors(errors: &[UpdateError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpdateError::ValueMismatch {
            tag: "1.0".to_string(),
            actual: "aspnetcore:1.0.0".to_string(),
        };
        assert_eq!(err.to_string(), "1.0 has unexpected value: aspnetcore:1.0.0");

        assert_eq!(UpdateError::NoChanges.to_string(), "no changes could be made");
    }

    #[test]
    fn test_target_missing_lists_seen_tags() {
        let err = UpdateError::TargetMissing {
            target: "3.0".to_string(),
            path: PathBuf::from("aspnetcore.yaml"),
            seen: vec!["1.0".to_string(), "2.1".to_string()],
        };
        assert_eq!(
            err.to_string(),
            r#"3.0 not in aspnetcore.yaml version map, found: ["1.0", "2.1"]"#
        );
    }

    #[test]
    fn test_step_wrapping() {
        let err = UpdateError::step("CloudBuildVersion", Phase::Apply, UpdateError::NoChanges);
        assert_eq!(
            err.to_string(),
            "CloudBuildVersion apply: no changes could be made"
        );
    }

    #[test]
    fn test_from_failures() {
        assert!(UpdateError::from_failures(vec![]).is_ok());

        let single = UpdateError::from_failures(vec![UpdateError::NoChanges]).unwrap_err();
        assert!(matches!(single, UpdateError::NoChanges));
        assert_eq!(single.failure_count(), 1);

        let many = UpdateError::from_failures(vec![
            UpdateError::NoChanges,
            UpdateError::StartMissing("^x".to_string()),
        ])
        .unwrap_err();
        assert_eq!(many.failure_count(), 2);
        assert_eq!(
            many.to_string(),
            "2 steps failed: no changes could be made; start missing: ^x"
        );
    }

    #[test]
    fn test_io_error_carries_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = UpdateError::io("builder/cloudbuild.yaml", io_err);
        assert!(matches!(err, UpdateError::Io { .. }));
        assert_eq!(err.to_string(), "builder/cloudbuild.yaml: file not found");
    }
}
