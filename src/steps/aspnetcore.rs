//! ASP.NET Core version map steps.
//!
//! Two manifests pin ASP.NET Core runtime versions:
//!
//! | Step                | Manifest                   | Expected entry value                          |
//! |---------------------|----------------------------|-----------------------------------------------|
//! | `AspNetCoreVersion` | `aspnetcore.yaml`          | `gcr.io/google-appengine/aspnetcore:<value>`  |
//! | `CloudBuildVersion` | `builder/cloudbuild.yaml`  | `aspnetcore:<value>`                          |
//!
//! Both entries are keyed by the release tag (`config.target`).

use std::path::Path;

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::Result;
use crate::manifest::{update_version_map, verify_version_map};
use crate::step::{Step, StepConfig};

/// Registry hosting the published runtime images.
pub const RUNTIME_IMAGE_REPOSITORY: &str = "gcr.io/google-appengine/aspnetcore";

/// Full image locator for a runtime version, as pinned in `aspnetcore.yaml`.
pub fn runtime_image(version: &str) -> String {
    format!("{}:{}", RUNTIME_IMAGE_REPOSITORY, version)
}

/// Short image reference for a runtime version, as pinned in the builder manifest.
pub fn builder_image(version: &str) -> String {
    format!("aspnetcore:{}", version)
}

/// The steps of a version bump, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum StepKind {
    /// Runtime image pin in the aspnetcore manifest.
    AspNetCoreVersion,
    /// Runtime image pin in the builder's cloudbuild manifest.
    CloudBuildVersion,
}

impl StepKind {
    /// Every step, in execution order.
    pub fn all() -> Vec<StepKind> {
        StepKind::iter().collect()
    }

    /// Manifest this step reads and rewrites.
    pub fn manifest<'a>(&self, config: &'a StepConfig) -> &'a Path {
        match self {
            StepKind::AspNetCoreVersion => &config.manifests.aspnetcore,
            StepKind::CloudBuildVersion => &config.manifests.cloudbuild,
        }
    }

    /// Value the version map entry should hold for `config.value`.
    pub fn expected_value(&self, config: &StepConfig) -> String {
        match self {
            StepKind::AspNetCoreVersion => runtime_image(&config.value),
            StepKind::CloudBuildVersion => builder_image(&config.value),
        }
    }
}

impl Step for StepKind {
    fn name(&self) -> String {
        self.to_string()
    }

    fn verify(&self, config: &StepConfig) -> Result<()> {
        verify_version_map(self.manifest(config), &self.expected_value(config), config)
    }

    fn apply(&self, config: &StepConfig) -> Result<()> {
        update_version_map(self.manifest(config), &self.expected_value(config), config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManifestPaths;
    use std::path::PathBuf;

    #[test]
    fn test_step_order_and_names() {
        let names: Vec<String> = StepKind::all().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["AspNetCoreVersion", "CloudBuildVersion"]);
    }

    #[test]
    fn test_expected_values() {
        let config = StepConfig::new("1.0", "1.0.13");
        assert_eq!(
            StepKind::AspNetCoreVersion.expected_value(&config),
            "gcr.io/google-appengine/aspnetcore:1.0.13"
        );
        assert_eq!(
            StepKind::CloudBuildVersion.expected_value(&config),
            "aspnetcore:1.0.13"
        );
    }

    #[test]
    fn test_manifest_selection() {
        let config = StepConfig::new("1.0", "1.0.13").with_manifests(ManifestPaths {
            aspnetcore: PathBuf::from("/tmp/a.yaml"),
            cloudbuild: PathBuf::from("/tmp/b.yaml"),
        });
        assert_eq!(
            StepKind::AspNetCoreVersion.manifest(&config),
            Path::new("/tmp/a.yaml")
        );
        assert_eq!(
            StepKind::CloudBuildVersion.manifest(&config),
            Path::new("/tmp/b.yaml")
        );
    }
}
