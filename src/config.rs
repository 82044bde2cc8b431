//! Manifest location configuration.
//!
//! Paths start from built-in defaults, can be overridden by a JSON config
//! file, and finally by command line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the runtime image manifest.
pub const DEFAULT_ASPNETCORE_MANIFEST: &str = "aspnetcore.yaml";
/// Default location of the builder manifest.
pub const DEFAULT_CLOUDBUILD_MANIFEST: &str = "builder/cloudbuild.yaml";

/// Locations of the manifests the steps edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPaths {
    pub aspnetcore: PathBuf,
    pub cloudbuild: PathBuf,
}

impl Default for ManifestPaths {
    fn default() -> Self {
        Self {
            aspnetcore: PathBuf::from(DEFAULT_ASPNETCORE_MANIFEST),
            cloudbuild: PathBuf::from(DEFAULT_CLOUDBUILD_MANIFEST),
        }
    }
}

impl ManifestPaths {
    /// Re-base relative paths onto `root`. Absolute paths are kept.
    pub fn rooted_at(self, root: &Path) -> Self {
        Self {
            aspnetcore: root.join(self.aspnetcore),
            cloudbuild: root.join(self.cloudbuild),
        }
    }
}

/// On-disk configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    pub aspnetcore_manifest: PathBuf,
    pub cloudbuild_manifest: PathBuf,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self::from(ManifestPaths::default())
    }
}

impl From<ManifestPaths> for UpdaterConfig {
    fn from(paths: ManifestPaths) -> Self {
        Self {
            aspnetcore_manifest: paths.aspnetcore,
            cloudbuild_manifest: paths.cloudbuild,
        }
    }
}

impl UpdaterConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.aspnetcore_manifest.as_os_str().is_empty() {
            anyhow::bail!("aspnetcore_manifest must not be empty");
        }
        if self.cloudbuild_manifest.as_os_str().is_empty() {
            anyhow::bail!("cloudbuild_manifest must not be empty");
        }
        Ok(())
    }

    pub fn manifest_paths(&self) -> ManifestPaths {
        ManifestPaths {
            aspnetcore: self.aspnetcore_manifest.clone(),
            cloudbuild: self.cloudbuild_manifest.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_paths() {
        let paths = ManifestPaths::default();
        assert_eq!(paths.aspnetcore, PathBuf::from("aspnetcore.yaml"));
        assert_eq!(paths.cloudbuild, PathBuf::from("builder/cloudbuild.yaml"));
        assert_eq!(UpdaterConfig::default().manifest_paths(), paths);
    }

    #[test]
    fn test_rooted_at_keeps_absolute_paths() {
        let paths = ManifestPaths {
            aspnetcore: PathBuf::from("aspnetcore.yaml"),
            cloudbuild: PathBuf::from("/abs/cloudbuild.yaml"),
        }
        .rooted_at(Path::new("/repo"));
        assert_eq!(paths.aspnetcore, PathBuf::from("/repo/aspnetcore.yaml"));
        assert_eq!(paths.cloudbuild, PathBuf::from("/abs/cloudbuild.yaml"));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{ "aspnetcore_manifest": "runtime/aspnetcore.yaml" }"#)
            .unwrap();
        temp_file.flush().unwrap();

        let config = UpdaterConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.aspnetcore_manifest,
            PathBuf::from("runtime/aspnetcore.yaml")
        );
        assert_eq!(
            config.cloudbuild_manifest,
            PathBuf::from(DEFAULT_CLOUDBUILD_MANIFEST)
        );
    }

    #[test]
    fn test_roundtrip_save_load() {
        let config = UpdaterConfig {
            aspnetcore_manifest: PathBuf::from("a.yaml"),
            cloudbuild_manifest: PathBuf::from("b.yaml"),
        };
        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();

        let loaded = UpdaterConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = UpdaterConfig::load_from_file(Path::new("/nonexistent/path"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ invalid json }").unwrap();
        temp_file.flush().unwrap();

        let result = UpdaterConfig::load_from_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_empty_path() {
        let config = UpdaterConfig {
            cloudbuild_manifest: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(UpdaterConfig::default().validate().is_ok());
    }
}
