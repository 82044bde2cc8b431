use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::{ManifestPaths, UpdaterConfig};
use crate::error::UpdateError;

/// verbump - bump pinned runtime versions in build manifests
#[derive(Parser, Debug)]
#[command(name = "verbump")]
#[command(about = "Verify and update pinned versions in YAML build manifests")]
#[command(version)]
pub struct Cli {
    /// Version pins to apply, e.g. `1.0=1.0.13 2.1=2.1.5`
    #[arg(value_name = "TAG=VERSION", required_unless_present = "write_config")]
    pub pairs: Vec<VersionPair>,

    /// Only verify; report what differs without touching any file
    #[arg(long)]
    pub check: bool,

    /// JSON file with manifest locations
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory that relative manifest paths are resolved against
    #[arg(short = 'C', long)]
    pub root: Option<PathBuf>,

    /// Path of the aspnetcore manifest (overrides the config file)
    #[arg(long)]
    pub aspnetcore_manifest: Option<PathBuf>,

    /// Path of the builder cloudbuild manifest (overrides the config file)
    #[arg(long)]
    pub cloudbuild_manifest: Option<PathBuf>,

    /// Write the resolved manifest locations to a JSON config file and exit
    #[arg(long, value_name = "FILE")]
    pub write_config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Merge defaults, the optional config file and explicit flags.
    pub fn manifest_paths(&self) -> anyhow::Result<ManifestPaths> {
        let file_config = match &self.config {
            Some(path) => {
                let config = UpdaterConfig::load_from_file(path)?;
                config.validate()?;
                config
            }
            None => UpdaterConfig::default(),
        };

        let mut paths = file_config.manifest_paths();
        if let Some(path) = &self.aspnetcore_manifest {
            paths.aspnetcore = path.clone();
        }
        if let Some(path) = &self.cloudbuild_manifest {
            paths.cloudbuild = path.clone();
        }
        if let Some(root) = &self.root {
            paths = paths.rooted_at(root);
        }
        Ok(paths)
    }

    /// Save the resolved manifest locations as a config file.
    pub fn write_config_file(&self, path: &Path) -> anyhow::Result<()> {
        let config = UpdaterConfig::from(self.manifest_paths()?);
        config.validate()?;
        config.save_to_file(path)
    }
}

/// One `TAG=VERSION` command line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPair {
    pub tag: String,
    pub version: String,
}

impl FromStr for VersionPair {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((tag, version)) if !tag.is_empty() && !version.is_empty() => Ok(Self {
                tag: tag.to_string(),
                version: version.to_string(),
            }),
            _ => Err(UpdateError::InvalidPair(s.to_string())),
        }
    }
}

impl fmt::Display for VersionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tag, self.version)
    }
}
