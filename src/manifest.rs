//! Build manifests and their embedded version maps.
//!
//! A build manifest is a YAML document with an ordered list of build steps.
//! The first step's arguments carry the version map: tokens of the form
//! `tag=value`, either one per argument or several joined with `,`.
//!
//! ```yaml
//! steps:
//! - name: gcr.io/gcp-runtimes/aspnetcorebuild
//!   args:
//!   - '--version-map'
//!   - '1.0=gcr.io/google-appengine/aspnetcore:1.0.13'
//!   - '2.1=gcr.io/google-appengine/aspnetcore:2.1.5'
//! ```
//!
//! Manifests are read as UTF-8; anything else is reported as an IO error.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, UpdateError};
use crate::mutate::{MutateOptions, search_replace};
use crate::step::StepConfig;

/// Separator between entries packed into one argument.
pub const ENTRY_DELIMITER: char = ',';

/// Line introducing the version map within the first build step.
pub const VERSION_MAP_START: &str = r"^\s+- '--version-map'";
/// Next top-level build step; closes the version map region.
pub const VERSION_MAP_END: &str = r"^-";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub steps: Vec<BuildStep>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildStep {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// A single `tag=value` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub tag: String,
    pub value: String,
}

impl VersionEntry {
    /// Parse a `tag=value` token; anything but exactly one `=` is rejected.
    pub fn parse(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.split('=').collect();
        match parts.as_slice() {
            [tag, value] => Ok(Self {
                tag: tag.trim().to_string(),
                value: value.trim().to_string(),
            }),
            _ => Err(UpdateError::MalformedEntry(format!("{:?}", parts))),
        }
    }
}

impl BuildManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| UpdateError::io(path, e))?;
        serde_yaml::from_str(&text).map_err(|source| UpdateError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Version map tokens of the first build step, parsed lazily in order.
    ///
    /// A malformed token only surfaces when the iterator reaches it, so a
    /// lookup that stops at an earlier match never sees it.
    pub fn entries<'a>(
        &'a self,
        path: &Path,
    ) -> Result<impl Iterator<Item = Result<VersionEntry>> + 'a> {
        let first = self.steps.first().ok_or_else(|| UpdateError::NoSteps {
            path: path.to_path_buf(),
        })?;

        Ok(first
            .args
            .iter()
            .filter(|a| a.contains('='))
            .flat_map(|arg| arg.split(ENTRY_DELIMITER))
            .filter(|t| !t.trim().is_empty())
            .map(VersionEntry::parse))
    }

    /// Every version map entry of the first build step, in order.
    pub fn version_map(&self, path: &Path) -> Result<Vec<VersionEntry>> {
        self.entries(path)?.collect()
    }
}

/// Check that the version map in `path` maps `config.target` to `expected`.
///
/// Entries are scanned in order and the first entry for the target decides;
/// tokens after it are never parsed.
pub fn verify_version_map(path: &Path, expected: &str, config: &StepConfig) -> Result<()> {
    let manifest = BuildManifest::load(path)?;
    let mut seen = Vec::new();

    for entry in manifest.entries(path)? {
        let entry = entry?;
        if entry.tag == config.target {
            if entry.value != expected {
                return Err(UpdateError::ValueMismatch {
                    tag: entry.tag,
                    actual: entry.value,
                });
            }
            config.log(format!("Found: {}={}", entry.tag, entry.value));
            return Ok(());
        }
        seen.push(entry.tag);
    }

    Err(UpdateError::TargetMissing {
        target: config.target.clone(),
        path: path.to_path_buf(),
        seen,
    })
}

/// Rewrite the `config.target` entry of the version map in `path` to `new_value`.
pub fn update_version_map(path: &Path, new_value: &str, config: &StepConfig) -> Result<usize> {
    let options = version_map_mutation(&config.target, new_value)?.with_logger(config.logger.clone());
    search_replace(path, &options)
}

/// Bounded mutation replacing the value of one version map entry.
pub fn version_map_mutation(target: &str, new_value: &str) -> Result<MutateOptions> {
    let pattern = Regex::new(&format!(
        r#"(?P<lead>^|['",\s]){}=[^'",\s]*"#,
        regex::escape(target)
    ))?;
    let replacement = format!(
        "${{lead}}{}={}",
        escape_replacement(target),
        escape_replacement(new_value)
    );

    Ok(MutateOptions::new(pattern, replacement)
        .after(Regex::new(VERSION_MAP_START)?)
        .through(Regex::new(VERSION_MAP_END)?))
}

fn escape_replacement(literal: &str) -> String {
    literal.replace('$', "$$")
}
