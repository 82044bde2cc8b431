//! Bounded, line-oriented search and replace.
//!
//! `search_replace` rewrites lines of a file that match a pattern, but only
//! inside a region delimited by optional start and end markers. This lets a
//! step edit one block of a structured file (such as the argument list of a
//! single build step) without parsing it.
//!
//! # Region rules
//!
//! - Without a start marker the region begins at the first line.
//! - The line matching the start marker is inside the region.
//! - The line matching the end marker is still inside the region; only the
//!   lines after it are excluded.
//! - The end marker is only looked for once the region has started.
//!
//! The mutation fails, leaving the file untouched, when the start marker
//! never matches or when no line actually changes.
//!
//! Files are handled as UTF-8 text. A file that is not valid UTF-8 fails
//! with `UpdateError::Io` (kind `InvalidData`) before anything is written;
//! manifests must be UTF-8 for the YAML check that follows every edit.

use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, UpdateError};
use crate::step::{Logger, silent_logger};

/// One bounded text mutation.
#[derive(Clone)]
pub struct MutateOptions {
    /// Pattern matched against each eligible line.
    pub pattern: Regex,
    /// Replacement template; `$name` / `${name}` expand capture groups and
    /// `$$` is a literal dollar sign.
    pub replacement: String,
    /// First line of the region (inclusive).
    pub start: Option<Regex>,
    /// Last line of the region (inclusive).
    pub end: Option<Regex>,
    pub logger: Logger,
}

impl MutateOptions {
    /// Unbounded mutation over the whole file.
    pub fn new(pattern: Regex, replacement: impl Into<String>) -> Self {
        Self {
            pattern,
            replacement: replacement.into(),
            start: None,
            end: None,
            logger: silent_logger(),
        }
    }

    pub fn after(mut self, start: Regex) -> Self {
        self.start = Some(start);
        self
    }

    pub fn through(mut self, end: Regex) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    fn log(&self, msg: impl AsRef<str>) {
        (self.logger)(msg.as_ref());
    }
}

impl std::fmt::Debug for MutateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutateOptions")
            .field("pattern", &self.pattern.as_str())
            .field("replacement", &self.replacement)
            .field("start", &self.start.as_ref().map(Regex::as_str))
            .field("end", &self.end.as_ref().map(Regex::as_str))
            .finish_non_exhaustive()
    }
}

/// Result of scanning text without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub lines: Vec<String>,
    pub changes: usize,
}

impl Rewrite {
    /// File contents as written back: newline-joined plus one trailing blank line.
    pub fn contents(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push_str("\n\n");
        out
    }
}

/// Rewrite matching lines of `path` in place, within the configured region.
///
/// Returns the number of changed lines. The file is read whole and written
/// back whole; there is no temp-file-and-rename, so a concurrent reader may
/// observe a partial write.
pub fn search_replace(path: &Path, options: &MutateOptions) -> Result<usize> {
    options.log(format!(
        "{}: replace {:?} with {:?}",
        path.display(),
        options.pattern.as_str(),
        options.replacement
    ));

    let text = fs::read_to_string(path).map_err(|e| UpdateError::io(path, e))?;
    let rewrite = rewrite_lines(&text, options)?;

    fs::write(path, rewrite.contents()).map_err(|e| UpdateError::io(path, e))?;
    debug!(path = %path.display(), changes = rewrite.changes, "manifest rewritten");
    Ok(rewrite.changes)
}

/// Apply the bounded mutation to `text`, returning the new lines.
pub fn rewrite_lines(text: &str, options: &MutateOptions) -> Result<Rewrite> {
    let mut found_start = options.start.is_none();
    let mut found_end = false;
    let mut changes = 0;
    let mut lines = Vec::new();

    for line in text.lines() {
        if !found_start {
            if let Some(start) = &options.start {
                if start.is_match(line) {
                    options.log(format!("Found start: {}", line));
                    found_start = true;
                }
            }
        }

        let eligible = found_start && !found_end;
        if !eligible {
            lines.push(line.to_string());
            continue;
        }

        if let Some(end) = &options.end {
            if end.is_match(line) {
                options.log(format!("Found end:   {}", line));
                found_end = true;
            }
        }

        if options.pattern.is_match(line) {
            let new_line = options
                .pattern
                .replace_all(line, options.replacement.as_str())
                .into_owned();
            if new_line != line {
                options.log(format!("Old:   {}", line));
                options.log(format!("New:   {}", new_line));
                changes += 1;
            }
            lines.push(new_line);
        } else {
            lines.push(line.to_string());
        }
    }

    if !found_start {
        let marker = options.start.as_ref().map(Regex::as_str).unwrap_or_default();
        return Err(UpdateError::StartMissing(marker.to_string()));
    }
    if changes == 0 {
        return Err(UpdateError::NoChanges);
    }
    options.log(format!("{} lines changed", changes));

    Ok(Rewrite { lines, changes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_unbounded_replaces_every_match() {
        let opts = MutateOptions::new(re("old"), "new");
        let rewrite = rewrite_lines("old\nkeep\nold old\n", &opts).unwrap();
        assert_eq!(rewrite.lines, vec!["new", "keep", "new new"]);
        assert_eq!(rewrite.changes, 2);
    }

    #[test]
    fn test_start_line_is_eligible() {
        let opts = MutateOptions::new(re("v1"), "v2").after(re("^start v1"));
        let rewrite = rewrite_lines("v1\nstart v1\nv1\n", &opts).unwrap();
        assert_eq!(rewrite.lines, vec!["v1", "start v2", "v2"]);
    }

    #[test]
    fn test_end_line_is_eligible_but_not_after() {
        let opts = MutateOptions::new(re("v1"), "v2").through(re("^end"));
        let rewrite = rewrite_lines("v1\nend v1\nv1\n", &opts).unwrap();
        assert_eq!(rewrite.lines, vec!["v2", "end v2", "v1"]);
        assert_eq!(rewrite.changes, 2);
    }

    #[test]
    fn test_end_marker_before_start_is_ignored() {
        let opts = MutateOptions::new(re("x"), "y")
            .after(re("^begin"))
            .through(re("^stop"));
        let rewrite = rewrite_lines("stop x\nbegin\nx\nstop\nx\n", &opts).unwrap();
        assert_eq!(rewrite.lines, vec!["stop x", "begin", "y", "stop", "x"]);
    }

    #[test]
    fn test_missing_start_marker() {
        let opts = MutateOptions::new(re("x"), "y").after(re("^begin"));
        let err = rewrite_lines("x\nx\n", &opts).unwrap_err();
        assert!(matches!(err, UpdateError::StartMissing(ref m) if m == "^begin"));
    }

    #[test]
    fn test_match_without_change_is_no_op() {
        let opts = MutateOptions::new(re("same"), "same");
        let err = rewrite_lines("same\n", &opts).unwrap_err();
        assert!(matches!(err, UpdateError::NoChanges));
    }

    #[test]
    fn test_capture_groups_expand() {
        let opts = MutateOptions::new(re(r"(?P<key>\w+)=1"), "${key}=2");
        let rewrite = rewrite_lines("a=1 b=1", &opts).unwrap();
        assert_eq!(rewrite.lines, vec!["a=2 b=2"]);
        assert_eq!(rewrite.changes, 1);
    }

    #[test]
    fn test_crlf_lines_are_stripped() {
        let opts = MutateOptions::new(re("a"), "b");
        let rewrite = rewrite_lines("a\r\nc\r\n", &opts).unwrap();
        assert_eq!(rewrite.lines, vec!["b", "c"]);
    }

    #[test]
    fn test_contents_has_trailing_blank_line() {
        let rewrite = Rewrite {
            lines: vec!["a".to_string(), "b".to_string()],
            changes: 1,
        };
        assert_eq!(rewrite.contents(), "a\nb\n\n");
    }
}
