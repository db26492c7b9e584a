//! Filename filtering and ignore patterns.

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use dupsift_core::{ScanConfig, ScanError};

/// Compiled form of the name-based rules in a [`ScanConfig`].
#[derive(Debug, Clone)]
pub struct EntryFilter {
    filename: Option<Regex>,
    ignore: GlobSet,
}

impl EntryFilter {
    /// Compile the filename filter and ignore patterns of `config`.
    pub fn from_config(config: &ScanConfig) -> Result<Self, ScanError> {
        let filename = config
            .filename_filter
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ScanError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let mut builder = GlobSetBuilder::new();
        for pattern in &config.ignore_patterns {
            let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        let ignore = builder.build().map_err(|e| ScanError::InvalidPattern {
            pattern: config.ignore_patterns.join(", "),
            message: e.to_string(),
        })?;

        Ok(Self { filename, ignore })
    }

    /// Check if a file name passes the filename filter.
    ///
    /// The expression only needs to match somewhere in the name; anchor it
    /// with `^`/`$` to match the whole name.
    pub fn matches_filename(&self, name: &str) -> bool {
        self.filename.as_ref().is_none_or(|re| re.is_match(name))
    }

    /// Check if an entry name matches any ignore pattern.
    pub fn is_ignored(&self, name: &str) -> bool {
        !self.ignore.is_empty() && self.ignore.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(filename: Option<&str>, ignore: &[&str]) -> EntryFilter {
        let config = ScanConfig::builder()
            .root("/test")
            .filename_filter(filename.map(str::to_string))
            .ignore_patterns(ignore.iter().map(|s| s.to_string()).collect::<Vec<_>>())
            .build()
            .unwrap();
        EntryFilter::from_config(&config).unwrap()
    }

    #[test]
    fn test_no_filter_matches_everything() {
        let f = filter(None, &[]);
        assert!(f.matches_filename("anything.bin"));
        assert!(!f.is_ignored("anything.bin"));
    }

    #[test]
    fn test_filename_filter_is_unanchored_search() {
        let f = filter(Some("[Jj][Pp][Gg]$"), &[]);
        assert!(f.matches_filename("holiday.jpg"));
        assert!(f.matches_filename("HOLIDAY.JPG"));
        assert!(!f.matches_filename("holiday.jpg.bak"));
        assert!(!f.matches_filename("notes.txt"));
    }

    #[test]
    fn test_ignore_patterns() {
        let f = filter(None, &["node_modules", "*.log"]);
        assert!(f.is_ignored("node_modules"));
        assert!(f.is_ignored("build.log"));
        assert!(!f.is_ignored("src"));
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let config = ScanConfig::builder()
            .root("/test")
            .filename_filter(Some("([".to_string()))
            .build()
            .unwrap();
        let err = EntryFilter::from_config(&config).unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern { .. }));
    }
}
