// SPDX-License-Identifier: GPL-3.0-or-later

//! Source filtering for compilation database entries.
//!
//! This module provides functionality to filter compilation database entries based on
//! directory-based rules with order-based evaluation semantics. The filtering system
//! allows fine-grained control over which source files appear in the generated
//! `compile_commands.json` while maintaining predictable and explicit behavior.
//!
//! ## Evaluation Strategy
//!
//! The source filter uses the following evaluation strategy:
//!
//! 1. **Order-based evaluation**: Rules are processed in the order they appear in the
//!    configuration. For each source file, the filter iterates through all rules and
//!    applies the **last** matching rule's action.
//!
//! 2. **Empty directories list**: If no directory rules are configured, all files are
//!    included (no filtering is applied).
//!
//! 3. **No-match behavior**: If no rule matches a file, the file is **included** by default.
//!
//! 4. **Path matching**: Uses simple prefix matching with `Path::starts_with()`. A rule
//!    matches a file if the file's path starts with the rule's path.
//!
//! 5. **Case sensitivity**: Path matching is always case-sensitive on all platforms.
//!
//! 6. **No normalization**: Performs no path normalization or canonicalization during
//!    matching. Paths are compared as literal strings.
//!
//! 7. **Directory vs. file matching**: A directory rule matches both files directly in
//!    that directory and files in any subdirectory (recursive matching).

use std::path::Path;

use super::Entry;
use crate::config::{DirectoryAction, SourceFilter};
use thiserror::Error;

/// A filter that determines which compilation database entries should be included
/// based on source file paths and directory-based rules.
#[derive(Clone, Debug)]
pub struct SourceEntryFilter {
    /// The source filter configuration containing directory rules.
    config: SourceFilter,
}

impl SourceEntryFilter {
    /// Determines whether a compilation database entry should be included.
    ///
    /// This method evaluates the entry's file path against the configured directory rules
    /// using order-based evaluation semantics.
    ///
    /// # Arguments
    ///
    /// * `entry` - The compilation database entry to evaluate
    ///
    /// # Returns
    ///
    /// `true` if the entry should be included, `false` if it should be excluded
    ///
    /// # Evaluation Rules
    ///
    /// - If `directories` is empty, returns `true` (include everything)
    /// - Iterates through rules in order, updating result when path prefix matches
    /// - The *last* matching rule determines the final result
    /// - If no rule matches, returns `true` (include by default)
    pub fn should_include(&self, entry: &Entry) -> bool {
        self.should_include_path(&entry.file)
    }

    /// Determines whether a file path should be included based on the configured rules.
    ///
    /// This is the core evaluation logic that can also be used independently of
    /// compilation database entries.
    ///
    /// # Arguments
    ///
    /// * `file_path` - The path of the source file to evaluate
    ///
    /// # Returns
    ///
    /// `true` if the file should be included, `false` if it should be excluded
    pub fn should_include_path(&self, file_path: &Path) -> bool {
        // Empty directories list means include everything
        if self.config.directories.is_empty() {
            return true;
        }

        let mut result = true; // Default: include if no rule matches

        // Order-based evaluation: last matching rule wins
        for rule in &self.config.directories {
            if file_path.starts_with(&rule.path) {
                result = match rule.action {
                    DirectoryAction::Include => true,
                    DirectoryAction::Exclude => false,
                };
            }
        }

        result
    }
}

/// Represents configuration errors that can occur when creating a source filter.
#[derive(Error, Debug, PartialEq)]
pub enum SourceFilterError {
    /// No errors currently defined, but this allows for future extensibility
    /// without breaking changes to the public API.
    #[error("Configuration validation failed: {message}")]
    ConfigurationError { message: String },
}

impl TryFrom<SourceFilter> for SourceEntryFilter {
    type Error = SourceFilterError;

    fn try_from(config: SourceFilter) -> Result<Self, Self::Error> {
        // Currently no validation errors are possible since the config validation
        // happens at the configuration level, but this structure allows for future
        // enhancements without breaking the API.
        Ok(SourceEntryFilter { config })
    }
}
