// SPDX-License-Identifier: GPL-3.0-or-later

//! This module provides support for reading and writing JSON compilation database files.
//!
//! A compilation database is a set of records which describe the compilation of the
//! source files in a given project. It describes the compiler invocation command to
//! compile a source module to an object file.
//!
//! This database can have many forms. One well known and supported format is the JSON
//! compilation database, which is a simple JSON file having the list of compilation
//! as an array. The definition of the JSON compilation database files is done in the
//! LLVM project [documentation](https://clang.llvm.org/docs/JSONCompilationDatabase.html).

mod converter;
mod filter_duplicates;
mod filter_sources;

pub(super) use converter::CommandConverter;
pub(super) use filter_duplicates::DuplicateEntryFilter;
pub(super) use filter_sources::SourceEntryFilter;

use crate::config;
use crate::config::Validator;
use serde::{Deserialize, Serialize};
use shell_words;
use std::path::{Path, PathBuf};
use std::{io, path};
use thiserror::Error;

/// Represents an entry of the compilation database.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The main translation unit source processed by this compilation step.
    /// This is used by tools as the key into the compilation database.
    /// There can be multiple command objects for the same file, for example if the same
    /// source file is compiled with different configurations.
    pub file: path::PathBuf,
    /// The compile command argv as list of strings. This should run the compilation step
    /// for the translation unit file. `arguments[0]` should be the executable name, such
    /// as `clang++`. Arguments should not be escaped, but ready to pass to `execvp()`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub arguments: Vec<String>,
    /// The compile command as a single shell-escaped string. Arguments may be shell quoted
    /// and escaped following platform conventions, with ‘"’ and ‘\’ being the only special
    /// characters. Shell expansion is not supported.
    ///
    /// Either `arguments` or `command` is required. `arguments` is preferred, as shell
    /// (un)escaping is a possible source of errors.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(default)]
    pub command: String,
    /// The working directory of the compilation. All paths specified in the `command` or
    /// `file` fields must be either absolute or relative to this directory.
    pub directory: path::PathBuf,
    /// The name of the output created by this compilation step. This field is optional.
    /// It can be used to distinguish different processing modes of the same input file.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub output: Option<path::PathBuf>,
}

impl Entry {
    /// Create an Entry from arguments (preferred).
    pub fn from_arguments(
        file: impl Into<path::PathBuf>,
        arguments: Vec<String>,
        directory: impl Into<path::PathBuf>,
        output: Option<impl Into<path::PathBuf>>,
    ) -> Self {
        Entry {
            file: file.into(),
            arguments,
            command: String::default(),
            directory: directory.into(),
            output: output.map(|o| o.into()),
        }
    }

    /// Create an Entry from a shell command string.
    pub fn from_command(
        file: impl Into<path::PathBuf>,
        command: String,
        directory: impl Into<path::PathBuf>,
        output: Option<impl Into<path::PathBuf>>,
    ) -> Self {
        Entry {
            file: file.into(),
            arguments: Vec::default(),
            command,
            directory: directory.into(),
            output: output.map(|o| o.into()),
        }
    }

    /// Semantic validation of the entry. Checking all fields for
    /// valid values and formats.
    pub fn validate(self) -> Result<Self, EntryError> {
        if self.file.to_string_lossy().is_empty() {
            return Err(EntryError::EmptyFileName);
        }
        if self.directory.to_string_lossy().is_empty() {
            return Err(EntryError::EmptyDirectory);
        }
        if self.command.is_empty() && self.arguments.is_empty() {
            return Err(EntryError::CommandOrArgumentsAreMissing);
        }
        if !self.command.is_empty() && !self.arguments.is_empty() {
            return Err(EntryError::CommandOrArgumentsArePresent);
        }
        if !self.command.is_empty() {
            shell_words::split(&self.command)?;
        }
        Ok(self)
    }

    /// Convert entry to a form when only the command field is available.
    ///
    /// The method can fail if the entry is invalid.
    pub fn to_command(self) -> Result<Self, EntryError> {
        let valid = self.validate()?;

        let command = if valid.command.is_empty() {
            shell_words::join(&valid.arguments)
        } else {
            valid.command
        };

        Ok(Entry {
            file: valid.file,
            arguments: Vec::default(),
            command,
            directory: valid.directory,
            output: valid.output,
        })
    }

    /// Convert entry to a form when only the arguments field is available.
    ///
    /// The method can fail if the entry is invalid or command field does
    /// not contain a valid shell escaped string.
    pub fn to_arguments(self) -> Result<Self, EntryError> {
        let valid = self.validate()?;

        let arguments = if valid.arguments.is_empty() {
            shell_words::split(&valid.command)?
        } else {
            valid.arguments
        };

        Ok(Entry {
            file: valid.file,
            arguments,
            command: String::default(),
            directory: valid.directory,
            output: valid.output,
        })
    }

    /// Constructor method for testing purposes.
    #[cfg(test)]
    pub fn from_arguments_str(
        file: &str,
        arguments: Vec<&str>,
        directory: &str,
        output: Option<&str>,
    ) -> Entry {
        Entry::from_arguments(
            path::PathBuf::from(file),
            arguments.into_iter().map(String::from).collect(),
            path::PathBuf::from(directory),
            output.map(path::PathBuf::from),
        )
    }

    /// Constructor method for testing purposes.
    #[cfg(test)]
    pub fn from_command_str(
        file: &str,
        command: &str,
        directory: &str,
        output: Option<&str>,
    ) -> Entry {
        Entry::from_command(
            path::PathBuf::from(file),
            String::from(command),
            path::PathBuf::from(directory),
            output.map(path::PathBuf::from),
        )
    }
}

/// Represents the possible errors that can occur when validating an entry.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Entry has an empty file field")]
    EmptyFileName,
    #[error("Entry has an empty directory field")]
    EmptyDirectory,
    #[error("Both command and arguments fields are empty")]
    CommandOrArgumentsAreMissing,
    #[error("Both command and arguments fields are present")]
    CommandOrArgumentsArePresent,
    #[error("Entry has an invalid command field: {0}")]
    InvalidCommand(#[from] shell_words::ParseError),
}

/// Formats paths of compilation database entries according to the configured
/// [`config::PathFormat`] resolution rules.
#[cfg_attr(test, mockall::automock)]
pub(super) trait PathFormatter {
    /// Formats the working directory of a compilation.
    fn format_directory(&self, base: &Path, dir: &Path) -> Result<PathBuf, FormatError>;

    /// Formats a file path (source or output) relative to the already-formatted directory.
    fn format_file(&self, directory: &Path, file: &Path) -> Result<PathBuf, FormatError>;
}

/// Errors that can occur while formatting a path for a compilation database entry.
#[derive(Debug, Error)]
pub(super) enum FormatError {
    #[error("failed to canonicalize path: {0}")]
    PathCanonicalize(#[from] io::Error),
}

/// Errors that can occur while constructing a [`ConfigurablePathFormatter`].
#[derive(Debug, Error)]
pub(super) enum FormatConfigurationError {
    #[error("invalid path format configuration: {0}")]
    InvalidConfiguration(String),
}

/// A [`PathFormatter`] driven by the `paths` section of the output configuration.
pub(super) struct ConfigurablePathFormatter {
    paths: config::PathFormat,
}

impl ConfigurablePathFormatter {
    pub(super) fn new(paths: config::PathFormat) -> Result<Self, FormatConfigurationError> {
        config::PathFormat::validate(&paths)
            .map_err(|error| FormatConfigurationError::InvalidConfiguration(error.to_string()))?;

        Ok(Self { paths })
    }

    fn resolve(resolver: config::PathResolver, base: &Path, target: &Path) -> Result<PathBuf, FormatError> {
        match resolver {
            config::PathResolver::AsIs => Ok(target.to_path_buf()),
            config::PathResolver::Canonical => target.canonicalize().map_err(FormatError::PathCanonicalize),
            config::PathResolver::Absolute => {
                if target.is_absolute() {
                    Ok(target.to_path_buf())
                } else {
                    Ok(base.join(target))
                }
            }
            config::PathResolver::Relative => {
                if let Ok(stripped) = target.strip_prefix(base) {
                    Ok(stripped.to_path_buf())
                } else {
                    Ok(target.to_path_buf())
                }
            }
        }
    }
}

impl PathFormatter for ConfigurablePathFormatter {
    fn format_directory(&self, base: &Path, dir: &Path) -> Result<PathBuf, FormatError> {
        Self::resolve(self.paths.directory, base, dir)
    }

    fn format_file(&self, directory: &Path, file: &Path) -> Result<PathBuf, FormatError> {
        Self::resolve(self.paths.file, directory, file)
    }
}
