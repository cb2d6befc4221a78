// SPDX-License-Identifier: GPL-3.0-or-later

//! Command to compilation database entry conversion functionality.
//!
//! This module provides the [`CommandConverter`] which is responsible for converting
//! semantic [`Command`] instances into clang compilation database [`Entry`] objects.
//! The converter encapsulates format configuration and conversion logic, providing
//! a clean separation between domain objects and output formatting.
//!
//! The conversion process handles:
//! - Extracting source files from compiler command arguments
//! - Building properly formatted command lines for each source file
//! - Computing output files based on command arguments
//! - Applying format configuration (array vs string commands, output field inclusion)
//!
//! # Example
//!
//! ```rust
//! use tracedb::output::clang::converter::CommandConverter;
//! use tracedb::config::Format;
//!
//! let config = Format::default();
//! let converter = CommandConverter::new(config).unwrap();
//!
//! // The converter can be used to convert semantic Command instances
//! // into compilation database entries based on the configured format
//! ```

use super::Entry;
use super::{ConfigurablePathFormatter, FormatConfigurationError, PathFormatter};
use crate::config;
use crate::semantic::{ArgumentKind, Arguments, Command, CompilerCommand};
use log::warn;
use shell_words;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Converts commands into compilation database entries.
///
/// This converter takes format configuration during construction and uses it
/// to convert commands into appropriately formatted entries.
pub struct CommandConverter {
    format: config::EntryFormat,
    path_formatter: Box<dyn PathFormatter>,
}

impl CommandConverter {
    /// Creates a new CommandConverter with the specified format configuration.
    pub fn new(format: config::Format) -> Result<Self, FormatConfigurationError> {
        let path_formatter = Box::new(ConfigurablePathFormatter::new(format.paths)?);
        Ok(Self {
            format: format.entries,
            path_formatter,
        })
    }

    /// Creates a new CommandConverter with a custom path formatter for testing.
    #[cfg(test)]
    pub fn with_formatter(
        format: config::EntryFormat,
        path_formatter: Box<dyn PathFormatter>,
    ) -> Self {
        Self {
            format,
            path_formatter,
        }
    }

    /// Converts the command into compilation database entries.
    ///
    /// Only [`Command::Compiler`] produces entries here; link and archive
    /// commands are projected into their own database records elsewhere
    /// (see [`crate::output::linkdb`]), since their shape (one record per
    /// invocation, no per-source fan-out) does not fit this format.
    pub fn to_entries(&self, command: &Command) -> Vec<Entry> {
        match command {
            Command::Compiler(cmd) => self.convert_compiler_command(cmd),
            Command::Linker(_) | Command::Archiver(_) | Command::Ignored(_) => vec![],
        }
    }

    /// Converts a compiler command into compilation database entries.
    fn convert_compiler_command(&self, cmd: &CompilerCommand) -> Vec<Entry> {
        // Find all source arguments
        let source_arguments = Self::find_arguments_by_kind(cmd, ArgumentKind::Source)
            .collect::<Vec<&Box<dyn Arguments>>>();

        // If no source files found, the invocation is a compiler query (e.g.
        // `--version`) or a preprocessor-only/dependency-only run with no
        // file argument worth recording: neither belongs in the database.
        if source_arguments.is_empty() {
            return vec![];
        }

        // A bare `-E`, `-M`, or `-MM` stops the pipeline before compilation,
        // so even with source files present there is no compiled translation
        // unit to record.
        if Self::is_preprocess_only(cmd) {
            return vec![];
        }

        // Format directory path
        let formatted_directory = match self
            .path_formatter
            .format_directory(&cmd.working_dir, &cmd.working_dir)
        {
            Ok(dir) => dir,
            Err(e) => {
                warn!("Failed to format directory path: {}", e);
                return vec![];
            }
        };

        // Find output file if present. Only recorded when the invocation has
        // a single source: with several sources sharing one `-o`, the output
        // is the link product, not any individual compile step's output, so
        // per-entry it is omitted rather than misattributed to every source.
        let output_file = if self.format.include_output_field && source_arguments.len() == 1 {
            Self::compute_output_file(cmd, &formatted_directory, &*self.path_formatter)
        } else {
            None
        };

        // A compile-and-link invocation (no `-c`/`-S` present) still compiles
        // each source file before linking; the database records the compile
        // step, so a `-c` is inserted to make the recorded command
        // self-contained and not imply a link that never happens in isolation.
        let insert_compile_flag = !Self::has_no_linking_flag(cmd);

        // Create one entry per source argument
        source_arguments
            .into_iter()
            .filter_map(|source_arg| {
                // Get source file with original path first, then format it
                let path_updater: &dyn Fn(&Path) -> Cow<Path> = &|path: &Path| Cow::Borrowed(path);
                let source_file_path = source_arg.as_file(path_updater)?;
                let formatted_source_file =
                    self.format_file_path(&formatted_directory, &source_file_path);

                let command_args = self.build_command_args_for_source(
                    cmd,
                    source_arg.as_ref(),
                    &formatted_directory,
                    insert_compile_flag,
                );

                if self.format.use_array_format {
                    Some(Entry::from_arguments(
                        formatted_source_file,
                        command_args,
                        &formatted_directory,
                        output_file.as_ref(),
                    ))
                } else {
                    Some(Entry::from_command(
                        formatted_source_file,
                        shell_words::join(&command_args),
                        &formatted_directory,
                        output_file.as_ref(),
                    ))
                }
            })
            .collect()
    }

    /// Helper method to format a file path
    fn format_file_path(&self, formatted_directory: &Path, file_path: &Path) -> PathBuf {
        match self
            .path_formatter
            .format_file(formatted_directory, file_path)
        {
            Ok(formatted_path) => formatted_path,
            Err(e) => {
                warn!("Failed to format file path {}: {}", file_path.display(), e);
                file_path.to_path_buf()
            }
        }
    }

    /// Builds command arguments for a specific source file.
    ///
    /// Per the entry shape `[compiler] ⊕ flags ⊕ [src]`, the output group
    /// (`-o <file>`) is never part of the recorded arguments — it is carried
    /// separately in the entry's `output` field — and the source file is
    /// appended last rather than kept at its original position, regardless
    /// of every other source/output argument's placement in the original
    /// invocation.
    fn build_command_args_for_source(
        &self,
        cmd: &CompilerCommand,
        source_arg: &dyn Arguments,
        formatted_directory: &Path,
        insert_compile_flag: bool,
    ) -> Vec<String> {
        // Start with the executable
        let mut command_args = vec![cmd.executable.to_string_lossy().to_string()];

        if insert_compile_flag {
            command_args.push("-c".to_string());
        }

        let path_updater: &dyn Fn(&Path) -> Cow<Path> = &|path: &Path| Cow::Borrowed(path);

        // Append every non-source, non-output argument as-is, in order.
        for arg in &cmd.arguments {
            match arg.kind() {
                ArgumentKind::Source | ArgumentKind::Output => continue,
                _ => command_args.extend(arg.as_arguments(path_updater)),
            }
        }

        // The source file for this entry always goes last.
        if let Some(source_file_path) = source_arg.as_file(path_updater) {
            let formatted_source_file = self.format_file_path(formatted_directory, &source_file_path);
            command_args.push(formatted_source_file.to_string_lossy().to_string());
        } else {
            command_args.extend(source_arg.as_arguments(path_updater));
        }

        command_args
    }

    /// Raw literal flags across `cmd`'s arguments, in order.
    ///
    /// Used to recognize a handful of exact, no-glue switches (`-c`, `-S`,
    /// `-E`, `-M`, `-MM`) whose presence can't be told apart from other flags
    /// tagged with the same [`CompilerPass`] (e.g. `-I` is also tagged
    /// `Preprocessing`).
    fn literal_flags(cmd: &CompilerCommand) -> Vec<String> {
        let path_updater: &dyn Fn(&Path) -> Cow<Path> = &|path: &Path| Cow::Borrowed(path);
        cmd.arguments
            .iter()
            .flat_map(|arg| arg.as_arguments(path_updater))
            .collect()
    }

    /// True if any flag suppresses linking on its own (`-c`, `-S`) or stops
    /// the pipeline before compilation (`-E`, bare `-M`/`-MM`).
    fn has_no_linking_flag(cmd: &CompilerCommand) -> bool {
        let flags = Self::literal_flags(cmd);
        flags.iter().any(|f| matches!(f.as_str(), "-c" | "-S" | "-E" | "-M" | "-MM"))
    }

    /// True for a preprocessor-only or dependency-only invocation: `-E`
    /// expands and stops; bare `-M`/`-MM` only emits a dependency rule. Note
    /// `-MD`/`-MMD` do not suppress compilation and are intentionally excluded.
    fn is_preprocess_only(cmd: &CompilerCommand) -> bool {
        let flags = Self::literal_flags(cmd);
        flags.iter().any(|f| matches!(f.as_str(), "-E" | "-M" | "-MM"))
    }

    /// Returns arguments of a specific kind from the command.
    ///
    /// This method filters arguments by their kind and returns their values as strings.
    fn find_arguments_by_kind(
        cmd: &CompilerCommand,
        kind: ArgumentKind,
    ) -> impl Iterator<Item = &Box<dyn Arguments>> {
        cmd.arguments.iter().filter(move |arg| arg.kind() == kind)
    }

    /// Computes the output file path from the command arguments.
    ///
    /// This method examines the output arguments (typically "-o filename")
    /// and returns the filename as a PathBuf.
    fn compute_output_file(
        cmd: &CompilerCommand,
        formatted_directory: &Path,
        path_formatter: &dyn PathFormatter,
    ) -> Option<PathBuf> {
        // Find output arguments and get the original path first
        let path_updater: &dyn Fn(&Path) -> Cow<Path> = &|path: &Path| Cow::Borrowed(path);
        let output_path = Self::find_arguments_by_kind(cmd, ArgumentKind::Output)
            .nth(0)
            .and_then(|arg| arg.as_file(path_updater))?;

        // Format the output path
        match path_formatter.format_file(formatted_directory, &output_path) {
            Ok(formatted_path) => Some(formatted_path),
            Err(e) => {
                warn!(
                    "Failed to format output file path {}: {}",
                    output_path.display(),
                    e
                );
                Some(output_path)
            }
        }
    }
}
