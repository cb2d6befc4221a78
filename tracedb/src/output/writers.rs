// SPDX-License-Identifier: GPL-3.0-or-later

use super::clang;
use super::formats::{JsonCompilationDatabase, SerializationError, SerializationFormat};
use super::statistics::OutputStatistics;
use super::{WriterCreationError, WriterError};
use crate::{config, semantic};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::{fs, io, path};

/// A trait representing a writer for iterator type `T`.
///
/// This trait is implemented by types that can consume an iterator of type `T`
/// and write its elements to some output. The writing process may succeed or fail,
/// returning either `()` on success or an error.
pub(super) trait IteratorWriter<T> {
    /// Writes the iterator as a sequence of elements.
    ///
    /// Consumes the iterator and returns either nothing on success or an error.
    fn write(self, items: impl Iterator<Item = T>) -> Result<(), WriterError>;
}

/// The type represents a converter that formats `semantic::Command` instances into `Entry` objects.
pub(super) struct ConverterClangOutputWriter<T: IteratorWriter<clang::Entry>> {
    converter: clang::CommandConverter,
    writer: T,
    stats: Arc<OutputStatistics>,
}

impl<T: IteratorWriter<clang::Entry>> ConverterClangOutputWriter<T> {
    pub(super) fn new(writer: T, format: &config::Format, stats: Arc<OutputStatistics>) -> Self {
        Self { converter: clang::CommandConverter::new(format.clone()), writer, stats }
    }
}

impl<T: IteratorWriter<clang::Entry>> IteratorWriter<semantic::Command> for ConverterClangOutputWriter<T> {
    fn write(self, semantics: impl Iterator<Item = semantic::Command>) -> Result<(), WriterError> {
        let stats = Arc::clone(&self.stats);
        let stats_for_entries = Arc::clone(&self.stats);

        // Count semantic commands as they flow in
        let counted_semantics = semantics.inspect(move |_| {
            stats.semantic_commands_received.fetch_add(1, Ordering::Relaxed);
        });

        // Convert and count entries produced
        let entries = counted_semantics.flat_map(|semantic| self.converter.to_entries(&semantic));
        let counted_entries = entries.inspect(move |_| {
            stats_for_entries.compilation_entries_produced.fetch_add(1, Ordering::Relaxed);
        });

        self.writer.write(counted_entries)
    }
}

/// The type represents a writer that handles appending entries to an existing Clang output file.
///
/// This writer supports reading existing entries from a compilation database file,
/// combining them with new entries, and writing the result back to the file.
/// If the file does not exist and the append option is enabled, it logs a warning
/// and writes only the new entries.
///
/// # Note
/// Reading errors will be ignored, and a warning will be logged.
pub(super) struct AppendClangOutputWriter<T: IteratorWriter<clang::Entry>> {
    writer: T,
    path: Option<path::PathBuf>,
    stats: Arc<OutputStatistics>,
}

impl<T: IteratorWriter<clang::Entry>> AppendClangOutputWriter<T> {
    pub(super) fn new(
        writer: T,
        input_path: &path::Path,
        append: bool,
        stats: Arc<OutputStatistics>,
    ) -> Self {
        let path = if input_path.exists() && append {
            Some(input_path.to_path_buf())
        } else {
            if append && !input_path.exists() {
                log::warn!("The output file does not exist, the append option is ignored.");
            }
            None
        };
        Self { writer, path, stats }
    }

    /// Reads the compilation database from a file.
    ///
    /// NOTE: The function is intentionally not getting any `&self` reference,
    /// because the logic is not bound to the instance.
    fn read_from_compilation_db(
        source: &path::Path,
    ) -> Result<impl Iterator<Item = clang::Entry>, SerializationError> {
        let file = fs::File::open(source).map(io::BufReader::new)?;

        let entries = JsonCompilationDatabase::read_and_ignore(file, |error| {
            log::warn!("Problems to read previous entries: {error:?}");
        });
        Ok(entries)
    }
}

impl<T: IteratorWriter<clang::Entry>> IteratorWriter<clang::Entry> for AppendClangOutputWriter<T> {
    fn write(self, entries: impl Iterator<Item = clang::Entry>) -> Result<(), WriterError> {
        if let Some(path) = &self.path {
            let stats = Arc::clone(&self.stats);

            let entries_from_db =
                Self::read_from_compilation_db(path).map_err(|err| WriterError::Io(path.clone(), err))?;

            // Count entries read from existing database
            let counted_existing = entries_from_db.inspect(move |_| {
                stats.entries_read_from_existing.fetch_add(1, Ordering::Relaxed);
            });

            let final_entries = counted_existing.chain(entries);
            self.writer.write(final_entries)
        } else {
            self.writer.write(entries)
        }
    }
}

/// The type represents a writer that writes JSON compilation database files atomically.
///
/// The file is first written to a temporary file and then renamed to the final file name.
/// This ensures that the output file is not left in an inconsistent state in case of errors.
pub(super) struct AtomicClangOutputWriter<T: IteratorWriter<clang::Entry>> {
    writer: T,
    temp_path: path::PathBuf,
    final_path: path::PathBuf,
}

impl<T: IteratorWriter<clang::Entry>> AtomicClangOutputWriter<T> {
    pub(super) fn new(writer: T, temp_path: &path::Path, final_path: &path::Path) -> Self {
        Self { writer, temp_path: temp_path.to_path_buf(), final_path: final_path.to_path_buf() }
    }
}

impl<T: IteratorWriter<clang::Entry>> IteratorWriter<clang::Entry> for AtomicClangOutputWriter<T> {
    fn write(self, entries: impl Iterator<Item = clang::Entry>) -> Result<(), WriterError> {
        self.writer.write(entries)?;

        fs::rename(&self.temp_path, &self.final_path)
            .map_err(|err| WriterError::Io(self.final_path, SerializationError::Io(err)))?;

        Ok(())
    }
}

/// The type represents a writer that writes JSON compilation database files from given entries.
///
/// # Features
/// - Filters duplicates based on the provided configuration.
pub(super) struct UniqueOutputWriter<T: IteratorWriter<clang::Entry>> {
    writer: T,
    filter: clang::DuplicateEntryFilter,
    stats: Arc<OutputStatistics>,
}

impl<T: IteratorWriter<clang::Entry>> UniqueOutputWriter<T> {
    pub(super) fn create(
        writer: T,
        config: config::DuplicateFilter,
        stats: Arc<OutputStatistics>,
    ) -> Result<Self, WriterCreationError> {
        let filter = clang::DuplicateEntryFilter::try_from(config)
            .map_err(|err| WriterCreationError::Configuration(err.to_string()))?;

        Ok(Self { writer, filter, stats })
    }
}

impl<T: IteratorWriter<clang::Entry>> IteratorWriter<clang::Entry> for UniqueOutputWriter<T> {
    fn write(self, entries: impl Iterator<Item = clang::Entry>) -> Result<(), WriterError> {
        let mut filter = self.filter;
        let stats = Arc::clone(&self.stats);

        let filtered_entries = entries.filter(move |entry| {
            let is_unique = filter.unique(entry);
            if !is_unique {
                stats.duplicates_detected.fetch_add(1, Ordering::Relaxed);
            }
            is_unique
        });

        self.writer.write(filtered_entries)
    }
}

/// The type represents a writer that filters compilation database entries based on source file paths.
///
/// # Features
/// - Filters entries based on directory-based rules with order-based evaluation semantics.
/// - Uses the configured source filter to include/exclude files.
pub(super) struct SourceFilterOutputWriter<T: IteratorWriter<clang::Entry>> {
    writer: T,
    filter: clang::SourceEntryFilter,
    stats: Arc<OutputStatistics>,
}

impl<T: IteratorWriter<clang::Entry>> SourceFilterOutputWriter<T> {
    pub(super) fn create(
        writer: T,
        config: config::SourceFilter,
        stats: Arc<OutputStatistics>,
    ) -> Result<Self, WriterCreationError> {
        let filter = clang::SourceEntryFilter::try_from(config)
            .map_err(|err| WriterCreationError::Configuration(err.to_string()))?;

        Ok(Self { writer, filter, stats })
    }
}

impl<T: IteratorWriter<clang::Entry>> IteratorWriter<clang::Entry> for SourceFilterOutputWriter<T> {
    fn write(self, entries: impl Iterator<Item = clang::Entry>) -> Result<(), WriterError> {
        let filter = self.filter;
        let stats = Arc::clone(&self.stats);

        let filtered_entries = entries.filter(move |entry| {
            let included = filter.should_include(entry);
            if !included {
                stats.entries_filtered_by_source.fetch_add(1, Ordering::Relaxed);
            }
            included
        });

        self.writer.write(filtered_entries)
    }
}

/// The type represents a writer that writes JSON compilation database files from given entries.
///
/// # Features
/// - Writes the entries to a file.
/// - Formats the entries to the configured shape.
pub(super) struct ClangOutputWriter {
    output: io::BufWriter<fs::File>,
    path: path::PathBuf,
    stats: Arc<OutputStatistics>,
}

impl ClangOutputWriter {
    pub(super) fn create(
        path: &path::Path,
        stats: Arc<OutputStatistics>,
    ) -> Result<Self, WriterCreationError> {
        let output = fs::File::create(path)
            .map(io::BufWriter::new)
            .map_err(|err| WriterCreationError::Io(path.to_path_buf(), err))?;

        Ok(Self { output, path: path.to_path_buf(), stats })
    }
}

impl IteratorWriter<clang::Entry> for ClangOutputWriter {
    fn write(self, entries: impl Iterator<Item = clang::Entry>) -> Result<(), WriterError> {
        let stats = Arc::clone(&self.stats);

        // Count entries as they are written
        let counted_entries = entries.inspect(move |_| {
            stats.entries_written.fetch_add(1, Ordering::Relaxed);
        });

        JsonCompilationDatabase::write(self.output, counted_entries)
            .map_err(|err| WriterError::Io(self.path, err))
    }
}
