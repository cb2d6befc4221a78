// SPDX-License-Identifier: GPL-3.0-or-later

//! This module declares the file formats used by this project.
//! The following formats are declared:
//!
//! - The JSON compilation database format, as declared by the Clang project.
//! - The semantic database format (internal format of this project).
//! - The execution event database format (internal format of this project.)

use super::{clang, json};
use crate::intercept;
use serde_json::StreamDeserializer;
use serde_json::de::IoRead;
use thiserror::Error;

/// Represents errors that can occur while working with file formats.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Generic IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format syntax error: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("Format semantic error: {0}")]
    Semantic(#[from] clang::EntryError),
}

/// A trait representing a file format that can be written to and read from.
///
/// File formats in this project are usually sequences of values. This trait
/// provides a type-independent abstraction over file formats.
pub trait SerializationFormat<T> {
    /// Writes an iterator of items to the specified writer.
    fn write(writer: impl std::io::Write, items: impl Iterator<Item = T>) -> Result<(), SerializationError>;

    /// Reads items from the specified reader, returning an iterator of results.
    fn read(reader: impl std::io::Read) -> impl Iterator<Item = Result<T, SerializationError>>;

    /// Reads entries from the file and ignores any errors.
    ///
    /// This is not always feasible when the file format is strict.
    fn read_and_ignore(reader: impl std::io::Read, message_writer: impl Fn(&str)) -> impl Iterator<Item = T> {
        Self::read(reader).filter_map(move |result| match result {
            Ok(value) => Some(value),
            Err(error) => {
                message_writer(&error.to_string());
                None
            }
        })
    }
}

/// The type represents a JSON compilation database format.
///
/// The format is a JSON array format, which is a sequence of JSON objects
/// enclosed in square brackets. Each object represents a compilation
/// command.
///
/// # Note
/// The format itself is defined in the LLVM project documentation.
/// https://clang.llvm.org/docs/JSONCompilationDatabase.html
pub struct JsonCompilationDatabase;

impl SerializationFormat<clang::Entry> for JsonCompilationDatabase {
    fn write(
        writer: impl std::io::Write,
        entries: impl Iterator<Item = clang::Entry>,
    ) -> Result<(), SerializationError> {
        json::serialize_result_seq(
            writer,
            // Ensure only valid entries are serialized.
            entries.map(|entry| match entry.validate() {
                Ok(_) => Ok(entry),
                Err(err) => Err(SerializationError::Semantic(err)),
            }),
        )
    }

    fn read(reader: impl std::io::Read) -> impl Iterator<Item = Result<clang::Entry, SerializationError>> {
        json::deserialize_seq(reader).map(|res| {
            res.map_err(SerializationError::Syntax)
                // Ensure only valid entries are returned.
                .and_then(|entry: clang::Entry| match entry.validate() {
                    Ok(_) => Ok(entry),
                    Err(err) => Err(SerializationError::Semantic(err)),
                })
        })
    }
}

/// The type represents a database format for execution events.
///
/// The format is a [JSON line format](https://jsonlines.org/), which is a sequence
/// of JSON objects separated by newlines.
///
/// # Note
/// The output format is not stable and may change in future versions.
pub struct ExecutionEventDatabase;

impl SerializationFormat<intercept::Event> for ExecutionEventDatabase {
    fn write(
        writer: impl std::io::Write,
        events: impl Iterator<Item = intercept::Event>,
    ) -> Result<(), SerializationError> {
        let mut writer = writer;
        for event in events {
            serde_json::to_writer(&mut writer, &event).map_err(SerializationError::Syntax)?;
            writer.write_all(b"\n").map_err(SerializationError::Io)?;
        }
        Ok(())
    }

    fn read(
        reader: impl std::io::Read,
    ) -> impl Iterator<Item = Result<intercept::Event, SerializationError>> {
        let stream = StreamDeserializer::new(IoRead::new(reader));
        stream.map(|value| value.map_err(SerializationError::Syntax))
    }
}
