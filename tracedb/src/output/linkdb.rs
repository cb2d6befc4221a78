// SPDX-License-Identifier: GPL-3.0-or-later

//! Output support for link and archive databases.
//!
//! Link and archive invocations don't fan out per source file the way a
//! compilation does, so they don't fit the Clang JSON compilation database
//! [`super::clang::Entry`] shape. Instead each gets its own sibling JSON
//! array file (`link_commands.json`, `ar_commands.json`) written next to the
//! main compilation database.
//!
//! The write path mirrors the compilation database's atomic-write-then-rename
//! and append-with-existing-content conventions, but collapsed into a single
//! function rather than the layered writer stack in [`super::writers`]: there
//! is no source filtering (no single `file` field to filter on) and no path
//! reformatting (paths are recorded as given).

use super::json;
use super::{SerializationError, WriterError};
use crate::semantic::{ArCommand, LinkCommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::io;
use std::path::{Path, PathBuf};

/// A single standalone link invocation.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LinkEntry {
    pub directory: PathBuf,
    pub linker: PathBuf,
    pub arguments: Vec<String>,
    pub input_files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl From<&LinkCommand> for LinkEntry {
    fn from(cmd: &LinkCommand) -> Self {
        Self {
            directory: cmd.working_dir.clone(),
            linker: cmd.linker.clone(),
            arguments: cmd.arguments.clone(),
            input_files: cmd.input_files.clone(),
            output: cmd.output.clone(),
        }
    }
}

/// A single archive-maintenance invocation.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ArEntry {
    pub directory: PathBuf,
    pub ar_tool: PathBuf,
    pub operation: String,
    pub arguments: Vec<String>,
    pub input_files: Vec<PathBuf>,
    pub output: PathBuf,
}

impl From<&ArCommand> for ArEntry {
    fn from(cmd: &ArCommand) -> Self {
        Self {
            directory: cmd.working_dir.clone(),
            ar_tool: cmd.ar_tool.clone(),
            operation: cmd.operation.clone(),
            arguments: cmd.arguments.clone(),
            input_files: cmd.input_files.clone(),
            output: cmd.output.clone(),
        }
    }
}

/// Writes a JSON array of entries to `path` atomically.
///
/// When `append` is set and `path` already holds entries, the existing
/// entries are read first and merged with the new ones, dropping exact
/// duplicates. Unreadable existing entries are logged and skipped, the same
/// way the compilation database writer tolerates a damaged input file.
pub(super) fn write_database<T>(path: &Path, new_entries: Vec<T>, append: bool) -> Result<(), WriterError>
where
    T: Serialize + DeserializeOwned + Eq + Hash + Clone,
{
    if new_entries.is_empty() && !(append && path.exists()) {
        return Ok(());
    }

    let mut seen = HashSet::new();
    let mut ordered = Vec::new();

    if append && path.exists() {
        for entry in read_database::<T>(path).map_err(|err| WriterError::Io(path.to_path_buf(), err))? {
            if seen.insert(entry.clone()) {
                ordered.push(entry);
            }
        }
    }
    for entry in new_entries {
        if seen.insert(entry.clone()) {
            ordered.push(entry);
        }
    }

    let temp_path = path.with_extension("tmp");
    let file = fs::File::create(&temp_path)
        .map_err(|err| WriterError::Io(temp_path.clone(), SerializationError::Io(err)))?;
    json::serialize_seq(io::BufWriter::new(file), ordered.into_iter())
        .map_err(|err| WriterError::Io(temp_path.clone(), SerializationError::Syntax(err)))?;

    fs::rename(&temp_path, path).map_err(|err| WriterError::Io(path.to_path_buf(), SerializationError::Io(err)))?;

    Ok(())
}

fn read_database<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SerializationError> {
    let file = fs::File::open(path).map(io::BufReader::new)?;

    let mut entries = Vec::new();
    for result in json::deserialize_seq(file) {
        match result {
            Ok(entry) => entries.push(entry),
            Err(error) => log::warn!("Problems to read previous entries: {error:?}"),
        }
    }
    Ok(entries)
}
