// SPDX-License-Identifier: GPL-3.0-or-later

//! Recognizes archive-maintenance invocations (`ar`, `llvm-ar`, `gcc-ar`, ...).
//!
//! The traditional `ar` command line is positional rather than flag-based:
//! `ar <operation>[modifiers] <archive> [member...]`. This interpreter does
//! not attempt to understand every modifier; it only separates the operation
//! letters from the archive path and its member files.

use super::super::{ArCommand, Command, Execution, Interpreter};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static AR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[^/]*-)?(?:ar|llvm-ar|gcc-ar)(?:-[\d.]+)?$").expect("invalid ar name regex"));

/// Recognizes `ar`-family invocations and splits out operation, archive, and members.
pub(super) struct ArInterpreter;

impl ArInterpreter {
    pub(super) fn new() -> Self {
        Self
    }

    fn looks_like_archiver(executable: &std::path::Path) -> bool {
        let name = match executable.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        let name = name.strip_suffix(".exe").or_else(|| name.strip_suffix(".EXE")).unwrap_or(name);
        AR_NAME.is_match(name)
    }

    /// The one-letter operation codes the traditional `ar` grammar defines
    /// (`p`acking modifiers like `c`, `s`, `u`, `v` do not count).
    const OPERATION_LETTERS: &'static [char] = &['r', 'q', 't', 'x', 'd', 'm', 'p'];

    fn parse(&self, execution: &Execution) -> Option<ArCommand> {
        // The operation may be given as a bare letter group ("rcs") or with a
        // leading dash ("-rcs"); `--`-style long options (e.g. `--plugin`)
        // are not the operation and are skipped while scanning for it.
        let rest: Vec<&String> = execution.arguments.iter().skip(1).collect();
        let (operation_idx, operation) = rest
            .iter()
            .enumerate()
            .filter(|(_, arg)| !arg.starts_with("--"))
            .find(|(_, arg)| arg.trim_start_matches('-').contains(Self::OPERATION_LETTERS))
            .map(|(idx, arg)| (idx, arg.trim_start_matches('-').to_string()))?;

        let remainder = &rest[operation_idx + 1..];
        let archive = remainder.first()?;
        let input_files: Vec<PathBuf> =
            remainder[1..].iter().map(|s| PathBuf::from(s.as_str())).collect();

        // `r` (replace/insert), `q` (quick append), and `m` (move) all need at
        // least one member to act on; without one there is nothing to record.
        let requires_input = operation.contains(['r', 'q', 'm']);
        if requires_input && input_files.is_empty() {
            return None;
        }

        Some(ArCommand::new(
            execution.working_dir.clone(),
            execution.executable.clone(),
            operation,
            execution.arguments[1..].to_vec(),
            input_files,
            PathBuf::from(archive.as_str()),
        ))
    }
}

impl Interpreter for ArInterpreter {
    fn recognize(&self, execution: &Execution) -> Option<Command> {
        if !Self::looks_like_archiver(&execution.executable) {
            return None;
        }
        self.parse(execution).map(Command::Archiver)
    }
}
