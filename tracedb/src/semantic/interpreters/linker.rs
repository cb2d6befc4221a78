// SPDX-License-Identifier: GPL-3.0-or-later

//! Recognizes standalone link invocations (`ld`, `lld`, `gold`, `mold`, ...).
//!
//! Build systems sometimes invoke the linker directly, bypassing the compiler
//! driver (which would otherwise hide the link step behind `-o`). This
//! interpreter classifies such invocations and records their object files,
//! libraries, and output so they can be captured alongside compilation
//! commands.

use super::super::{Command, Execution, Interpreter, LinkCommand};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static LINKER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^/]*-)?(?:ld|lld|ld\.gold|gold|ld\.lld|ld\.bfd|mold)(?:-[\d.]+)?$")
        .expect("invalid linker name regex")
});

/// Recognizes direct linker invocations and extracts their input/output files.
pub(super) struct LinkerInterpreter;

impl LinkerInterpreter {
    pub(super) fn new() -> Self {
        Self
    }

    fn looks_like_linker(executable: &std::path::Path) -> bool {
        let name = match executable.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        let name = name.strip_suffix(".exe").or_else(|| name.strip_suffix(".EXE")).unwrap_or(name);
        LINKER_NAME.is_match(name)
    }

    fn parse(&self, execution: &Execution) -> LinkCommand {
        let mut arguments = Vec::new();
        let mut input_files = Vec::new();
        let mut output = None;

        let args = execution.arguments.iter().skip(1);
        let mut args = args.peekable();
        while let Some(arg) = args.next() {
            if arg == "-o" || arg == "--output" {
                arguments.push(arg.clone());
                if let Some(value) = args.next() {
                    output = Some(PathBuf::from(value));
                    arguments.push(value.clone());
                }
            } else if let Some(value) = arg.strip_prefix("-o") {
                // glued form: "-ofile"
                output = Some(PathBuf::from(value));
                arguments.push(arg.clone());
            } else if arg.starts_with('-') {
                arguments.push(arg.clone());
            } else {
                // A bare positional token is an object file, static/shared
                // library, or linker script passed by path.
                input_files.push(PathBuf::from(arg));
                arguments.push(arg.clone());
            }
        }

        LinkCommand::new(
            execution.working_dir.clone(),
            execution.executable.clone(),
            arguments,
            input_files,
            output,
        )
    }
}

impl Interpreter for LinkerInterpreter {
    fn recognize(&self, execution: &Execution) -> Option<Command> {
        if !Self::looks_like_linker(&execution.executable) {
            return None;
        }
        Some(Command::Linker(self.parse(execution)))
    }
}
