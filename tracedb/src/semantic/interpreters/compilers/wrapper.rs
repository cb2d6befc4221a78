// SPDX-License-Identifier: GPL-3.0-or-later

//! Wrapper interpreter for handling compiler wrappers like ccache, distcc, and sccache.
//!
//! This module provides support for recognizing and processing compiler wrappers that
//! act as intermediaries between build systems and actual compilers. It extracts the
//! real compiler invocation hidden behind the wrapper so the caller can re-run
//! recognition on it.

use super::compiler_recognition::CompilerRecognizer;
use crate::config::CompilerType;
use crate::intercept::Execution;

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves compiler wrappers (ccache, distcc, sccache) to the real compiler they invoke.
///
/// Unlike the other compiler interpreters, this type does not itself produce a
/// [`Command`](crate::semantic::Command). It only strips the wrapper layer off an
/// [`Execution`] so that the caller (the owning `CompilerInterpreter`) can re-run
/// recognition on the unwrapped executable and arguments. This avoids needing a
/// handle back to the dispatcher that owns it.
pub struct WrapperInterpreter {
    recognizer: Arc<CompilerRecognizer>,
}

impl WrapperInterpreter {
    /// Creates a new wrapper interpreter sharing the given recognizer.
    pub fn new(recognizer: Arc<CompilerRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Unwraps a wrapper invocation into the [`Execution`] of the real compiler it runs.
    ///
    /// Returns `None` if `execution` is not a recognized wrapper, or if the wrapped
    /// command cannot be confidently resolved to a non-wrapper compiler (this also
    /// guards against infinite recursion when a wrapper invokes itself).
    pub fn unwrap_execution(&self, execution: &Execution) -> Option<Execution> {
        let wrapper_name = self.detect_wrapper_name(&execution.executable)?;

        let (real_compiler_path, filtered_args) =
            self.extract_real_compiler(&wrapper_name, &execution.arguments)?;

        let compiler_type = self.recognizer.recognize(&real_compiler_path)?;
        if matches!(compiler_type, CompilerType::Wrapper) {
            return None;
        }

        Some(Execution {
            executable: real_compiler_path,
            arguments: filtered_args,
            working_dir: execution.working_dir.clone(),
            environment: execution.environment.clone(),
        })
    }

    /// Detects the wrapper type from the executable name.
    fn detect_wrapper_name(&self, executable: &Path) -> Option<String> {
        let name = executable.file_stem()?.to_str()?;
        match name {
            "ccache" | "distcc" | "sccache" => Some(name.to_string()),
            _ => None,
        }
    }

    /// Extracts the real compiler path and filtered arguments from wrapper invocation.
    fn extract_real_compiler(&self, wrapper_name: &str, args: &[String]) -> Option<(PathBuf, Vec<String>)> {
        match wrapper_name {
            "ccache" => self.handle_ccache(args),
            "distcc" => self.handle_distcc(args),
            "sccache" => self.handle_sccache(args),
            _ => None,
        }
    }

    /// Handles ccache wrapper invocations.
    fn handle_ccache(&self, args: &[String]) -> Option<(PathBuf, Vec<String>)> {
        if args.len() > 1 {
            // Case 1: Explicit compiler - ccache gcc -c main.c
            let potential_compiler = &args[1];
            let compiler_path = PathBuf::from(potential_compiler);

            // Use CompilerRecognizer to validate it's actually a compiler
            if let Some(compiler_type) = self.recognizer.recognize(&compiler_path) {
                // Skip if it's another wrapper to avoid infinite recursion
                if !matches!(compiler_type, CompilerType::Wrapper) {
                    return Some((compiler_path, args[2..].to_vec()));
                }
            }
        }

        None
    }

    /// Handles sccache wrapper invocations.
    fn handle_sccache(&self, args: &[String]) -> Option<(PathBuf, Vec<String>)> {
        // sccache behavior is similar to ccache
        self.handle_ccache(args)
    }

    /// Handles distcc wrapper invocations.
    fn handle_distcc(&self, args: &[String]) -> Option<(PathBuf, Vec<String>)> {
        // distcc can have its own options before the compiler
        let mut compiler_index = 1;

        // Skip distcc-specific options
        while compiler_index < args.len() {
            let arg = &args[compiler_index];
            if arg.starts_with('-') && self.is_distcc_option(arg) {
                compiler_index += 1;
                // Some options might have values
                if self.distcc_option_has_value(arg) && compiler_index < args.len() {
                    compiler_index += 1;
                }
            } else {
                break;
            }
        }

        if compiler_index < args.len() {
            let compiler_path = PathBuf::from(&args[compiler_index]);
            if let Some(compiler_type) = self.recognizer.recognize(&compiler_path)
                && !matches!(compiler_type, CompilerType::Wrapper)
            {
                return Some((compiler_path, args[compiler_index + 1..].to_vec()));
            }
        }

        None
    }

    /// Checks if an argument is a distcc-specific option.
    fn is_distcc_option(&self, arg: &str) -> bool {
        matches!(
            arg,
            "-j" | "--jobs"
                | "-v"
                | "--verbose"
                | "-i"
                | "--show-hosts"
                | "--scan-avail"
                | "--show-principal"
        )
    }

    /// Checks if a distcc option requires a value.
    fn distcc_option_has_value(&self, arg: &str) -> bool {
        matches!(arg, "-j" | "--jobs")
    }
}
