// SPDX-License-Identifier: GPL-3.0-or-later

//! Compiler interpreter that recognizes compiler types and delegates to specific interpreters.
//!
//! This module provides a unified entry point for compiler recognition that separates
//! the concern of identifying compiler types from the concern of parsing their arguments.

pub mod arguments;
pub mod clang;
pub mod compiler_recognition;
pub mod cray_fortran;
pub mod cuda;
pub mod gcc;
pub mod intel_fortran;
pub mod wrapper;

use crate::config::{Compiler, CompilerFlags};
use crate::intercept::Execution;
use crate::semantic::{ArgumentKind, Command, CompilerCommand, Interpreter};
use arguments::OtherArguments;
use clang::ClangInterpreter;
use compiler_recognition::{CompilerRecognizer, CompilerType};
use cray_fortran::CrayFortranInterpreter;
use cuda::CudaInterpreter;
use gcc::GccInterpreter;
use intel_fortran::IntelFortranInterpreter;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use wrapper::WrapperInterpreter;

/// A meta-interpreter that recognizes compiler types and delegates parsing to specific interpreters.
///
/// This interpreter follows the separation of concerns principle:
/// - It handles compiler recognition (identifying what type of compiler is being invoked)
/// - It delegates argument parsing to specialized interpreters (GccInterpreter, ClangInterpreter, etc.)
///
/// The specialized interpreters no longer need to check compiler names - they focus purely
/// on parsing command-line arguments according to their specific compiler's syntax. Compiler
/// wrappers (ccache, distcc, sccache) are unwrapped to the real compiler invocation and
/// re-dispatched once.
pub struct CompilerInterpreter {
    /// Unified compiler recognizer for identifying compiler types
    recognizer: Arc<CompilerRecognizer>,
    /// GCC-specific argument parser
    gcc_interpreter: GccInterpreter,
    /// Clang-specific argument parser
    clang_interpreter: ClangInterpreter,
    /// Intel Fortran-specific argument parser
    intel_fortran_interpreter: IntelFortranInterpreter,
    /// Cray Fortran-specific argument parser
    cray_fortran_interpreter: CrayFortranInterpreter,
    /// CUDA (nvcc) argument parser
    cuda_interpreter: CudaInterpreter,
    /// Wrapper (ccache/distcc/sccache) unwrapper
    wrapper_interpreter: WrapperInterpreter,
}

impl CompilerInterpreter {
    /// Creates a new compiler interpreter with default settings.
    pub fn new() -> Self {
        Self::with_recognizer(CompilerRecognizer::new())
    }

    /// Creates a compiler interpreter with a custom recognizer.
    pub fn with_recognizer(recognizer: CompilerRecognizer) -> Self {
        let recognizer = Arc::new(recognizer);
        Self {
            wrapper_interpreter: WrapperInterpreter::new(Arc::clone(&recognizer)),
            recognizer,
            gcc_interpreter: GccInterpreter::new(),
            clang_interpreter: ClangInterpreter::new(),
            intel_fortran_interpreter: IntelFortranInterpreter::new(),
            cray_fortran_interpreter: CrayFortranInterpreter::new(),
            cuda_interpreter: CudaInterpreter::new(),
        }
    }

    /// Creates a compiler interpreter whose recognizer is seeded with explicit
    /// compiler-type hints from configuration.
    pub fn new_with_config(compilers: &[Compiler]) -> Self {
        Self::with_recognizer(CompilerRecognizer::new_with_config(compilers))
    }

    /// Recognizes the compiler type and delegates to the appropriate interpreter.
    fn delegate_to_interpreter(&self, execution: &Execution) -> Option<Command> {
        let command = match self.recognizer.recognize(&execution.executable) {
            Some(CompilerType::Gcc) => self.gcc_interpreter.recognize(execution),
            Some(CompilerType::Clang) => self.clang_interpreter.recognize(execution),
            Some(CompilerType::Flang) => self.gcc_interpreter.recognize(execution),
            Some(CompilerType::IntelFortran) => self.intel_fortran_interpreter.recognize(execution),
            Some(CompilerType::CrayFortran) => self.cray_fortran_interpreter.recognize(execution),
            Some(CompilerType::Cuda) => self.cuda_interpreter.recognize(execution),
            Some(CompilerType::Wrapper) => {
                // Unwrap the wrapper once and re-dispatch on the real compiler. If the
                // unwrapped executable is itself another wrapper, `unwrap_execution`
                // already refuses to resolve it, so this never recurses more than once.
                let real_execution = self.wrapper_interpreter.unwrap_execution(execution)?;
                return self.delegate_to_interpreter(&real_execution);
            }
            None => return None,
        }?;

        match command {
            Command::Compiler(cmd) => {
                let rewritten = match self.recognizer.lookup_flags(&execution.executable) {
                    Some(rewrite) => rewrite_flags(cmd, rewrite),
                    None => cmd,
                };
                Some(Command::Compiler(rewritten))
            }
            other => Some(other),
        }
    }
}

/// Applies the configured flag rewrite to an already-recognized compiler command.
///
/// Argument groups whose rendered form exactly matches an entry in
/// `flags.remove` are dropped, then one new argument group per entry in
/// `flags.add` is appended (split on whitespace, so a value like `"-I /usr/include"`
/// becomes two command-line tokens).
fn rewrite_flags(mut cmd: CompilerCommand, flags: &CompilerFlags) -> CompilerCommand {
    fn identity(path: &Path) -> Cow<Path> {
        Cow::Borrowed(path)
    }

    if !flags.remove.is_empty() {
        cmd.arguments.retain(|argument| {
            let rendered = argument.as_arguments(&identity).join(" ");
            !flags.remove.iter().any(|remove| remove == &rendered)
        });
    }

    for add in &flags.add {
        let tokens: Vec<String> = add.split_whitespace().map(String::from).collect();
        if tokens.is_empty() {
            continue;
        }
        cmd.arguments
            .push(Box::new(OtherArguments::new(tokens, ArgumentKind::Other(None))));
    }

    cmd
}

impl Default for CompilerInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter for CompilerInterpreter {
    fn recognize(&self, execution: &Execution) -> Option<Command> {
        self.delegate_to_interpreter(execution)
    }
}
