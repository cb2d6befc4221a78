// SPDX-License-Identifier: GPL-3.0-or-later

//! GCC command-line argument parser for compilation database generation.
//!
//! This module provides a specialized interpreter for parsing GCC and GCC-compatible
//! compiler command lines. It recognizes various compiler flags and categorizes them
//! into semantic groups (source files, output files, compilation options, etc.) to
//! generate accurate compilation database entries.
//!
//! The interpreter assumes compiler recognition has been handled by the compiler_interpreter
//! and focuses solely on argument parsing and semantic analysis of command-line flags.

use super::super::matchers::{looks_like_a_source_file, FlagAnalyzer, FlagPattern, FlagRule};
use super::arguments::{OtherArguments, OutputArgument, SourceArgument};
use crate::environment::{
    KEY_GCC__C_INCLUDE_1, KEY_GCC__C_INCLUDE_2, KEY_GCC__C_INCLUDE_3, KEY_GCC__OBJC_INCLUDE,
};
use crate::semantic::{
    ArgumentKind, Arguments, Command, CompilerCommand, CompilerPass, Execution, Interpreter,
};

/// GCC command-line argument parser that extracts semantic information from compiler invocations.
///
/// This interpreter processes GCC and GCC-compatible compiler command lines to identify:
/// - Source files being compiled
/// - Output files and directories
/// - Compiler flags that affect compilation
/// - Include directories and preprocessor definitions
///
/// It assumes the executable has already been recognized as GCC-compatible by the
/// compiler recognition system and focuses purely on argument parsing.
pub struct GccInterpreter {
    /// Flag analyzer that recognizes and categorizes GCC command-line flags
    matcher: FlagAnalyzer,
}

impl Default for GccInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl GccInterpreter {
    /// Creates a new GCC interpreter with comprehensive GCC flag definitions.
    ///
    /// The interpreter is configured with patterns to recognize standard GCC flags
    /// including optimization flags, warning flags, include directories, preprocessor
    /// definitions, and various compilation options.
    pub fn new() -> Self {
        Self {
            matcher: FlagAnalyzer::new(&GCC_FLAGS),
        }
    }
}

impl Interpreter for GccInterpreter {
    fn recognize(&self, execution: &Execution) -> Option<Command> {
        // Parse both command-line arguments and environment variables
        let annotated_args = parse_arguments_and_environment(&self.matcher, execution);

        Some(Command::Compiler(CompilerCommand::new(
            execution.working_dir.clone(),
            execution.executable.clone(),
            annotated_args,
        )))
    }
}

/// GCC flag definitions using pattern matching for argument parsing
///
/// https://gcc.gnu.org/onlinedocs/gcc/Option-Summary.html
pub static GCC_FLAGS: std::sync::LazyLock<Vec<FlagRule>> = std::sync::LazyLock::new(|| {
    let mut flags = vec![
        // Basic compilation control flags
        FlagRule::new(
            FlagPattern::Exactly("-c", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-E", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-S", 0),
            ArgumentKind::Other(Some(CompilerPass::Assembling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-r", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(FlagPattern::Exactly("-pipe", 0), ArgumentKind::Other(None)),
        FlagRule::new(
            FlagPattern::Exactly("-v", 0),
            ArgumentKind::Other(Some(CompilerPass::Info)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-###", 0),
            ArgumentKind::Other(Some(CompilerPass::Info)),
        ),
        FlagRule::new(
            FlagPattern::Prefix("--help", 0),
            ArgumentKind::Other(Some(CompilerPass::Info)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--version", 0),
            ArgumentKind::Other(Some(CompilerPass::Info)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-ansi", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Debug information flags - using prefix for -g family
        FlagRule::new(
            FlagPattern::Prefix("-g", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Optimization flags - using prefix for comprehensive coverage
        FlagRule::new(
            FlagPattern::Prefix("-O", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Warning flags - comprehensive prefix coverage
        FlagRule::new(FlagPattern::Exactly("-w", 0), ArgumentKind::Other(None)),
        FlagRule::new(FlagPattern::Prefix("-W", 0), ArgumentKind::Other(None)),
        // Feature flags - comprehensive prefix coverage
        FlagRule::new(
            FlagPattern::Prefix("-f", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Machine/target flags - comprehensive prefix coverage
        FlagRule::new(
            FlagPattern::Prefix("-m", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Include directories and system includes
        FlagRule::new(
            FlagPattern::ExactlyWithGluedOrSep("-I"),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-isystem", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-iquote", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-idirafter", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-iprefix", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-iwithprefix", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-iwithprefixbefore", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-imultilib", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-isysroot", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--sysroot"),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-nostdinc", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-nostdinc++", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        // Library directories and libraries
        FlagRule::new(
            FlagPattern::ExactlyWithGluedOrSep("-L"),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithGluedOrSep("-l"),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-nostartfiles", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-nodefaultlibs", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-nostdlib", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-nostdlib++", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-static", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-static-libgcc", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-static-libstdc++", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-shared", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-shared-libgcc", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-pie", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-rdynamic", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        // Preprocessor defines and undefines
        FlagRule::new(
            FlagPattern::ExactlyWithGluedOrSep("-D"),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithGluedOrSep("-U"),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithGluedOrSep("-include"),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        // Output file
        FlagRule::new(
            FlagPattern::ExactlyWithGluedOrSep("-o"),
            ArgumentKind::Output,
        ),
        // Language and standard specification
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-std"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithGluedOrSep("-x"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Dependency generation flags
        FlagRule::new(
            FlagPattern::Exactly("-M", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-MM", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-MD", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-MMD", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-MF", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-MG", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-MP", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-MT", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-MQ", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        // Linker flags
        FlagRule::new(
            FlagPattern::Prefix("-Wl,", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-Xlinker", 1),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-T", 1),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-u", 1),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-z", 1),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        // Assembler flags
        FlagRule::new(
            FlagPattern::Prefix("-Wa,", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-Xassembler", 1),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Preprocessor flags
        FlagRule::new(
            FlagPattern::Prefix("-Wp,", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-Xpreprocessor", 1),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        // Directory search flags
        FlagRule::new(
            FlagPattern::ExactlyWithGluedOrSep("-B"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Response files
        FlagRule::new(FlagPattern::Prefix("@", 0), ArgumentKind::Other(None)),
        // Plugin flags
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-fplugin"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Threading
        FlagRule::new(
            FlagPattern::Exactly("-pthread", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        // Profile and instrumentation
        FlagRule::new(
            FlagPattern::Exactly("-p", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-pg", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--coverage", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Preprocessor control flags
        FlagRule::new(
            FlagPattern::Exactly("-C", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-CC", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-P", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-traditional", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-traditional-cpp", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-trigraphs", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-undef", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        // Dump flags - using prefix for comprehensive coverage
        FlagRule::new(
            FlagPattern::Prefix("-d", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Save temporary files
        FlagRule::new(
            FlagPattern::Prefix("-save-temps", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Specs files
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-specs"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Wrapper
        FlagRule::new(
            FlagPattern::Exactly("-wrapper", 1),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
    ];

    // Sort by flag length descending to ensure longer matches are tried first
    flags.sort_by(|a, b| b.pattern.flag().len().cmp(&a.pattern.flag().len()));

    flags
});

/// Parse command line arguments using the provided flag analyzer.
fn parse_arguments(flag_analyzer: &FlagAnalyzer, args: &[String]) -> Vec<Box<dyn Arguments>> {
    let mut result: Vec<Box<dyn Arguments>> = Vec::new();
    let mut i = 0;

    while i < args.len() {
        let remaining_args = &args[i..];

        // Handle the first argument (compiler name)
        if i == 0 {
            result.push(Box::new(OtherArguments::new(
                vec![args[0].clone()],
                ArgumentKind::Compiler,
            )));
            i += 1;
            continue;
        }

        let current_arg = &args[i];

        // Check if it's a source file (not a flag)
        if !current_arg.starts_with('-') {
            if looks_like_a_source_file(current_arg) {
                result.push(Box::new(SourceArgument::new(current_arg.clone())));
            } else {
                // Non-source, non-flag argument
                result.push(Box::new(OtherArguments::new(
                    vec![current_arg.clone()],
                    ArgumentKind::Other(None),
                )));
            }
            i += 1;
            continue;
        }

        // Try to match against flag definitions
        if let Some(match_result) = flag_analyzer.match_flag(remaining_args) {
            let consumed_count = match_result.consumed_args_count();
            let arg: Box<dyn Arguments> = match match_result.rule.kind {
                ArgumentKind::Compiler => Box::new(OtherArguments::new(
                    vec![match_result.consumed_args[0].clone()],
                    ArgumentKind::Compiler,
                )),
                ArgumentKind::Source => {
                    // This case should never occur since source files are handled by heuristic above
                    unreachable!("Source files should be detected by heuristic, not flag matching")
                }
                ArgumentKind::Output => match match_result.consumed_args_count() {
                    1 => Box::new(OutputArgument::new(
                        "-o".to_string(),
                        match_result.consumed_args[0][2..].to_string(),
                    )),
                    2 => Box::new(OutputArgument::new(
                        match_result.consumed_args[0].clone(),
                        match_result.consumed_args[1].clone(),
                    )),
                    _ => {
                        unreachable!("Output file should be specified either `-o file` or `-ofile`")
                    }
                },
                ArgumentKind::Other(compiler_pass) => Box::new(OtherArguments::new(
                    match_result.consumed_args,
                    ArgumentKind::Other(compiler_pass),
                )),
            };

            result.push(arg);
            i += consumed_count;
        } else {
            // Unknown flag - treat as simple flag
            result.push(Box::new(OtherArguments::new(
                vec![current_arg.clone()],
                ArgumentKind::Other(None),
            )));
            i += 1;
        }
    }

    result
}

/// Parse include directories from GCC-compatible environment variables.
///
/// https://gcc.gnu.org/onlinedocs/cpp/Environment-Variables.html
///
/// Returns a vector of Arguments representing the environment-based include directories.
/// This vector can be concatenated with the result of `parse_arguments` to create
/// a complete argument list.
fn parse_environment(
    environment: &std::collections::HashMap<String, String>,
) -> Vec<Box<dyn Arguments>> {
    let mut args: Vec<Box<dyn Arguments>> = Vec::new();

    // Process the three GCC include environment variables that use -I
    for env_key in [
        KEY_GCC__C_INCLUDE_1,
        KEY_GCC__C_INCLUDE_2,
        KEY_GCC__C_INCLUDE_3,
    ] {
        if let Some(env_value) = environment.get(env_key) {
            // Use std::env::split_paths for platform-correct path splitting
            for path in std::env::split_paths(env_value) {
                if !path.as_os_str().is_empty() {
                    args.push(Box::new(OtherArguments::new(
                        vec!["-I".to_string(), path.to_string_lossy().to_string()],
                        ArgumentKind::Other(None),
                    )));
                }
            }
        }
    }

    // Process OBJC_INCLUDE_PATH which uses -isystem
    if let Some(env_value) = environment.get(KEY_GCC__OBJC_INCLUDE) {
        // Use std::env::split_paths for platform-correct path splitting
        for path in std::env::split_paths(env_value) {
            if !path.as_os_str().is_empty() {
                args.push(Box::new(OtherArguments::new(
                    vec!["-isystem".to_string(), path.to_string_lossy().to_string()],
                    ArgumentKind::Other(None),
                )));
            }
        }
    }

    args
}

/// Parse both command-line arguments and environment variables to generate complete argument list.
///
/// This is a convenience function that combines the results of `parse_arguments` and
/// `parse_environment`, providing a unified interface for both GCC and Clang interpreters.
///
/// # Arguments
///
/// * `flag_analyzer` - The flag analyzer to use for parsing command-line arguments
/// * `execution` - The execution context containing both arguments and environment variables
///
/// # Returns
///
/// A complete vector of Arguments containing both command-line and environment-based arguments.
pub fn parse_arguments_and_environment(
    flag_analyzer: &FlagAnalyzer,
    execution: &Execution,
) -> Vec<Box<dyn Arguments>> {
    let mut args = parse_arguments(flag_analyzer, &execution.arguments);
    let env_args = parse_environment(&execution.environment);
    args.extend(env_args);
    args
}
