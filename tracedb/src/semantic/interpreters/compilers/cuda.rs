// SPDX-License-Identifier: GPL-3.0-or-later

//! CUDA compiler (nvcc) command-line argument parser for compilation database generation.
//!
//! This module provides a specialized interpreter for parsing NVIDIA CUDA Compiler (nvcc)
//! command lines. NVCC is a meta-compiler that separates device code from host code and
//! compiles them with appropriate compilers. It supports many GCC-compatible flags since
//! it often delegates host compilation to GCC or Clang.
//!
//! The interpreter recognizes various CUDA-specific flags and categorizes them into semantic
//! groups (source files, output files, compilation options, etc.) to generate accurate
//! compilation database entries for CUDA-based projects.

use super::super::matchers::{FlagAnalyzer, FlagPattern, FlagRule};
use super::gcc::{GCC_FLAGS, parse_arguments_and_environment};
use crate::semantic::{ArgumentKind, Command, CompilerCommand, CompilerPass, Execution, Interpreter};

/// CUDA compiler (nvcc) command-line argument parser that extracts semantic information from compiler invocations.
///
/// This interpreter processes NVIDIA CUDA Compiler command lines to identify:
/// - CUDA source files (.cu, .cuh) and host source files being compiled
/// - Output files and directories
/// - CUDA-specific compiler flags (GPU architecture, compilation modes, etc.)
/// - Host compiler flags that are passed through to the host compiler
/// - Include directories and preprocessor definitions
///
/// NVCC supports many GCC-compatible flags since it delegates host compilation to
/// GCC or Clang, so this interpreter extends GCC flag definitions with CUDA-specific flags.
pub struct CudaInterpreter {
    /// Flag analyzer that recognizes and categorizes CUDA command-line flags
    /// (includes GCC-compatible flags plus CUDA-specific extensions)
    matcher: FlagAnalyzer,
}

impl Default for CudaInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl CudaInterpreter {
    /// Creates a new CUDA interpreter with comprehensive CUDA flag definitions.
    ///
    /// The interpreter is configured with patterns to recognize both GCC-compatible flags
    /// and CUDA-specific extensions including GPU architecture specifications,
    /// device/host compilation modes, CUDA runtime flags, and nvcc-specific options.
    pub fn new() -> Self {
        Self { matcher: FlagAnalyzer::new(&CUDA_FLAGS) }
    }
}

impl Interpreter for CudaInterpreter {
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

/// CUDA (nvcc) flag definitions using pattern matching for argument parsing
///
/// Based on NVIDIA CUDA Compiler documentation:
/// https://docs.nvidia.com/cuda/cuda-compiler-driver-nvcc/
pub static CUDA_FLAGS: std::sync::LazyLock<Vec<FlagRule>> = std::sync::LazyLock::new(|| {
    let mut flags = Vec::new();

    // Add CUDA-specific flags first
    flags.extend([
        // GPU Architecture and Code Generation
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--gpu-architecture"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-arch"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--gpu-code"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-code"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--generate-code"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-gencode"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Compilation Modes
        FlagRule::new(
            FlagPattern::Exactly("--compile", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-c", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--device-c", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-dc", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--device-w", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-dw", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--device-link", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-dlink", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--link", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--lib", 0),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(FlagPattern::Exactly("--run", 0), ArgumentKind::Other(None)),
        // CUDA Runtime and Toolkit
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--cudart"),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--cuda-path"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Host Compiler Options
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--compiler-bindir"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-ccbin"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Prefix("-Xcompiler", 1),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Prefix("-Xlinker", 1),
            ArgumentKind::Other(Some(CompilerPass::Linking)),
        ),
        // Device-Specific Options
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--maxrregcount"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-maxrregcount"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--use_fast_math", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-use_fast_math", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--ftz", 1),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--prec-div", 1),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--prec-sqrt", 1),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--fmad", 1),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // PTX and SASS Options
        FlagRule::new(
            FlagPattern::Exactly("--ptx", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--cubin", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--fatbin", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Debug and Profiling
        FlagRule::new(
            FlagPattern::Exactly("--device-debug", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-G", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--generate-line-info", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-lineinfo", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--profile", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Optimization
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--optimize"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-O"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Language Standard
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--std"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Relocatable Device Code
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--relocatable-device-code"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-rdc", 1),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Extended Lambda
        FlagRule::new(
            FlagPattern::Exactly("--extended-lambda", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-extended-lambda", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Experimental Features
        FlagRule::new(
            FlagPattern::Exactly("--expt-extended-lambda", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("--expt-relaxed-constexpr", 0),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        // Output Options
        FlagRule::new(FlagPattern::ExactlyWithGluedOrSep("--output-file"), ArgumentKind::Output),
        FlagRule::new(FlagPattern::ExactlyWithGluedOrSep("-o"), ArgumentKind::Output),
        // Preprocessing
        FlagRule::new(
            FlagPattern::Exactly("--preprocess", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        FlagRule::new(
            FlagPattern::Exactly("-E", 0),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        // Verbose and Information
        FlagRule::new(FlagPattern::Exactly("--verbose", 0), ArgumentKind::Other(None)),
        FlagRule::new(FlagPattern::Exactly("-v", 0), ArgumentKind::Other(None)),
        FlagRule::new(FlagPattern::Exactly("--version", 0), ArgumentKind::Other(Some(CompilerPass::Info))),
        FlagRule::new(FlagPattern::Exactly("--help", 0), ArgumentKind::Other(Some(CompilerPass::Info))),
        // Warnings
        FlagRule::new(FlagPattern::Prefix("-W", 0), ArgumentKind::Other(None)),
        FlagRule::new(FlagPattern::Prefix("--disable-warnings", 0), ArgumentKind::Other(None)),
        // CUDA-specific include paths
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--include-path"),
            ArgumentKind::Other(Some(CompilerPass::Preprocessing)),
        ),
        // Keep intermediate files
        FlagRule::new(FlagPattern::Exactly("--keep", 0), ArgumentKind::Other(None)),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--keep-dir"),
            ArgumentKind::Other(None),
        ),
        // Machine and Target Options
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("--machine"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
        FlagRule::new(
            FlagPattern::ExactlyWithEqOrSep("-m"),
            ArgumentKind::Other(Some(CompilerPass::Compiling)),
        ),
    ]);

    // Add GCC flags after CUDA flags (CUDA flags have priority)
    flags.extend(GCC_FLAGS.iter().cloned());
    flags
});
