// SPDX-License-Identifier: GPL-3.0-or-later

//! Unified compiler recognition using regex patterns.
//!
//! This module provides a consolidated approach to recognizing compiler executables
//! using regular expressions instead of separate hard-coded lists and pattern
//! matching functions for each compiler.

use crate::config::{Compiler, CompilerFlags, CompilerType};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Compile-time initialized default regex patterns for compiler recognition
///
/// This method provides built-in patterns for recognizing common compiler executables
/// based on their names. The patterns are designed to handle various scenarios including:
/// - Cross-compilation prefixes (e.g., `arm-linux-gnueabihf-gcc`)
/// - Versioned executables (e.g., `gcc-11`, `clang-15`)
/// - Multiple naming conventions for the same compiler family
///
/// # Supported Compiler Patterns
///
/// - **GCC**: Matches `gcc`, `g++`, `cc`, `c++` with optional cross-compilation prefixes and version suffixes
/// - **Clang**: Matches `clang`, `clang++` with optional cross-compilation prefixes and version suffixes
/// - **Fortran**: Matches `gfortran`, `f77`, `f90`, `f95`, `f03`, `f08` with optional prefixes and versions
/// - **Intel Fortran**: Matches `ifort`, `ifx` with optional version suffixes
/// - **Cray Fortran**: Matches `crayftn`, `ftn` with optional version suffixes
///
/// # Returns
///
/// A vector of tuples where each tuple contains:
/// - `CompilerType`: The type of compiler the pattern identifies
/// - `Regex`: The compiled regular expression pattern for matching executable names
///
/// # Examples
///
/// The returned patterns will match executables like:
/// - `gcc`, `arm-linux-gnueabihf-gcc`, `gcc-11`
/// - `clang++`, `x86_64-pc-linux-gnu-clang`, `clang-15`
/// - `gfortran`, `aarch64-linux-gnu-gfortran-9`
/// - `ifort`, `ifx-2023`
/// - `crayftn`, `ftn`
static DEFAULT_PATTERNS: LazyLock<Vec<(CompilerType, Regex)>> = LazyLock::new(|| {
    // GCC pattern: matches cc, c++ and gcc cross compilation variants and versioned variants
    let gcc_pattern = Regex::new(r"^(?:[^/]*-)?(?:gcc|g\+\+|cc|c\+\+)(?:-[\d.]+)?$")
        .expect("Invalid GCC regex pattern");

    // GCC internal executables pattern: matches GCC's internal compiler phases
    // These are implementation details of GCC's compilation process that should be
    // routed to GccInterpreter for proper handling (typically to be ignored).
    // Examples: cc1, cc1plus, cc1obj, cc1objplus, collect2, lto1
    let gcc_internal_pattern = Regex::new(r"^(?:cc1(?:plus|obj|objplus)?|collect2|lto1)$")
        .expect("Invalid GCC internal regex pattern");

    // Clang pattern: matches clang, clang++, cross-compilation variants, and versioned variants
    let clang_pattern = Regex::new(r"^(?:[^/]*-)?clang(?:\+\+)?(?:-[\d.]+)?$")
        .expect("Invalid Clang regex pattern");

    // Fortran pattern: matches gfortran, flang, f77, f90, f95, f03, f08, cross-compilation variants, and versioned variants
    let fortran_pattern =
        Regex::new(r"^(?:[^/]*-)?(?:gfortran|flang|f77|f90|f95|f03|f08)(?:-[\d.]+)?$")
            .expect("Invalid Fortran regex pattern");

    // Intel Fortran pattern: matches ifort, ifx, and versioned variants
    let intel_fortran_pattern =
        Regex::new(r"^(?:ifort|ifx)(?:-[\d.]+)?$").expect("Invalid Intel Fortran regex pattern");

    // Cray Fortran pattern: matches crayftn, ftn
    let cray_fortran_pattern =
        Regex::new(r"^(?:crayftn|ftn)(?:-[\d.]+)?$").expect("Invalid Cray Fortran regex pattern");

    // CUDA pattern: matches nvcc, cross-compilation variants, and versioned variants
    let cuda_pattern =
        Regex::new(r"^(?:[^/]*-)?nvcc(?:-[\d.]+)?$").expect("Invalid CUDA regex pattern");

    // Wrapper pattern: matches ccache, distcc, sccache
    let wrapper_pattern =
        Regex::new(r"^(?:ccache|distcc|sccache)$").expect("Invalid wrapper regex pattern");

    vec![
        (CompilerType::Gcc, gcc_pattern),
        (CompilerType::Gcc, gcc_internal_pattern),
        (CompilerType::Clang, clang_pattern),
        (CompilerType::Flang, fortran_pattern),
        (CompilerType::IntelFortran, intel_fortran_pattern),
        (CompilerType::CrayFortran, cray_fortran_pattern),
        (CompilerType::Cuda, cuda_pattern),
        (CompilerType::Wrapper, wrapper_pattern),
    ]
});

/// A unified compiler recognizer that uses regex patterns
pub struct CompilerRecognizer {
    patterns: Vec<(CompilerType, Regex)>,
    hints: HashMap<PathBuf, CompilerType>,
    flags: HashMap<PathBuf, CompilerFlags>,
}

impl CompilerRecognizer {
    /// Creates a hint lookup table from compiler configuration.
    ///
    /// This method processes a slice of [`Compiler`] configurations and builds a mapping
    /// from filesystem paths to compiler types. This allows for explicit compiler type
    /// specification that overrides pattern-based recognition.
    ///
    /// # Arguments
    ///
    /// * `compilers` - A slice of [`Compiler`] configurations from which to extract hints
    ///
    /// # Returns
    ///
    /// A [`HashMap`] mapping canonicalized [`PathBuf`]s to their corresponding [`CompilerType`]s.
    /// All compilers that are not marked as `ignore = true` will be included in the mapping.
    ///
    /// # Compiler Type Resolution
    ///
    /// For each non-ignored compiler, the compiler type is determined as follows:
    /// 1. **Explicit `as_` field**: If the compiler has an `as_` field specified, that type is used
    /// 2. **Pattern matching**: If `as_` is `None`, the filename is matched against default patterns
    ///    (GCC, Clang, Fortran, Intel Fortran, Cray Fortran)
    /// 3. **Fallback**: If no pattern matches, defaults to [`CompilerType::Gcc`]
    ///
    /// # Path Canonicalization
    ///
    /// The method attempts to canonicalize each compiler path using [`PathBuf::canonicalize()`].
    /// If canonicalization fails (e.g., due to the path not existing), the original path
    /// is used instead. This helps with matching paths that may be specified differently
    /// but refer to the same executable.
    ///
    /// # Examples
    ///
    /// Given a configuration like:
    /// ```yaml
    /// compilers:
    ///   - path: /usr/bin/my-custom-gcc
    ///     as: gcc
    ///   - path: /opt/llvm/bin/clang++        # No 'as' field - will be guessed as Clang
    ///   - path: /usr/bin/unknown-compiler    # No 'as' field - will default to GCC
    ///   - path: /usr/bin/ignored-compiler
    ///     ignore: true
    /// ```
    ///
    /// This method would return a mapping containing entries for the first three compilers
    /// but exclude the fourth due to the `ignore` flag. The second compiler would be
    /// recognized as Clang through pattern matching, and the third would default to GCC.
    fn build_hints_map(compilers: &[Compiler]) -> HashMap<PathBuf, CompilerType> {
        let mut hints = HashMap::new();

        for compiler in compilers {
            // Skip ignored compilers
            if compiler.ignore {
                continue;
            }

            // Try to canonicalize the path for better matching
            let canonical_path = compiler
                .path
                .canonicalize()
                .unwrap_or_else(|_| compiler.path.clone());

            let compiler_type = if let Some(as_type) = compiler.as_ {
                // Use explicitly configured compiler type
                as_type
            } else {
                // Guess compiler type using default patterns
                let filename = compiler
                    .path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("");

                let guessed_type = DEFAULT_PATTERNS
                    .iter()
                    .find(|(_, pattern)| pattern.is_match(filename))
                    .map(|(compiler_type, _)| *compiler_type);

                // Fall back to GCC if no pattern matches
                guessed_type.unwrap_or(CompilerType::Gcc)
            };

            hints.insert(canonical_path, compiler_type);
        }

        hints
    }

    /// Creates a flag-rewrite lookup table from compiler configuration.
    ///
    /// Mirrors [`Self::build_hints_map`]'s path canonicalization, so a flag
    /// rewrite configured for a compiler is found regardless of whether the
    /// executable was invoked through the same path spelling.
    fn build_flags_map(compilers: &[Compiler]) -> HashMap<PathBuf, CompilerFlags> {
        let mut flags = HashMap::new();

        for compiler in compilers {
            if compiler.ignore {
                continue;
            }
            let Some(rewrite) = &compiler.flags else { continue };

            let canonical_path = compiler
                .path
                .canonicalize()
                .unwrap_or_else(|_| compiler.path.clone());

            flags.insert(canonical_path, rewrite.clone());
        }

        flags
    }

    /// Creates a new compiler recognizer with default patterns
    pub fn new() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.clone(),
            hints: Self::build_hints_map(&[]),
            flags: Self::build_flags_map(&[]),
        }
    }

    /// Creates a new compiler recognizer with configuration-based hints
    ///
    /// # Arguments
    ///
    /// * `compilers` - Slice of compiler configurations with optional type hints
    ///
    /// # Returns
    ///
    /// A new CompilerRecognizer that will prioritize configured hints over regex detection
    pub fn new_with_config(compilers: &[Compiler]) -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.clone(),
            hints: Self::build_hints_map(compilers),
            flags: Self::build_flags_map(compilers),
        }
    }

    /// Recognizes the compiler type from an executable path
    ///
    /// This function first checks for configured hints, then falls back to
    /// regex-based detection using the filename.
    ///
    /// # Arguments
    ///
    /// * `executable_path` - The path to the executable (can be relative or absolute)
    ///
    /// # Returns
    ///
    /// `Some(CompilerType)` if the executable is recognized, `None` otherwise
    pub fn recognize(&self, executable_path: &Path) -> Option<CompilerType> {
        // 1. Check configured hints first (by canonical path matching)
        if let Some(hint_type) = self.lookup_hint(executable_path) {
            return Some(hint_type);
        }

        // 2. Fall back to regex-based recognition
        self.recognize_by_regex(executable_path)
    }

    /// Looks up a hint for the given executable path
    ///
    /// Tries both the original path and its canonicalized version
    fn lookup_hint(&self, executable_path: &Path) -> Option<CompilerType> {
        // Try original path first
        if let Some(&compiler_type) = self.hints.get(executable_path) {
            return Some(compiler_type);
        }

        // Try canonicalized path
        if let Ok(canonical_path) = executable_path.canonicalize() {
            if let Some(&compiler_type) = self.hints.get(&canonical_path) {
                return Some(compiler_type);
            }
        }

        None
    }

    /// Looks up the configured flag rewrite for the given executable path.
    ///
    /// Tries both the original path and its canonicalized version, same as
    /// [`Self::lookup_hint`].
    pub(crate) fn lookup_flags(&self, executable_path: &Path) -> Option<&CompilerFlags> {
        if let Some(rewrite) = self.flags.get(executable_path) {
            return Some(rewrite);
        }

        if let Ok(canonical_path) = executable_path.canonicalize() {
            if let Some(rewrite) = self.flags.get(&canonical_path) {
                return Some(rewrite);
            }
        }

        None
    }

    /// Internal regex-based recognition
    ///
    /// This function ignores the directory path and only looks at the filename
    /// to determine the compiler type using regex patterns.
    fn recognize_by_regex(&self, executable_path: &Path) -> Option<CompilerType> {
        let filename = executable_path.file_name()?.to_str()?;
        // Strip a Windows ".exe" suffix (case-insensitive) so cross-platform
        // compiler names are recognized regardless of host.
        let filename = filename.strip_suffix(".exe").or_else(|| filename.strip_suffix(".EXE")).unwrap_or(filename);

        // Check each compiler pattern
        for (compiler_type, pattern) in &self.patterns {
            if pattern.is_match(filename) {
                return Some(*compiler_type);
            }
        }

        None
    }
}

impl Default for CompilerRecognizer {
    fn default() -> Self {
        Self::new()
    }
}
