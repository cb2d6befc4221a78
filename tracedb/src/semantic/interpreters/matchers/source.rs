// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashSet;
use std::path::Path;

#[cfg(target_family = "unix")]
pub fn looks_like_a_source_file(argument: &str) -> bool {
    // not a command line flag
    if argument.starts_with('-') {
        return false;
    }
    if let Some((_, extension)) = argument.rsplit_once('.') {
        return SOURCE_EXTENSIONS.contains(extension);
    }
    false
}

#[cfg(target_family = "windows")]
pub fn looks_like_a_source_file(argument: &str) -> bool {
    // not a command line flag
    if argument.starts_with('/') {
        return false;
    }
    if let Some((_, extension)) = argument.rsplit_once('.') {
        return SOURCE_EXTENSIONS.contains(extension);
    }
    false
}

/// Checks if the given path refers to a binary file (object file or library).
///
/// Binary files are not compilable source files and are typically used as
/// inputs to the linker rather than the compiler.
///
/// # Supported extensions
/// - Object files: `.o`
/// - Static libraries: `.a`, `.lib`
/// - Dynamic libraries: `.so`, `.dylib`, `.dll`
pub fn is_binary_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        let ext_str = ext.to_string_lossy().to_lowercase();
        BINARY_EXTENSIONS.contains(ext_str.as_str())
    } else {
        false
    }
}

#[rustfmt::skip]
static SOURCE_EXTENSIONS: std::sync::LazyLock<HashSet<&'static str>> = std::sync::LazyLock::new(|| {
    HashSet::from([
        // header files
        "h", "hh", "H", "hp", "hxx", "hpp", "HPP", "h++", "tcc",
        // C
        "c", "C",
        // C++
        "cc", "CC", "c++", "C++", "cxx", "cpp", "cp",
        // CUDA
        "cu",
        // ObjectiveC
        "m", "mi", "mm", "M", "mii",
        // Preprocessed
        "i", "ii",
        // Assembly
        "s", "S", "sx", "asm",
        // Fortran
        "f", "for", "ftn",
        "F", "FOR", "fpp", "FPP", "FTN",
        "f90", "f95", "f03", "f08",
        "F90", "F95", "F03", "F08",
        // go
        "go",
        // brig
        "brig",
        // D
        "d", "di", "dd",
        // Ada
        "ads", "abd",
    ])
});

#[rustfmt::skip]
static BINARY_EXTENSIONS: std::sync::LazyLock<HashSet<&'static str>> = std::sync::LazyLock::new(|| {
    HashSet::from([
        // Object files
        "o",
        // Static libraries
        "a", "lib",
        // Dynamic/shared libraries
        "so", "dylib", "dll",
    ])
});
