// SPDX-License-Identifier: GPL-3.0-or-later

//! Session management and environment doctoring for the preload library.
//!
//! This module handles:
//! - Capturing environment variables at library load time
//! - Storing session state (preload path, destination address)
//! - "Doctoring" environments to ensure child processes continue interception
//!
//! The environment doctoring ensures that `LD_PRELOAD` (or `DYLD_INSERT_LIBRARIES`
//! on macOS), `INTERCEPT_SESSION_LIBRARY` and `INTERCEPT_REPORT_DESTINATION` are
//! preserved across exec calls, even if the build system attempts to clear them.

use std::ffi::{CStr, CString};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracedb::environment::{KEY_DESTINATION, KEY_SESSION_LIBRARY};
#[cfg(not(target_os = "macos"))]
use tracedb::environment::KEY_OS__PRELOAD_PATH;
#[cfg(target_os = "macos")]
use tracedb::environment::{KEY_OS__MACOS_FLAT_NAMESPACE, KEY_OS__MACOS_PRELOAD_PATH};
use tracedb::intercept::environment::{PreloadState, insert_to_path};
use libc::{c_char, c_int};

/// The preload environment variable key for the current platform.
#[cfg(target_os = "macos")]
pub const PRELOAD_KEY: &str = KEY_OS__MACOS_PRELOAD_PATH;
#[cfg(not(target_os = "macos"))]
pub const PRELOAD_KEY: &str = KEY_OS__PRELOAD_PATH;

/// Global session storage, initialized once from the C constructor.
pub static SESSION: OnceLock<PreloadState> = OnceLock::new();

/// Walks a C-style envp array and returns the value for `key`, if present.
///
/// # Safety
/// The `envp` pointer must be a valid null-terminated array of null-terminated
/// C strings in "KEY=VALUE" format, or null.
unsafe fn lookup_envp(envp: *const *const c_char, key: &str) -> Option<String> {
    if envp.is_null() {
        return None;
    }

    let mut ptr = envp;
    while !unsafe { (*ptr).is_null() } {
        let cstr = unsafe { CStr::from_ptr(*ptr) };
        if let Ok(key_and_value) = cstr.to_str()
            && let Some((found_key, value)) = key_and_value.split_once('=')
            && found_key == key
        {
            return Some(value.to_string());
        }
        ptr = unsafe { ptr.add(1) };
    }

    None
}

/// Reconstructs the preload session state from the two plain environment
/// variables that carry it (`INTERCEPT_SESSION_LIBRARY`, `INTERCEPT_REPORT_DESTINATION`).
///
/// # Safety
/// The `envp` pointer must be a valid null-terminated array of null-terminated
/// C strings in "KEY=VALUE" format, or null.
///
/// # Returns
/// - `Some(PreloadState)` if both variables are present and the destination parses
/// - `None` otherwise
unsafe fn from_envp(envp: *const *const c_char) -> Option<PreloadState> {
    if envp.is_null() {
        return None;
    }

    let library = unsafe { lookup_envp(envp, KEY_SESSION_LIBRARY) }?;
    let destination = unsafe { lookup_envp(envp, KEY_DESTINATION) }?;
    let destination: SocketAddr = destination.parse().ok()?;

    Some(PreloadState { destination, library: PathBuf::from(library) })
}

/// Checks if the passed environment is still aligned with the expected
/// preload mode environment settings.
///
/// This walks through the C pointers directly and checks if the session
/// library, the report destination and the preload variable are all set
/// as expected. Returns true if none of them have changed.
pub unsafe fn in_session(state: PreloadState, envp: *const *const c_char) -> bool {
    if envp.is_null() {
        return false;
    }

    let mut library_matches = false;
    let mut destination_matches = false;
    let mut preload_matches = false;

    let mut ptr = envp;
    while !unsafe { (*ptr).is_null() } {
        let cstr = unsafe { CStr::from_ptr(*ptr) };
        if let Ok(key_and_value) = cstr.to_str()
            && let Some((key, value)) = key_and_value.split_once('=')
        {
            if key == KEY_SESSION_LIBRARY {
                library_matches = PathBuf::from(value) == state.library;
            } else if key == KEY_DESTINATION {
                destination_matches = value.parse::<SocketAddr>().ok() == Some(state.destination);
            } else if key == PRELOAD_KEY {
                preload_matches = {
                    // we check if our library is at the first position
                    let paths = std::env::split_paths(value);
                    paths.into_iter().next() == Some(state.library.clone())
                };
            }
        }
        ptr = unsafe { ptr.add(1) };
    }

    library_matches && destination_matches && preload_matches
}

/// A doctored environment that owns its strings and can provide a C-style envp.
///
/// This struct manages the memory for environment strings and provides a
/// null-terminated array of pointers suitable for passing to exec functions.
pub struct DoctoredEnvironment {
    /// The environment strings in "KEY=VALUE" format
    /// This field is kept to ensure the CStrings remain valid while ptrs references them.
    #[allow(dead_code)]
    strings: Vec<CString>,
    /// Pointers to the strings, plus a null terminator
    ptrs: Vec<*const c_char>,
}

impl DoctoredEnvironment {
    /// Private constructor that creates a DoctoredEnvironment from a vector of CStrings.
    ///
    /// This builds the pointer array from the strings.
    fn from_strings(strings: Vec<CString>) -> Self {
        let mut ptrs: Vec<*const c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        ptrs.push(std::ptr::null());

        DoctoredEnvironment { strings, ptrs }
    }

    /// Create a doctored environment from a preload state and the received environment.
    ///
    /// Returns an error if any key or value contains a null byte.
    ///
    /// The method is called when `in_session` was returning false, therefore the
    /// environment is not aligned with the preload mode settings. The result environment
    /// will be aligned with the preload mode settings based on the state.
    pub fn from_envp(state: PreloadState, envp: *const *const c_char) -> Result<Self, c_int> {
        use std::ffi::CString;

        let mut strings = Vec::new();
        let mut original_preload_value = String::new();

        // First, copy existing environment variables, skipping ones we'll set ourselves
        if !envp.is_null() {
            let mut ptr = envp;
            while !unsafe { (*ptr).is_null() } {
                let cstr = unsafe { CStr::from_ptr(*ptr) };
                if let Ok(key_and_value) = cstr.to_str()
                    && let Some((key, value)) = key_and_value.split_once('=')
                {
                    #[cfg(target_os = "macos")]
                    let dominated_by_tracedb = key == KEY_SESSION_LIBRARY
                        || key == KEY_DESTINATION
                        || key == PRELOAD_KEY
                        || key == KEY_OS__MACOS_FLAT_NAMESPACE;
                    #[cfg(not(target_os = "macos"))]
                    let dominated_by_tracedb =
                        key == KEY_SESSION_LIBRARY || key == KEY_DESTINATION || key == PRELOAD_KEY;

                    if key == PRELOAD_KEY {
                        // Save the original preload value for later doctoring
                        original_preload_value = value.to_string();
                    }

                    if !dominated_by_tracedb {
                        // Keep other variables as-is
                        strings.push(CString::new(key_and_value).map_err(|_| libc::EINVAL)?);
                    }
                }
                ptr = unsafe { ptr.add(1) };
            }
        }

        // Add the session library and destination as plain variables
        let library_entry =
            format!("{}={}", KEY_SESSION_LIBRARY, state.library.to_string_lossy());
        strings.push(CString::new(library_entry).map_err(|_| libc::EINVAL)?);

        let destination_entry = format!("{}={}", KEY_DESTINATION, state.destination);
        strings.push(CString::new(destination_entry).map_err(|_| libc::EINVAL)?);

        // Add PRELOAD_KEY with the library path inserted at front
        let preload_value =
            insert_to_path(&original_preload_value, &state.library).map_err(|_| libc::EINVAL)?;
        let preload_entry = format!("{}={}", PRELOAD_KEY, preload_value);
        strings.push(CString::new(preload_entry).map_err(|_| libc::EINVAL)?);

        // On macOS, add the flat namespace flag
        #[cfg(target_os = "macos")]
        {
            let flat_namespace_entry = format!("{}=1", KEY_OS__MACOS_FLAT_NAMESPACE);
            strings.push(CString::new(flat_namespace_entry).map_err(|_| libc::EINVAL)?);
        }

        Ok(Self::from_strings(strings))
    }

    /// Get a pointer to the envp array suitable for passing to exec functions.
    pub fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }
}

/// Initialize the global session from a C-style envp array.
///
/// Returns the destination address if present (for reporter initialization).
///
/// # Safety
/// The `envp` pointer must be a valid null-terminated array of null-terminated
/// C strings in "KEY=VALUE" format, or null.
pub unsafe fn init_session_from_envp(envp: *const *const c_char) -> Option<SocketAddr> {
    if envp.is_null() {
        log::info!("session init failed: environ is null pointer");
        return None;
    }

    match unsafe { from_envp(envp) } {
        None => {
            log::info!("session init failed: variables not found");
            None
        }
        Some(session) => {
            let destination = session.destination;
            let _ = SESSION.set(session);

            Some(destination)
        }
    }
}
