// SPDX-License-Identifier: GPL-3.0-or-later

use crate::environment;
use anyhow::{Context as AnyhowContext, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Application context containing runtime environment information.
///
/// This struct captures all the environmental context needed by tracedb at startup,
/// including system information, environment variables, and file system state.
/// This allows for pure validation and configuration phases without additional
/// I/O operations.
#[derive(Debug, Clone)]
pub struct Context {
    /// Path to the current tracedb executable
    pub current_executable: PathBuf,
    /// Current working directory when tracedb was invoked
    pub current_directory: PathBuf,
    /// All environment variables at startup
    pub environment: HashMap<String, String>,
}

impl Context {
    /// Capture the current application context.
    ///
    /// This function performs I/O operations to gather system state and should
    /// be called early in the application lifecycle, before any validation phase.
    pub fn capture() -> Result<Self> {
        let current_executable =
            env::current_exe().with_context(|| "Failed to get current executable path")?;

        let current_directory =
            env::current_dir().with_context(|| "Failed to get current working directory")?;

        let environment = env::vars().collect::<HashMap<String, String>>();

        Ok(Context {
            current_executable,
            current_directory,
            environment,
        })
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Application Context:")?;
        writeln!(
            f,
            "  Current Executable: {}",
            self.current_executable.display()
        )?;
        writeln!(
            f,
            "  Current Directory: {}",
            self.current_directory.display()
        )?;
        writeln!(
            f,
            "  Total Environment Variables: {} entries",
            self.environment.len()
        )?;

        // Display relevant environment variables by iterating directly
        writeln!(f, "  Relevant Environment Variables:")?;
        for (key, value) in &self.environment {
            if environment::relevant_env(key) {
                writeln!(f, "    {}={}", key, value)?;
            }
        }

        Ok(())
    }
}
