// SPDX-License-Identifier: GPL-3.0-or-later

//! This module provides the main entry point for creating interpreters to
//! recognize compiler calls. Based on the configuration, it sets up the
//! interpreter chain to include or exclude specific compilers.

mod archiver;
mod combinators;
pub mod compilers;
mod ignore;
mod linker;
mod matchers;

use super::Interpreter;
use crate::config;

use archiver::ArInterpreter;
use combinators::{Any, InputLogger, OutputLogger};
use compilers::CompilerInterpreter;
use ignore::IgnoreByPath;
use linker::LinkerInterpreter;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterpreterConfigError {
    // #[error("Compiler filter configuration error: {0}")]
    // CompilerFilter(#[from] CompilerFilterConfigurationError),
}

/// Creates an interpreter to recognize the compiler calls.
///
/// Using the configuration we can define which compilers to include and exclude.
/// The interpreter chain is built as follows:
/// 1. Generic programs to exclude
/// 2. Compilers specified to exclude
/// 3. All other compilers to include
pub fn create<'a>(config: &config::Main) -> Result<impl Interpreter + 'a, InterpreterConfigError> {
    // Build the base interpreter chain
    let mut interpreters: Vec<Box<dyn Interpreter>> = vec![
        // ignore executables which are not compilers,
        Box::new(OutputLogger::new(
            IgnoreByPath::default(),
            "coreutils_to_ignore",
        )),
    ];

    let compilers_to_exclude = compilers_to_exclude(config);
    if !compilers_to_exclude.is_empty() {
        let tool = OutputLogger::new(
            IgnoreByPath::from(&compilers_to_exclude),
            "compilers_to_ignore",
        );
        interpreters.push(Box::new(tool));
    }

    // Add compiler interpreter that handles recognition and delegation
    let tool = CompilerInterpreter::new_with_config(&config.compilers);
    interpreters.push(Box::new(tool));

    // Tools that are not compiler drivers but still participate in the build:
    // a direct linker invocation, or archive maintenance.
    interpreters.push(Box::new(LinkerInterpreter::new()));
    interpreters.push(Box::new(ArInterpreter::new()));

    Ok(InputLogger::new(Any::new(interpreters)))
}

fn compilers_to_exclude(config: &config::Main) -> Vec<PathBuf> {
    config
        .compilers
        .iter()
        .filter(|compiler| compiler.ignore)
        .map(|compiler| compiler.path.clone())
        .collect()
}
