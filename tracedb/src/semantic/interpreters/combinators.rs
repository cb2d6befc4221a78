// SPDX-License-Identifier: GPL-3.0-or-later

use super::super::{Command, Execution, Interpreter};

/// Represents a set of interpreters, where any of them can recognize the semantic.
/// The evaluation is done in the order of the interpreters. The first one which
/// recognizes the semantic will be returned as result.
pub(super) struct Any {
    interpreters: Vec<Box<dyn Interpreter>>,
}

impl Any {
    pub(super) fn new(tools: Vec<Box<dyn Interpreter>>) -> Self {
        Self { interpreters: tools }
    }
}

impl Interpreter for Any {
    fn recognize(&self, x: &Execution) -> Option<Command> {
        for tool in &self.interpreters {
            match tool.recognize(x) {
                None => continue,
                result => return result,
            }
        }
        None
    }
}

/// Wraps an interpreter and logs every execution it is asked to recognize.
///
/// This is meant to sit at the top of the interpreter chain, so the log carries
/// one line per intercepted execution regardless of which inner tool ends up
/// recognizing it.
pub(super) struct InputLogger<T: Interpreter> {
    interpreter: T,
}

impl<T: Interpreter> InputLogger<T> {
    pub(super) fn new(interpreter: T) -> Self {
        Self { interpreter }
    }
}

impl<T: Interpreter> Interpreter for InputLogger<T> {
    fn recognize(&self, execution: &Execution) -> Option<Command> {
        log::debug!(
            "recognizing execution: {:?} {:?}",
            execution.executable,
            execution.arguments
        );
        self.interpreter.recognize(execution)
    }
}

/// Wraps an interpreter and logs a message with the given reason whenever the
/// inner tool recognizes (and so removes from further processing) an execution.
pub(super) struct OutputLogger<T: Interpreter> {
    interpreter: T,
    reason: &'static str,
}

impl<T: Interpreter> OutputLogger<T> {
    pub(super) fn new(interpreter: T, reason: &'static str) -> Self {
        Self { interpreter, reason }
    }
}

impl<T: Interpreter> Interpreter for OutputLogger<T> {
    fn recognize(&self, execution: &Execution) -> Option<Command> {
        let result = self.interpreter.recognize(execution);
        if result.is_some() {
            log::debug!("{}: {:?}", self.reason, execution.executable);
        }
        result
    }
}
