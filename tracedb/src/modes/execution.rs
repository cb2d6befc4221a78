// SPDX-License-Identifier: GPL-3.0-or-later

use crate::args::BuildCommand;
use crate::intercept;
use crate::intercept::supervise::SuperviseError;
use crate::intercept::tcp::CollectorError;
use crate::intercept::{Cancellable, CancellableProducer, Consumer, Executor, Producer};
use crate::output::WriterError;
use crossbeam_channel::{bounded, unbounded};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;

/// Coordinates live command interception during build execution.
///
/// `Interceptor` manages the simultaneous execution of:
/// - Build command execution (via `Executor`)
/// - Command interception (via `CancellableProducer`)
/// - Event processing (via `Consumer`)
///
/// The interceptor ensures proper coordination between these components,
/// handling thread synchronization and error propagation.
pub struct Interceptor {
    producer: Arc<dyn CancellableProducer<intercept::Event, CollectorError>>,
    consumer: Box<dyn Consumer<intercept::Event, WriterError>>,
    build: Box<dyn Executor<SuperviseError>>,
}

impl Interceptor {
    /// Creates a new interceptor from its producer, consumer and build executor.
    pub fn new(
        producer: Arc<dyn CancellableProducer<intercept::Event, CollectorError>>,
        consumer: Box<dyn Consumer<intercept::Event, WriterError>>,
        build: Box<dyn Executor<SuperviseError>>,
    ) -> Self {
        Self { producer, consumer, build }
    }

    /// Runs live command interception for the given build command.
    ///
    /// # Arguments
    /// * `command` - The build command to execute with interception
    ///
    /// # Returns
    /// * `Ok(ExitCode::SUCCESS)` - All operations completed successfully
    /// * `Err(RuntimeError)` - An error occurred in any component
    pub fn run(self, command: BuildCommand) -> Result<ExitCode, RuntimeError> {
        let (sender, receiver) = unbounded::<intercept::Event>();

        let producer_thread = {
            let producer = Arc::clone(&self.producer);
            std::thread::spawn(move || producer.produce(sender))
        };

        let consumer_thread = {
            let consumer = self.consumer;
            std::thread::spawn(move || consumer.consume(receiver))
        };

        let exit_status = self.build.run(command)?;

        self.producer.cancel()?;

        // Handle the producer thread result
        producer_thread
            .join()
            .map_err(|_| RuntimeError::Thread("Source thread panicked"))?
            .map_err(RuntimeError::Producer)?;

        // Handle the consumer thread result
        consumer_thread
            .join()
            .map_err(|_| RuntimeError::Thread("Consumer thread panicked"))?
            .map_err(RuntimeError::Consumer)?;

        // The exit code is not always available. When the process is killed by a signal,
        // the exit code is not available. In this case, we return the `FAILURE` exit code.
        let exit_code = exit_status
            .code()
            .map(|code| ExitCode::from(code as u8))
            .unwrap_or(ExitCode::FAILURE);

        Ok(exit_code)
    }
}

/// Replays previously captured intercept events.
///
/// `Replayer` processes stored intercept events without executing a build command.
/// This is useful for:
/// - Re-analyzing previous builds with different configurations
/// - Testing semantic analysis changes
/// - Generating compilation databases from archived event data
pub struct Replayer {
    source: Box<dyn Producer<intercept::Event, CollectorError>>,
    consumer: Box<dyn Consumer<intercept::Event, WriterError>>,
}

impl Replayer {
    /// Creates a new replayer from its event source and consumer.
    pub fn new(
        source: Box<dyn Producer<intercept::Event, CollectorError>>,
        consumer: Box<dyn Consumer<intercept::Event, WriterError>>,
    ) -> Self {
        Self { source, consumer }
    }

    /// Replays stored intercept events through the processing pipeline.
    ///
    /// # Returns
    /// * `Ok(ExitCode::SUCCESS)` - All events were successfully replayed
    /// * `Err(RuntimeError)` - An error occurred during replay (most likely IO error)
    pub fn run(self) -> Result<ExitCode, RuntimeError> {
        let (sender, receiver) = bounded::<intercept::Event>(10);

        let source_thread = {
            let source = self.source;
            std::thread::spawn(move || source.produce(sender))
        };

        let consumer_thread = {
            let consumer = self.consumer;
            std::thread::spawn(move || consumer.consume(receiver))
        };

        // Handle the source thread result
        source_thread
            .join()
            .map_err(|_| RuntimeError::Thread("Source thread panicked"))?
            .map_err(RuntimeError::Producer)?;

        // Handle the consumer thread result
        consumer_thread
            .join()
            .map_err(|_| RuntimeError::Thread("Consumer thread panicked"))?
            .map_err(RuntimeError::Consumer)?;

        Ok(ExitCode::SUCCESS)
    }
}

/// Errors that can occur during event processing or running the build.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Producer error: {0}")]
    Producer(#[from] CollectorError),

    #[error("Consumer error: {0}")]
    Consumer(#[from] WriterError),

    #[error("Executor error: {0}")]
    Executor(#[from] SuperviseError),

    #[error("Thread error: {0}")]
    Thread(&'static str),
}
