// SPDX-License-Identifier: GPL-3.0-or-later

//! The module contains the implementation of the TCP collector and reporter.

use super::reporter::{Reporter, ReporterError};
use super::{Cancellable, CancellableProducer, Event, Producer};
use crossbeam_channel::Sender;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// The serializer for events to transmit over the network.
///
/// The events are serialized using TLV (Type-Length-Value) format.
/// The type is always 0, the length is a 4-byte big-endian integer,
/// and the value is the JSON representation of the event.
struct EventWireSerializer;

impl EventWireSerializer {
    /// Read an event from a reader using TLV format.
    fn read(reader: &mut impl Read) -> Result<Event, ReceivingError> {
        let mut length_bytes = [0; 4];
        reader.read_exact(&mut length_bytes)?;
        let length = u32::from_be_bytes(length_bytes) as usize;

        let mut buffer = vec![0; length];
        reader.read_exact(&mut buffer)?;
        let event = serde_json::from_slice(buffer.as_ref())?;

        Ok(event)
    }

    /// Write an event to a writer using TLV format.
    fn write(writer: &mut impl Write, event: Event) -> Result<u32, ReporterError> {
        let serialized_event = serde_json::to_string(&event)?;
        let bytes = serialized_event.into_bytes();
        let length = bytes.len() as u32;

        writer.write_all(&length.to_be_bytes())?;
        writer.write_all(&bytes)?;

        Ok(length)
    }
}

/// Errors that can occur in the collector.
#[derive(Error, Debug)]
pub enum ReceivingError {
    #[error("Receiving event failed with IO error: {0}")]
    Network(#[from] std::io::Error),
    #[error("Receiving event failed with serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that can occur while the collector service is running.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Collecting events failed with IO error: {0}")]
    Network(#[from] std::io::Error),
    #[error("Collecting events failed with internal IPC error: {0}")]
    Channel(String),
}

/// Represents a TCP event collector.
pub struct CollectorOnTcp {
    shutdown: Arc<AtomicBool>,
    listener: TcpListener,
}

impl CollectorOnTcp {
    /// Creates a new TCP event collector.
    ///
    /// The collector listens to a random port on the loopback interface.
    /// The address of the collector can be obtained by the `address` method.
    pub fn new() -> Result<(Self, SocketAddr), std::io::Error> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let address = listener.local_addr()?;

        Ok((Self { shutdown, listener }, address))
    }
}

impl Producer<Event, CollectorError> for CollectorOnTcp {
    /// Single-threaded implementation of the collector.
    ///
    /// The collector listens to the TCP port and accepts incoming connections.
    /// When a connection is accepted, the collector reads the events from the
    /// connection and sends them to the destination channel.
    fn produce(&self, destination: Sender<Event>) -> Result<(), CollectorError> {
        for stream in self.listener.incoming() {
            // This has to be the first thing to do, to implement the stop method!
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            match stream {
                Ok(mut connection) => {
                    // ... (process the connection in a separate thread or task)
                    let event = EventWireSerializer::read(&mut connection);
                    match event {
                        Ok(event) => {
                            // Send the event to the destination channel
                            destination
                                .send(event)
                                .map_err(|err| CollectorError::Channel(err.to_string()))?;
                        }
                        Err(err) => {
                            // Log the error and continue to the next connection
                            log::error!("Failed to read event: {err}");
                        }
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // No new connection available, continue checking for shutdown
                    continue;
                }
                Err(err) => {
                    log::error!("Error while reading the socket: {err}");
                    break;
                }
            }
        }
        Ok(())
    }
}

impl Cancellable<CollectorError> for CollectorOnTcp {
    /// Stops the collector by flipping the shutdown flag and connecting to the collector.
    ///
    /// The collector is stopped when the `produce` method sees the shutdown flag.
    /// To signal the collector to stop, we connect to the collector to unblock the
    /// `accept` call to check the shutdown flag.
    fn cancel(&self) -> Result<(), CollectorError> {
        self.shutdown.store(true, Ordering::Relaxed);

        let address = self.listener.local_addr()?;
        let _ = TcpStream::connect(address).map_err(CollectorError::Network)?;
        Ok(())
    }
}

impl CancellableProducer<Event, CollectorError> for CollectorOnTcp {}

/// Represents a TCP event reporter.
pub struct ReporterOnTcp {
    destination: String,
}

impl ReporterOnTcp {
    /// Creates a new TCP reporter instance.
    ///
    /// It does not open the TCP connection yet. Stores the destination
    /// address and creates a unique reporter id.
    pub fn new(destination: String) -> Self {
        Self { destination }
    }
}

impl Reporter for ReporterOnTcp {
    /// Sends an event to the remote collector.
    ///
    /// The event is wrapped in an envelope and sent to the remote collector.
    /// The TCP connection is opened and closed for each event.
    fn report(&self, event: Event) -> Result<(), ReporterError> {
        let mut socket =
            TcpStream::connect(self.destination.clone()).map_err(ReporterError::Network)?;
        EventWireSerializer::write(&mut socket, event)?;

        Ok(())
    }
}
