//! Byte source over a serial device
//!
//! `serialport` only offers blocking reads, so a dedicated OS thread owns the
//! reading half of the port and forwards chunks over a bounded channel. The
//! async side hands bytes out one at a time. Read timeouts on the thread are
//! expected while the device is quiet and are retried without surfacing.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use serialport::SerialPort;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::config::SessionConfig;
use crate::source::ByteSource;
use crate::{OximeterError, Result};

/// Chunks buffered between the reader thread and the async side.
const CHUNK_CHANNEL_CAPACITY: usize = 16;

type Chunk = io::Result<Vec<u8>>;

/// Byte source reading from a serial device on a background thread.
pub struct SerialSource {
    /// Device path, kept for error context
    port_name: String,

    /// Chunks from the reader thread
    chunks: mpsc::Receiver<Chunk>,

    /// Chunk currently being handed out
    current: Vec<u8>,

    /// Next unread position in `current`
    pos: usize,

    /// Tells the reader thread to exit
    stop: Arc<AtomicBool>,
}

impl SerialSource {
    /// Open the device named in `config` for reading.
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let port = open_port(config)?;
        Self::from_port(port, config.read_buffer)
    }

    /// Take over an already-open port.
    ///
    /// The port's own timeout governs how often the reader thread checks
    /// whether it should exit.
    pub fn from_port(port: Box<dyn SerialPort>, read_buffer: usize) -> Result<Self> {
        let port_name = port.name().unwrap_or_else(|| "<unnamed>".to_string());
        let (tx, rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));

        let thread_stop = Arc::clone(&stop);
        let thread_name = port_name.clone();
        thread::Builder::new()
            .name(format!("pulseox-serial-{}", port_name))
            .spawn(move || read_loop(port, tx, thread_stop, read_buffer.max(1), thread_name))
            .map_err(|e| OximeterError::io_error("spawning serial reader thread", e))?;

        info!("Serial source started on {}", port_name);
        Ok(Self { port_name, chunks: rx, current: Vec::new(), pos: 0, stop })
    }

    /// Device path this source reads from.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Open and configure a serial device as described by `config`.
pub fn open_port(config: &SessionConfig) -> Result<Box<dyn SerialPort>> {
    if config.port.is_empty() {
        return Err(OximeterError::config_error("serial port path is empty"));
    }

    debug!("Opening serial port {} at {} baud", config.port, config.baud_rate);
    serialport::new(&config.port, config.baud_rate)
        .timeout(config.read_timeout())
        .open()
        .map_err(|e| OximeterError::serial_error(&config.port, e))
}

fn read_loop(
    mut port: Box<dyn SerialPort>,
    tx: mpsc::Sender<Chunk>,
    stop: Arc<AtomicBool>,
    read_buffer: usize,
    port_name: String,
) {
    let mut buf = vec![0u8; read_buffer];

    while !stop.load(Ordering::Relaxed) {
        let chunk = match port.read(&mut buf) {
            Ok(0) => {
                debug!("Serial port {} reported end of stream", port_name);
                break;
            }
            Ok(n) => Ok(buf[..n].to_vec()),
            Err(e) if is_quiet_line(e.kind()) => continue,
            Err(e) => Err(e),
        };

        if tx.blocking_send(chunk).is_err() {
            break;
        }
    }

    debug!("Serial reader thread for {} exiting", port_name);
}

/// Read failures that only mean the device had nothing to say yet.
fn is_quiet_line(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted)
}

#[async_trait::async_trait]
impl ByteSource for SerialSource {
    async fn next_byte(&mut self) -> Result<Option<u8>> {
        while self.pos == self.current.len() {
            // `recv` is cancel-safe
            match self.chunks.recv().await {
                Some(Ok(chunk)) => {
                    trace!("Serial chunk of {} bytes", chunk.len());
                    self.current = chunk;
                    self.pos = 0;
                }
                Some(Err(e)) => {
                    return Err(OximeterError::io_error(
                        format!("reading serial port '{}'", self.port_name),
                        e,
                    ));
                }
                None => return Ok(None),
            }
        }

        let byte = self.current[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }
}

impl Drop for SerialSource {
    fn drop(&mut self) {
        // The thread notices on its next read timeout or failed send
        self.stop.store(true, Ordering::Relaxed);
    }
}
