//! Streaming decoder for pulse-oximeter serial data.
//!
//! Pulseox turns the unframed byte stream of a Nonin-style pulse oximeter
//! into complete, decoded measurement packets: SpO2, pulse rate,
//! plethysmographic samples and device status.
//!
//! # Features
//!
//! - **Self-synchronising**: recovers frame alignment after noise or dropped bytes
//! - **Sentinel-aware decoding**: device "no value" markers are kept apart from
//!   fields the decoder could not reach
//! - **Async sessions**: one tokio worker per connection with cancellation and backpressure
//! - **Any transport**: serial devices, sockets, pipes or in-memory buffers
//!
//! # Architecture
//!
//! Bytes flow from a [`ByteSource`] through the [`Synchronizer`] (5-byte sliding
//! window, checksum validation, packet assembly) to a [`PacketHandler`]. A
//! [`Session`] owns the worker running that loop.
//!
//! ## Example (serial device)
//!
//! ```rust,no_run
//! use pulseox::{PulseOx, SessionConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> pulseox::Result<()> {
//!     let config = SessionConfig { port: "/dev/rfcomm0".to_string(), ..SessionConfig::default() };
//!     let (session, mut packets) = PulseOx::connect_serial(&config)?;
//!
//!     while let Some(packet) = packets.next().await {
//!         println!("SpO2 {} HR {}", packet.spo2_average(), packet.hr_average());
//!     }
//!
//!     session.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Example (synchronous decoding)
//!
//! ```rust
//! use pulseox::Synchronizer;
//!
//! let mut sync = Synchronizer::new();
//! let packets = sync.feed(&[0x81, 0x00, 0x64, 0x05, 0xEA]);
//! assert!(packets.is_empty());
//! assert!(sync.has_open_packet());
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod synchronizer;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Worker and delivery
pub mod driver;
pub mod handler;
pub mod session;
pub mod source;
pub mod sources;
pub mod stream;

// Core exports
pub use config::SessionConfig;
pub use error::*;
pub use synchronizer::{SyncStats, Synchronizer};
pub use types::*;

// Pipeline exports
pub use driver::{Driver, DriverHandle, DriverOptions};
pub use handler::{FnHandler, PacketHandler, handler_fn};
pub use session::Session;
pub use source::ByteSource;
pub use sources::{ReaderSource, SerialSource};
pub use stream::PacketStream;

/// Unified entry point for oximeter sessions.
///
/// Both constructors return the running [`Session`] together with the
/// [`PacketStream`] its packets arrive on.
///
/// ## In-memory stream
/// ```rust
/// use pulseox::{PulseOx, SessionConfig};
/// use futures::StreamExt;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> pulseox::Result<()> {
///     let bytes: &'static [u8] = &[0x81, 0x00, 0x64, 0x05, 0xEA];
///     let (session, packets) = PulseOx::from_reader(bytes, &SessionConfig::default())?;
///
///     // One frame is not a packet
///     assert_eq!(packets.count().await, 0);
///     session.stop().await?;
///     Ok(())
/// }
/// ```
pub struct PulseOx;

impl PulseOx {
    /// Open a serial oximeter.
    ///
    /// Opens `config.port`, writes the configured data mode to the device
    /// and starts decoding.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid or names no port
    /// - The device cannot be opened
    /// - Writing the data mode command fails
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect_serial(config: &SessionConfig) -> Result<(Session, PacketStream)> {
        let (tx, stream) = PacketStream::channel(config.channel_capacity);
        let session = Session::open_serial(config, tx)?;
        Ok((session, stream))
    }

    /// Decode from any async reader (socket, pipe, byte slice).
    ///
    /// No configuration command is written; the reader is assumed to
    /// already carry the device's output.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_reader<R>(reader: R, config: &SessionConfig) -> Result<(Session, PacketStream)>
    where
        R: tokio::io::AsyncRead + Unpin + Send + 'static,
    {
        let source = ReaderSource::with_capacity(reader, config.read_buffer);
        Session::channel(source, config)
    }
}
