//! Decoding sessions
//!
//! A [`Session`] is one connection's worth of decoding: it owns the worker
//! task, its cancellation token and, for serial links, the port's write half.
//! Every connection gets a fresh session; a stopped session cannot be
//! restarted.

use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::driver::{Driver, DriverHandle, DriverOptions};
use crate::handler::PacketHandler;
use crate::source::ByteSource;
use crate::sources::SerialSource;
use crate::sources::serial::open_port;
use crate::stream::PacketStream;
use crate::synchronizer::SyncStats;
use crate::types::DataMode;
use crate::{OximeterError, Result};

/// A running decoder bound to one byte source.
pub struct Session {
    /// Worker; `None` once stopped
    worker: Option<DriverHandle>,

    /// Write half of the serial port, if the session owns one
    writer: Option<Box<dyn SerialPort>>,

    /// Mode last written to the device
    data_mode: Option<DataMode>,
}

impl Session {
    /// Start decoding `source`, delivering packets to `handler`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S, H>(source: S, handler: H, config: &SessionConfig) -> Result<Self>
    where
        S: ByteSource,
        H: PacketHandler,
    {
        config.validate()?;
        let worker = Driver::spawn(source, handler, DriverOptions::from_config(config));
        info!("Decoding session started");
        Ok(Self { worker: Some(worker), writer: None, data_mode: None })
    }

    /// Start decoding `source` into a bounded channel.
    pub fn channel<S>(source: S, config: &SessionConfig) -> Result<(Self, PacketStream)>
    where
        S: ByteSource,
    {
        let (tx, stream) = PacketStream::channel(config.channel_capacity);
        let session = Self::spawn(source, tx, config)?;
        Ok((session, stream))
    }

    /// Open the configured serial device, select its data mode and start decoding.
    pub fn open_serial<H>(config: &SessionConfig, handler: H) -> Result<Self>
    where
        H: PacketHandler,
    {
        config.validate()?;

        let mut port = open_port(config)?;
        write_data_mode(port.as_mut(), config.data_mode, &config.port)?;

        let writer = port.try_clone().map_err(|e| OximeterError::serial_error(&config.port, e))?;
        let source = SerialSource::from_port(port, config.read_buffer)?;

        let mut session = Self::spawn(source, handler, config)?;
        session.writer = Some(writer);
        session.data_mode = Some(config.data_mode);
        info!("Serial session on {} in mode {}", config.port, config.data_mode);
        Ok(session)
    }

    /// Switch the device to another data mode.
    ///
    /// Only sessions opened with [`Session::open_serial`] have a device to write to.
    pub fn set_data_mode(&mut self, mode: DataMode) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(OximeterError::config_error("session has no device link to configure"));
        };

        let port = writer.name().unwrap_or_else(|| "<unnamed>".to_string());
        write_data_mode(writer.as_mut(), mode, &port)?;
        self.data_mode = Some(mode);
        Ok(())
    }

    /// Mode last written to the device, if any.
    pub fn data_mode(&self) -> Option<DataMode> {
        self.data_mode
    }

    /// Whether the worker is still running and has not been asked to stop.
    pub fn is_active(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished() && !worker.cancel_token().is_cancelled())
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Any partially assembled packet is discarded and nothing is delivered
    /// after this call begins. Returns the worker's counters, or the error
    /// that made it give up on its own.
    pub async fn stop(mut self) -> Result<SyncStats> {
        let Some(worker) = self.worker.take() else {
            return Err(OximeterError::worker_failed("session already stopped"));
        };

        debug!("Stopping decoding session");
        worker.cancel();
        let stats = worker.join().await;
        info!("Decoding session stopped");
        stats
    }

    /// Like [`Session::stop`], giving up after `duration`.
    pub async fn stop_timeout(self, duration: Duration) -> Result<SyncStats> {
        tokio::time::timeout(duration, self.stop())
            .await
            .map_err(|_| OximeterError::Timeout { duration })?
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            debug!("Dropping decoding session");
            worker.cancel();
        }
    }
}

fn write_data_mode(port: &mut dyn SerialPort, mode: DataMode, name: &str) -> Result<()> {
    port.write_all(&mode.command())
        .and_then(|()| port.flush())
        .map_err(|e| OximeterError::io_error(format!("writing data mode to '{}'", name), e))?;
    debug!("Wrote data mode {} to {}", mode, name);
    Ok(())
}
