//! Driver spawns and manages the decoding worker
//!
//! The worker owns a [`ByteSource`], a [`Synchronizer`] and a
//! [`PacketHandler`]. It pulls one byte at a time, pushes it through the
//! synchronizer and hands every completed packet to the handler before
//! reading on.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::SessionConfig;
use crate::handler::PacketHandler;
use crate::source::ByteSource;
use crate::synchronizer::{SyncStats, Synchronizer};
use crate::{OximeterError, Result};

/// Consecutive read failures after which the worker starts warning.
const WARN_AFTER_ERRORS: u32 = 10;

/// Worker tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    /// Delay after the first read error; doubles with each consecutive error
    pub initial_backoff: Duration,
    /// Upper bound on the delay between consecutive read errors
    pub max_backoff: Duration,
    /// Give up after this many consecutive read errors; `None` never gives up
    pub max_consecutive_errors: Option<u32>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl DriverOptions {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            initial_backoff: Duration::from_millis(50),
            max_backoff: config.max_backoff(),
            max_consecutive_errors: config.max_consecutive_errors,
        }
    }

    /// Backoff before the next read after `consecutive` failures (1-based).
    ///
    /// 50ms, 100ms, 200ms, ... capped at `max_backoff`.
    pub fn backoff(&self, consecutive: u32) -> Duration {
        let doublings = consecutive.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << doublings).min(self.max_backoff)
    }
}

/// Handle to a spawned worker.
pub struct DriverHandle {
    task: JoinHandle<Result<SyncStats>>,
    cancel: CancellationToken,
}

impl DriverHandle {
    /// Token that stops the worker when cancelled.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Request the worker to stop. Does not wait.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the worker to exit and collect its counters.
    pub async fn join(self) -> Result<SyncStats> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Decoder worker failed: {}", e);
                Err(OximeterError::worker_failed(e.to_string()))
            }
        }
    }
}

/// Driver spawns and manages the decoding worker
pub struct Driver;

impl Driver {
    /// Spawn a worker for the given source and handler
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S, H>(source: S, handler: H, options: DriverOptions) -> DriverHandle
    where
        S: ByteSource,
        H: PacketHandler,
    {
        let cancel = CancellationToken::new();
        let cancel_worker = cancel.clone();

        let task = tokio::spawn(async move {
            Self::worker_task(source, handler, options, cancel_worker).await
        });

        DriverHandle { task, cancel }
    }

    /// Worker task - reads bytes, assembles packets and delivers them
    async fn worker_task<S, H>(
        mut source: S,
        mut handler: H,
        options: DriverOptions,
        cancel: CancellationToken,
    ) -> Result<SyncStats>
    where
        S: ByteSource,
        H: PacketHandler,
    {
        info!("Decoder worker started");
        let mut sync = Synchronizer::new();
        let mut consecutive_errors = 0u32;

        let outcome = loop {
            if cancel.is_cancelled() {
                info!("Decoder worker cancelled");
                break Ok(());
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Decoder worker cancelled during read");
                    break Ok(());
                }
                result = source.next_byte() => result,
            };

            match result {
                Ok(Some(byte)) => {
                    consecutive_errors = 0;

                    let Some(packet) = sync.push(byte) else {
                        continue;
                    };

                    trace!("Delivering packet ({} so far)", sync.stats().packets);
                    let delivered = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            debug!("Cancelled before packet delivery, dropping it");
                            break Ok(());
                        }
                        delivered = handler.handle(packet) => delivered,
                    };

                    match delivered {
                        Ok(()) => sync.note_delivered(),
                        Err(OximeterError::ConsumerClosed) => {
                            debug!("Packet consumer closed, shutting down");
                            break Ok(());
                        }
                        Err(e) => {
                            error!("Packet handler failed: {}", e);
                            break Err(e);
                        }
                    }
                }
                Ok(None) => {
                    info!("Byte stream ended after {} bytes", sync.stats().bytes);
                    break Ok(());
                }
                Err(e) => {
                    // Expected when the device disconnects; the window is left as is
                    sync.note_io_error();
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    debug!("Read error ({} consecutive): {}", consecutive_errors, e);

                    let limit = options.max_consecutive_errors;
                    if limit.is_some_and(|limit| consecutive_errors >= limit) {
                        error!(
                            "Too many consecutive read errors ({}), shutting down",
                            consecutive_errors
                        );
                        break Err(e);
                    }

                    if consecutive_errors == WARN_AFTER_ERRORS {
                        warn!("Read failing repeatedly ({} in a row): {}", consecutive_errors, e);
                    }

                    let backoff = options.backoff(consecutive_errors);
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            info!("Decoder worker cancelled during backoff");
                            break Ok(());
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        };

        if let Some(frames) = sync.reset() {
            debug!("Discarded partial packet ({} frames)", frames);
        }

        let stats = sync.stats();
        info!(
            "Worker ended: {} bytes, {} packets, {} delivered, {} truncated, {} read errors",
            stats.bytes,
            stats.packets,
            stats.delivered,
            stats.truncated_packets,
            stats.io_errors
        );
        outcome.map(|()| stats)
    }
}
