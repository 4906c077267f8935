//! Stream synchronizer: turns an unframed byte stream into complete packets
//!
//! The device stream has no delimiter beyond the status byte's framing bit
//! and the per-frame checksum. The synchronizer keeps a 5-byte sliding window
//! and re-evaluates it on every byte. A window that validates is decoded as a
//! frame. A sync frame opens a fresh packet and other frames extend the open
//! one. Invalid windows are skipped one byte at a time, so re-synchronisation
//! after noise or a dropped byte happens on its own.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{FRAME_LEN, Frame, Packet, is_sync_frame, is_valid_frame};

/// Counters describing what the synchronizer has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// Bytes pushed into the window
    pub bytes: u64,
    /// Windows that passed validation
    pub valid_frames: u64,
    /// Valid frames carrying the sync flag
    pub sync_frames: u64,
    /// Valid frames seen while no packet was open
    pub orphan_frames: u64,
    /// Complete packets assembled, whether or not they reached the consumer
    pub packets: u64,
    /// Packets the consumer accepted
    pub delivered: u64,
    /// Partial packets dropped because a new sync frame arrived
    pub truncated_packets: u64,
    /// Read failures reported by the byte source
    pub io_errors: u64,
}

/// Sliding-window frame synchronizer and packet assembler driver.
#[derive(Debug, Default)]
pub struct Synchronizer {
    window: [u8; FRAME_LEN],
    filled: usize,
    open: Option<Packet>,
    stats: SyncStats,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one byte; returns a packet when this byte completed one.
    pub fn push(&mut self, byte: u8) -> Option<Packet> {
        self.stats.bytes += 1;

        if self.filled < FRAME_LEN {
            self.window[self.filled] = byte;
            self.filled += 1;
        } else {
            self.window.copy_within(1.., 0);
            self.window[FRAME_LEN - 1] = byte;
        }

        if self.filled < FRAME_LEN || !is_valid_frame(&self.window) {
            return None;
        }

        self.stats.valid_frames += 1;

        if is_sync_frame(&self.window) {
            self.stats.sync_frames += 1;
            if let Some(stale) = self.open.replace(Packet::new()) {
                self.stats.truncated_packets += 1;
                trace!("Sync frame dropped partial packet ({} frames)", stale.len());
            }
        }

        let Some(packet) = self.open.as_mut() else {
            self.stats.orphan_frames += 1;
            return None;
        };

        packet.add_frame(Frame::decode(&self.window));

        if !packet.is_full() {
            return None;
        }

        let snapshot = self.open.take().map(|full| Packet::replayed(&full));
        self.stats.packets += 1;
        trace!("Packet {} complete", self.stats.packets);
        snapshot
    }

    /// Push a run of bytes, collecting every packet completed along the way.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Packet> {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }

    /// Whether a packet is currently being assembled.
    pub fn has_open_packet(&self) -> bool {
        self.open.is_some()
    }

    /// Frames collected in the open packet, if any.
    pub fn open_packet_len(&self) -> Option<usize> {
        self.open.as_ref().map(Packet::len)
    }

    /// Record a read failure. The window is left untouched.
    pub fn note_io_error(&mut self) {
        self.stats.io_errors += 1;
    }

    /// Record that the consumer accepted a packet returned by [`push`](Self::push).
    pub fn note_delivered(&mut self) {
        self.stats.delivered += 1;
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Drop the window contents and any open packet. Counters are kept.
    ///
    /// Returns the number of frames discarded with the open packet.
    pub fn reset(&mut self) -> Option<usize> {
        self.window = [0; FRAME_LEN];
        self.filled = 0;
        self.open.take().map(|packet| packet.len())
    }
}
