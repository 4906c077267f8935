//! Packet assembly and field decoding
//!
//! A [`Packet`] collects the 25 frames of one reporting interval (one third of
//! a second). Frame 0 is always the sync frame that opened it. Once full, the
//! named accessors decode physiological values from the frames' payload bytes
//! according to the [field-location table](super::field_location).
//!
//! Every numeric accessor distinguishes three outcomes:
//!
//! | Value | Meaning |
//! |---|---|
//! | [`INVALID_DATA`] (-1) | the decoder cannot reach the field yet |
//! | [`MISSING_HR`] (511) / [`MISSING_SPO2`] (127) | the device reports no value |
//! | anything else | a measurement |

use serde::{Deserialize, Serialize};

use super::field_location::{self as loc, FRAMES_PER_PACKET};
use super::frame::Frame;
use super::status_flags::{HR_MSB_MASK, SEVEN_BIT_MASK, stat2};

/// Field cannot be decoded from this packet (decoder-level sentinel).
pub const INVALID_DATA: i32 = -1;
/// Device sentinel: no pulse rate available.
pub const MISSING_HR: i32 = 511;
/// Device sentinel: no SpO2 available.
pub const MISSING_SPO2: i32 = 127;

/// Fill state of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketState {
    Empty,
    Filling,
    Full,
}

/// Ordered collection of up to 25 frames plus packet-wide status aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    frames: Vec<Frame>,
    /// Truncation point; `None` means every field is treated as reachable.
    last_valid_frame: Option<usize>,
    has_artifact: bool,
    has_out_of_track: bool,
    has_sensor_alarm: bool,
}

impl Default for Packet {
    fn default() -> Self {
        Self::new()
    }
}

impl Packet {
    /// Create an empty packet.
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(FRAMES_PER_PACKET),
            last_valid_frame: None,
            has_artifact: false,
            has_out_of_track: false,
            has_sensor_alarm: false,
        }
    }

    /// Rebuild a packet by replaying every frame of `source` into a cleared one.
    ///
    /// Aggregate flags are recomputed from the frames and no truncation point
    /// is carried over.
    pub fn replayed(source: &Packet) -> Self {
        let mut packet = Self::new();
        for frame in source.frames() {
            packet.add_frame(*frame);
        }
        packet
    }

    /// Remove all frames and reset every aggregate.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.last_valid_frame = None;
        self.has_artifact = false;
        self.has_out_of_track = false;
        self.has_sensor_alarm = false;
    }

    /// Append a frame.
    ///
    /// Returns `false` without changing anything if the packet is already full.
    pub fn add_frame(&mut self, frame: Frame) -> bool {
        if self.is_full() {
            return false;
        }

        self.has_artifact |= frame.has_artifact();
        self.has_out_of_track |= frame.is_out_of_track();
        self.has_sensor_alarm |= frame.has_sensor_alarm();
        self.frames.push(frame);
        true
    }

    /// Whether all 25 frames have been collected.
    pub fn is_full(&self) -> bool {
        self.frames.len() == FRAMES_PER_PACKET
    }

    /// Number of frames collected so far (0..=25).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn state(&self) -> PacketState {
        match self.frames.len() {
            0 => PacketState::Empty,
            FRAMES_PER_PACKET => PacketState::Full,
            _ => PacketState::Filling,
        }
    }

    /// Frames in arrival order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at ordinal position `index`, if collected.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Any frame so far reported artifact.
    pub fn has_any_artifact(&self) -> bool {
        self.has_artifact
    }

    /// Any frame so far reported sustained artifact (out of track).
    pub fn has_any_out_of_track(&self) -> bool {
        self.has_out_of_track
    }

    /// Any frame so far reported a sensor alarm (unusable data, finger removed).
    pub fn has_any_sensor_alarm(&self) -> bool {
        self.has_sensor_alarm
    }

    /// Recorded truncation point, if any.
    pub fn last_valid_frame(&self) -> Option<usize> {
        self.last_valid_frame
    }

    /// Record the current fill count as the truncation point.
    ///
    /// Fields located at or beyond this count read as [`INVALID_DATA`]
    /// afterwards. A point already recorded is kept.
    pub fn mark_truncated(&mut self) {
        if self.last_valid_frame.is_none() {
            self.last_valid_frame = Some(self.frames.len());
        }
    }

    fn reachable(&self, required: usize) -> bool {
        self.last_valid_frame.is_none_or(|last| last >= required)
    }

    fn byte_field(&self, index: usize) -> i32 {
        if !self.reachable(index) {
            return INVALID_DATA;
        }
        self.frames.get(index).map_or(INVALID_DATA, |frame| i32::from(frame.extra_status))
    }

    // MSB: 0 R R R R R HR8 HR7, LSB: 0 HR6..HR0
    fn heart_rate_field(&self, msb: usize, lsb: usize) -> i32 {
        if !self.reachable(lsb) {
            return INVALID_DATA;
        }
        match (self.frames.get(msb), self.frames.get(lsb)) {
            (Some(hi), Some(lo)) => {
                (i32::from(hi.extra_status & HR_MSB_MASK) << 7)
                    | i32::from(lo.extra_status & SEVEN_BIT_MASK)
            }
            _ => INVALID_DATA,
        }
    }

    /// 4-beat SpO2 average, formatted for recording.
    pub fn spo2_average(&self) -> i32 {
        self.byte_field(loc::SPO2)
    }

    /// 4-beat pulse rate average, formatted for recording.
    pub fn hr_average(&self) -> i32 {
        self.heart_rate_field(loc::HR_MSB, loc::HR_LSB)
    }

    /// 8-beat pulse rate extended average, formatted for recording.
    pub fn hr_extended_average(&self) -> i32 {
        self.heart_rate_field(loc::EXT_HR_MSB, loc::EXT_HR_LSB)
    }

    /// 8-beat SpO2 extended average, formatted for recording.
    pub fn spo2_extended_average(&self) -> i32 {
        self.byte_field(loc::EXT_SPO2)
    }

    /// 4-beat SpO2 average optimised for fast response.
    pub fn fast_spo2_average(&self) -> i32 {
        self.byte_field(loc::SPO2_FAST)
    }

    /// Unaveraged beat-to-beat SpO2.
    pub fn beat_to_beat_spo2(&self) -> i32 {
        self.byte_field(loc::SPO2_BEAT_TO_BEAT)
    }

    /// 4-beat pulse rate average as shown on the device display.
    pub fn displayed_hr_average(&self) -> i32 {
        self.heart_rate_field(loc::HR_MSB_DISPLAY, loc::HR_LSB_DISPLAY)
    }

    /// 4-beat SpO2 average as shown on the device display.
    pub fn displayed_spo2_average(&self) -> i32 {
        self.byte_field(loc::SPO2_DISPLAY)
    }

    /// 8-beat SpO2 extended average as shown on the device display.
    pub fn displayed_spo2_extended_average(&self) -> i32 {
        self.byte_field(loc::EXT_SPO2_DISPLAY)
    }

    /// 8-beat pulse rate extended average as shown on the device display.
    pub fn displayed_hr_extended_average(&self) -> i32 {
        self.heart_rate_field(loc::EXT_HR_MSB_DISPLAY, loc::EXT_HR_LSB_DISPLAY)
    }

    /// Oximeter firmware revision level.
    pub fn firmware_version(&self) -> i32 {
        self.byte_field(loc::FIRMWARE_REVISION)
    }

    /// 14-bit value of the device's 3 Hz timer.
    pub fn timer(&self) -> i32 {
        if !self.reachable(loc::TIMER_LSB) {
            return INVALID_DATA;
        }
        match (self.frames.get(loc::TIMER_MSB), self.frames.get(loc::TIMER_LSB)) {
            (Some(hi), Some(lo)) => {
                (i32::from(hi.extra_status & SEVEN_BIT_MASK) << 7)
                    | i32::from(lo.extra_status & SEVEN_BIT_MASK)
            }
            _ => INVALID_DATA,
        }
    }

    /// Raw STAT2 byte, or [`INVALID_DATA`].
    pub fn stat2(&self) -> i32 {
        self.byte_field(loc::STAT2)
    }

    /// High-quality SmartPoint measurement. `false` while STAT2 is unreachable.
    pub fn is_smart_point_measurement(&self) -> bool {
        self.stat2_flag(stat2::SMART_POINT)
    }

    /// Battery low. `false` while STAT2 is unreachable.
    pub fn is_battery_low(&self) -> bool {
        self.stat2_flag(stat2::LOW_BATTERY)
    }

    fn stat2_flag(&self, mask: u8) -> bool {
        match u8::try_from(self.stat2()) {
            Ok(byte) => byte & mask != 0,
            Err(_) => false,
        }
    }

    /// The packet's 25 pleth samples in arrival order; `None` until full.
    pub fn pleth_samples(&self) -> Option<[u16; FRAMES_PER_PACKET]> {
        if !self.is_full() {
            return None;
        }
        let mut samples = [0u16; FRAMES_PER_PACKET];
        for (sample, frame) in samples.iter_mut().zip(&self.frames) {
            *sample = frame.pleth;
        }
        Some(samples)
    }

    /// Pleth samples collected so far, full or not.
    pub fn partial_pleth(&self) -> Vec<u16> {
        self.frames.iter().map(|frame| frame.pleth).collect()
    }
}
