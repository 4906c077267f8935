//! Field-location table: which physiological value each frame of a packet carries
//!
//! The device puts one payload byte (`extra_status`) in each of the 25 frames
//! of a packet. Its meaning depends only on the frame's ordinal position.

use serde::{Deserialize, Serialize};

/// Number of frames in a packet.
pub const FRAMES_PER_PACKET: usize = 25;

/// MSB of 4-beat average heart rate, formatted for recording.
pub const HR_MSB: usize = 0;
/// LSB of 4-beat average heart rate, formatted for recording.
pub const HR_LSB: usize = 1;
/// 4-beat average SpO2, formatted for recording.
pub const SPO2: usize = 2;
/// Oximeter firmware revision level.
pub const FIRMWARE_REVISION: usize = 3;
/// MSB of the 3 Hz timer.
pub const TIMER_MSB: usize = 5;
/// LSB of the 3 Hz timer.
pub const TIMER_LSB: usize = 6;
/// STAT2 byte (low battery and SmartPoint flags).
pub const STAT2: usize = 7;
/// 4-beat average SpO2, formatted for display.
pub const SPO2_DISPLAY: usize = 8;
/// 4-beat average SpO2 optimised for fast response, formatted for recording.
pub const SPO2_FAST: usize = 9;
/// Beat-to-beat (unaveraged) SpO2, formatted for recording.
pub const SPO2_BEAT_TO_BEAT: usize = 10;
/// MSB of 8-beat extended average heart rate, formatted for recording.
pub const EXT_HR_MSB: usize = 13;
/// LSB of 8-beat extended average heart rate, formatted for recording.
pub const EXT_HR_LSB: usize = 14;
/// 8-beat extended average SpO2, formatted for recording.
pub const EXT_SPO2: usize = 15;
/// 8-beat extended average SpO2, formatted for display.
pub const EXT_SPO2_DISPLAY: usize = 16;
/// MSB of 4-beat average heart rate, formatted for display.
pub const HR_MSB_DISPLAY: usize = 19;
/// LSB of 4-beat average heart rate, formatted for display.
pub const HR_LSB_DISPLAY: usize = 20;
/// MSB of 8-beat extended average heart rate, formatted for display.
pub const EXT_HR_MSB_DISPLAY: usize = 21;
/// LSB of 8-beat extended average heart rate, formatted for display.
pub const EXT_HR_LSB_DISPLAY: usize = 22;

/// Semantic meaning of one frame slot.
///
/// "Recorded" values switch to the device's missing-value sentinel as soon as
/// the finger is removed. "Display" values hold the last reading for 10
/// seconds first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldSlot {
    HeartRateMsb,
    HeartRateLsb,
    SpO2,
    FirmwareRevision,
    TimerMsb,
    TimerLsb,
    Stat2,
    SpO2Display,
    SpO2Fast,
    SpO2BeatToBeat,
    ExtHeartRateMsb,
    ExtHeartRateLsb,
    ExtSpO2,
    ExtSpO2Display,
    HeartRateMsbDisplay,
    HeartRateLsbDisplay,
    ExtHeartRateMsbDisplay,
    ExtHeartRateLsbDisplay,
    Reserved,
}

/// Slot meaning for every frame index of a packet.
pub const FIELD_TABLE: [FieldSlot; FRAMES_PER_PACKET] = [
    FieldSlot::HeartRateMsb,           // 0
    FieldSlot::HeartRateLsb,           // 1
    FieldSlot::SpO2,                   // 2
    FieldSlot::FirmwareRevision,       // 3
    FieldSlot::Reserved,               // 4
    FieldSlot::TimerMsb,               // 5
    FieldSlot::TimerLsb,               // 6
    FieldSlot::Stat2,                  // 7
    FieldSlot::SpO2Display,            // 8
    FieldSlot::SpO2Fast,               // 9
    FieldSlot::SpO2BeatToBeat,         // 10
    FieldSlot::Reserved,               // 11
    FieldSlot::Reserved,               // 12
    FieldSlot::ExtHeartRateMsb,        // 13
    FieldSlot::ExtHeartRateLsb,        // 14
    FieldSlot::ExtSpO2,                // 15
    FieldSlot::ExtSpO2Display,         // 16
    FieldSlot::Reserved,               // 17
    FieldSlot::Reserved,               // 18
    FieldSlot::HeartRateMsbDisplay,    // 19
    FieldSlot::HeartRateLsbDisplay,    // 20
    FieldSlot::ExtHeartRateMsbDisplay, // 21
    FieldSlot::ExtHeartRateLsbDisplay, // 22
    FieldSlot::Reserved,               // 23
    FieldSlot::Reserved,               // 24
];

/// Look up what a frame index carries.
pub fn slot_at(index: usize) -> Option<FieldSlot> {
    FIELD_TABLE.get(index).copied()
}
