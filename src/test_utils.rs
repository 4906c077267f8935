//! Test utilities for building oximeter byte streams
//!
//! Frames built here are "clean": apart from the status byte, every byte on
//! the wire (pleth MSB/LSB, payload and checksum) keeps bit 7 clear. A window
//! that does not start on a status byte can then never validate, so streams
//! assembled from these helpers decode deterministically.

#![cfg(any(test, feature = "benchmark"))]

use crate::types::field_location::{self, FRAMES_PER_PACKET};
use crate::types::{FRAME_LEN, Frame, Packet};

/// Status byte of an ordinary continuation frame.
pub const CONTINUATION_STATUS: u8 = 0x80;
/// Status byte of a sync frame.
pub const SYNC_STATUS: u8 = 0x81;

/// Expected decoded values for [`sample_extras`].
pub mod expected {
    pub const HR: i32 = 72;
    pub const SPO2: i32 = 98;
    pub const FIRMWARE: i32 = 0x2A;
    pub const TIMER: i32 = 1234;
    pub const SPO2_DISPLAY: i32 = 97;
    pub const SPO2_FAST: i32 = 96;
    pub const SPO2_BEAT_TO_BEAT: i32 = 95;
    pub const EXT_HR: i32 = 75;
    pub const EXT_SPO2: i32 = 94;
    pub const EXT_SPO2_DISPLAY: i32 = 93;
    pub const HR_DISPLAY: i32 = 300;
    pub const EXT_HR_DISPLAY: i32 = 150;
}

/// Wire bytes of one frame with a correct checksum.
pub fn frame_bytes(status: u8, pleth: u16, extra_status: u8) -> [u8; FRAME_LEN] {
    Frame { status, pleth, extra_status }.to_bytes()
}

/// Pleth sample that keeps a frame clean for the given payload byte.
///
/// Both pleth bytes stay below 0x80 and `msb + lsb + extra_status` lands in
/// 128..=187, so for any status byte up to 0xBF the checksum also stays
/// below 0x80. `extra_status` must itself be below 0x80.
pub fn clean_pleth(seed: u8, extra_status: u8) -> u16 {
    let target = 128 + u16::from(seed % 60);
    let rest = target - u16::from(extra_status & 0x7F);
    let msb = rest / 2;
    let lsb = rest - msb;
    (msb << 8) | lsb
}

/// Pleth samples [`packet_bytes`] writes for a packet with `seed`.
pub fn packet_pleth(extras: &[u8; FRAMES_PER_PACKET], seed: u8) -> [u16; FRAMES_PER_PACKET] {
    let mut samples = [0u16; FRAMES_PER_PACKET];
    for (index, sample) in samples.iter_mut().enumerate() {
        *sample = clean_pleth(seed.wrapping_add(index as u8), extras[index]);
    }
    samples
}

/// Split a heart rate into its (MSB, LSB) payload bytes.
pub fn split_heart_rate(value: u16) -> (u8, u8) {
    (((value >> 7) & 0x03) as u8, (value & 0x7F) as u8)
}

/// Payload bytes populating every named field with a distinct value.
pub fn sample_extras() -> [u8; FRAMES_PER_PACKET] {
    let mut extras = [0u8; FRAMES_PER_PACKET];

    let mut put_hr = |msb: usize, lsb: usize, value: i32| {
        let (hi, lo) = split_heart_rate(value as u16);
        extras[msb] = hi;
        extras[lsb] = lo;
    };
    put_hr(field_location::HR_MSB, field_location::HR_LSB, expected::HR);
    put_hr(field_location::EXT_HR_MSB, field_location::EXT_HR_LSB, expected::EXT_HR);
    put_hr(field_location::HR_MSB_DISPLAY, field_location::HR_LSB_DISPLAY, expected::HR_DISPLAY);
    put_hr(
        field_location::EXT_HR_MSB_DISPLAY,
        field_location::EXT_HR_LSB_DISPLAY,
        expected::EXT_HR_DISPLAY,
    );

    extras[field_location::SPO2] = expected::SPO2 as u8;
    extras[field_location::FIRMWARE_REVISION] = expected::FIRMWARE as u8;
    extras[field_location::TIMER_MSB] = ((expected::TIMER >> 7) & 0x7F) as u8;
    extras[field_location::TIMER_LSB] = (expected::TIMER & 0x7F) as u8;
    // SmartPoint + low battery
    extras[field_location::STAT2] = 0x21;
    extras[field_location::SPO2_DISPLAY] = expected::SPO2_DISPLAY as u8;
    extras[field_location::SPO2_FAST] = expected::SPO2_FAST as u8;
    extras[field_location::SPO2_BEAT_TO_BEAT] = expected::SPO2_BEAT_TO_BEAT as u8;
    extras[field_location::EXT_SPO2] = expected::EXT_SPO2 as u8;
    extras[field_location::EXT_SPO2_DISPLAY] = expected::EXT_SPO2_DISPLAY as u8;

    extras
}

/// Wire bytes of one complete packet: a sync frame followed by 24 continuation frames.
pub fn packet_bytes(extras: &[u8; FRAMES_PER_PACKET], seed: u8) -> Vec<u8> {
    packet_bytes_with_status(extras, seed, 0x00)
}

/// Like [`packet_bytes`] with status bits (0x02..=0x3E) OR-ed into every frame.
pub fn packet_bytes_with_status(
    extras: &[u8; FRAMES_PER_PACKET],
    seed: u8,
    status_bits: u8,
) -> Vec<u8> {
    let bits = status_bits & 0x3E;
    let pleth = packet_pleth(extras, seed);

    let mut bytes = Vec::with_capacity(FRAMES_PER_PACKET * FRAME_LEN);
    for (index, &extra) in extras.iter().enumerate() {
        let status = if index == 0 { SYNC_STATUS } else { CONTINUATION_STATUS };
        bytes.extend_from_slice(&frame_bytes(status | bits, pleth[index], extra));
    }
    bytes
}

/// A full packet assembled directly from frames, bypassing the wire.
pub fn packet_from_extras(extras: &[u8; FRAMES_PER_PACKET]) -> Packet {
    let pleth = packet_pleth(extras, 0);
    let mut packet = Packet::new();
    for (index, &extra) in extras.iter().enumerate() {
        let status = if index == 0 { SYNC_STATUS } else { CONTINUATION_STATUS };
        packet.add_frame(Frame { status, pleth: pleth[index], extra_status: extra });
    }
    packet
}

/// A synthetic stream of `count` back-to-back packets.
pub fn stream_of_packets(count: usize) -> Vec<u8> {
    let extras = sample_extras();
    (0..count).flat_map(|n| packet_bytes(&extras, (n * 7) as u8)).collect()
}
