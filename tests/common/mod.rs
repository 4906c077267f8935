//! Byte-stream builders shared by the integration tests
//!
//! Frames keep bit 7 clear on every byte but the status byte, so only
//! aligned windows can pass validation.

#![allow(dead_code)]

use pulseox::{FRAMES_PER_PACKET, Frame};

pub const HR: i32 = 72;
pub const SPO2: i32 = 98;
pub const TIMER: i32 = 300;

/// One frame with a checksum that stays below 0x80.
pub fn clean_frame(status: u8, seed: u8, extra_status: u8) -> [u8; 5] {
    let target = 128 + u16::from(seed % 60);
    let rest = target - u16::from(extra_status & 0x7F);
    let msb = rest / 2;
    let pleth = (msb << 8) | (rest - msb);
    Frame { status, pleth, extra_status }.to_bytes()
}

/// Payload bytes with pulse rate, SpO2 and timer populated.
pub fn extras(hr: i32, spo2: i32, timer: i32) -> [u8; FRAMES_PER_PACKET] {
    let mut extras = [0u8; FRAMES_PER_PACKET];
    extras[0] = ((hr >> 7) & 0x03) as u8;
    extras[1] = (hr & 0x7F) as u8;
    extras[2] = spo2 as u8;
    extras[5] = ((timer >> 7) & 0x7F) as u8;
    extras[6] = (timer & 0x7F) as u8;
    extras
}

/// One packet on the wire.
pub fn packet(extras: &[u8; FRAMES_PER_PACKET], seed: u8) -> Vec<u8> {
    extras
        .iter()
        .enumerate()
        .flat_map(|(index, &extra)| {
            let status = if index == 0 { 0x81 } else { 0x80 };
            clean_frame(status, seed.wrapping_add(index as u8), extra)
        })
        .collect()
}

/// `count` packets whose timers count up from `TIMER`.
pub fn packets(count: usize) -> Vec<u8> {
    (0..count)
        .flat_map(|n| packet(&extras(HR, SPO2, TIMER + n as i32), (n * 11) as u8))
        .collect()
}
