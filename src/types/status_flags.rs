//! Bit constants for the oximeter's status bytes
//!
//! `status` is byte 0 of every frame; `stat2` is the extra-status byte carried
//! by the frame at [`STAT2`](super::field_location::STAT2).

/// Frame status byte
pub mod status {
    pub const ALWAYS_SET: u8 = 0x80; // bit 7, framing marker
    pub const ARTIFACT: u8 = 0x20; // ARTF
    pub const OUT_OF_TRACK: u8 = 0x10; // OOT, sustained artifact
    pub const SENSOR_ALARM: u8 = 0x08; // SNSF, unusable data / finger removed
    pub const RED_PERFUSION: u8 = 0x04; // RPRF
    pub const GREEN_PERFUSION: u8 = 0x02; // GPRF
    pub const SYNC: u8 = 0x01; // first frame of a packet
}

/// STAT2 byte
pub mod stat2 {
    pub const SMART_POINT: u8 = 0x20; // SPA
    pub const LOW_BATTERY: u8 = 0x01;
}

/// Heart-rate MSB carries HR8..HR7 in its low two bits
pub const HR_MSB_MASK: u8 = 0x03;
/// 7-bit payload mask shared by heart-rate LSBs and both timer bytes
pub const SEVEN_BIT_MASK: u8 = 0x7F;
