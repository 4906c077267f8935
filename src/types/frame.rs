//! Frame codec: validation, classification and decoding of 5-byte wire units
//!
//! ```text
//! byte 0   status        bit 7 always set, bit 0 marks a sync frame
//! byte 1   pleth MSB
//! byte 2   pleth LSB
//! byte 3   extra status  meaning depends on the frame's position in its packet
//! byte 4   checksum      (byte0 + byte1 + byte2 + byte3) mod 256
//! ```

use serde::{Deserialize, Serialize};

use super::status_flags::status;

/// Number of bytes in one frame on the wire.
pub const FRAME_LEN: usize = 5;

const STATUS_BYTE: usize = 0;
const PLETH_MSB_BYTE: usize = 1;
const PLETH_LSB_BYTE: usize = 2;
const EXTRA_STATUS_BYTE: usize = 3;
const CHECKSUM_BYTE: usize = 4;

/// Checks whether a 5-byte window holds a valid frame.
///
/// The status byte must have bit 7 set and the last byte must equal the
/// modulo-256 sum of the first four.
pub fn is_valid_frame(window: &[u8; FRAME_LEN]) -> bool {
    if window[STATUS_BYTE] & status::ALWAYS_SET == 0 {
        return false;
    }

    window[..CHECKSUM_BYTE].iter().fold(0u8, |sum, &b| sum.wrapping_add(b)) == window[CHECKSUM_BYTE]
}

/// Checks whether a window is a sync frame (the first frame of a packet).
///
/// Only meaningful for windows that already passed [`is_valid_frame`].
pub fn is_sync_frame(window: &[u8; FRAME_LEN]) -> bool {
    window[STATUS_BYTE] & status::SYNC != 0
}

/// Pulse signal quality, reported for about 160 ms during a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PulseQuality {
    /// No indication: a pulse is not occurring at the time of measurement.
    OutsidePulse,
    /// Low or no pulse signal.
    Red,
    /// Low or marginal pulse signal.
    Yellow,
    /// High quality pulse signal.
    Green,
}

/// Decoded view of one validated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    /// Status bit flags
    pub status: u8,
    /// Photoplethysmogram sample
    pub pleth: u16,
    /// Position-dependent payload byte
    pub extra_status: u8,
}

impl Frame {
    /// Decode a window without validating it.
    ///
    /// Callers check [`is_valid_frame`] first; use [`Frame::parse`] to do both.
    pub fn decode(window: &[u8; FRAME_LEN]) -> Self {
        Self {
            status: window[STATUS_BYTE],
            pleth: u16::from_be_bytes([window[PLETH_MSB_BYTE], window[PLETH_LSB_BYTE]]),
            extra_status: window[EXTRA_STATUS_BYTE],
        }
    }

    /// Validate and decode a window in one step.
    pub fn parse(window: &[u8; FRAME_LEN]) -> Option<Self> {
        is_valid_frame(window).then(|| Self::decode(window))
    }

    /// Encode back to wire bytes, computing the checksum.
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let [msb, lsb] = self.pleth.to_be_bytes();
        let checksum =
            self.status.wrapping_add(msb).wrapping_add(lsb).wrapping_add(self.extra_status);
        [self.status, msb, lsb, self.extra_status, checksum]
    }

    /// Whether this frame opens a packet.
    pub fn is_sync(&self) -> bool {
        self.status & status::SYNC != 0
    }

    /// Artifact present during the pulse.
    pub fn has_artifact(&self) -> bool {
        self.status & status::ARTIFACT != 0
    }

    /// Sustained artifact: absence of consecutive good pulse signals.
    pub fn is_out_of_track(&self) -> bool {
        self.status & status::OUT_OF_TRACK != 0
    }

    /// Sensor alarm: the device is producing unusable data, e.g. the finger was removed.
    pub fn has_sensor_alarm(&self) -> bool {
        self.status & status::SENSOR_ALARM != 0
    }

    /// Pulse quality from the red and green perfusion bits.
    pub fn pulse_quality(&self) -> PulseQuality {
        let red = self.status & status::RED_PERFUSION != 0;
        let green = self.status & status::GREEN_PERFUSION != 0;

        match (red, green) {
            (true, true) => PulseQuality::Yellow,
            (true, false) => PulseQuality::Red,
            (false, true) => PulseQuality::Green,
            (false, false) => PulseQuality::OutsidePulse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn validity_matches_flag_and_checksum(window in any::<[u8; 5]>()) {
            let sum = window[..4].iter().map(|&b| u32::from(b)).sum::<u32>() % 256;
            let expected = window[0] & 0x80 != 0 && sum == window[4] as u32;
            prop_assert_eq!(is_valid_frame(&window), expected);
        }

        #[test]
        fn sync_matches_bit_zero_for_valid_frames(
            status in 0x80u8..=0xFF,
            pleth in any::<u16>(),
            extra in any::<u8>()
        ) {
            let bytes = Frame { status, pleth, extra_status: extra }.to_bytes();
            prop_assert!(is_valid_frame(&bytes));
            prop_assert_eq!(is_sync_frame(&bytes), status & 0x01 == 1);
        }

        #[test]
        fn decode_composes_pleth_big_endian(window in any::<[u8; 5]>()) {
            let frame = Frame::decode(&window);
            prop_assert_eq!(frame.status, window[0]);
            prop_assert_eq!(frame.pleth, ((window[1] as u16) << 8) | window[2] as u16);
            prop_assert_eq!(frame.extra_status, window[3]);
        }

        #[test]
        fn status_predicates_follow_bits(status in any::<u8>()) {
            let frame = Frame { status, pleth: 0, extra_status: 0 };
            prop_assert_eq!(frame.has_artifact(), status & 0x20 != 0);
            prop_assert_eq!(frame.is_out_of_track(), status & 0x10 != 0);
            prop_assert_eq!(frame.has_sensor_alarm(), status & 0x08 != 0);
        }
    }

    #[test]
    fn checksum_wraps_modulo_256() {
        // 0x81 + 0xFF + 0xFF + 0x02 = 0x281 -> 0x81
        assert!(is_valid_frame(&[0x81, 0xFF, 0xFF, 0x02, 0x81]));
        assert!(!is_valid_frame(&[0x81, 0xFF, 0xFF, 0x02, 0x82]));
    }

    #[test]
    fn bit_seven_is_required() {
        // Checksum is right but the framing bit is clear
        assert!(!is_valid_frame(&[0x01, 0x00, 0x64, 0x05, 0x6A]));
        assert!(is_valid_frame(&[0x81, 0x00, 0x64, 0x05, 0xEA]));
    }

    #[test]
    fn parse_rejects_invalid_windows() {
        assert_eq!(Frame::parse(&[0x00; 5]), None);
        let frame = Frame::parse(&[0x81, 0x00, 0x64, 0x05, 0xEA]).expect("valid frame");
        assert_eq!(frame, Frame { status: 0x81, pleth: 0x0064, extra_status: 0x05 });
        assert!(frame.is_sync());
    }

    #[test]
    fn pulse_quality_from_perfusion_bits() {
        let quality = |status| Frame { status, pleth: 0, extra_status: 0 }.pulse_quality();
        assert_eq!(quality(0x80), PulseQuality::OutsidePulse);
        assert_eq!(quality(0x82), PulseQuality::Green);
        assert_eq!(quality(0x84), PulseQuality::Red);
        assert_eq!(quality(0x86), PulseQuality::Yellow);
    }
}
