//! Core types for oximeter protocol data.
//!
//! ## Architecture
//!
//! The types follow the wire protocol from the bottom up:
//! - [`Frame`] is one validated 5-byte wire unit (status, pleth sample, payload byte)
//! - [`Packet`] accumulates the 25 frames of one reporting interval and decodes its fields
//! - [`field_location`] maps frame positions to the physiological values they carry
//! - [`status_flags`] names the bits of the status and STAT2 bytes
//! - [`DataMode`] selects what the device reports and builds its configuration command
//! - [`Reading`] is a serializable summary of a full packet
//!
//! ## Usage Example
//!
//! ```rust
//! use pulseox::types::{Frame, Packet, is_valid_frame};
//!
//! let window = [0x81, 0x00, 0x64, 0x05, 0xEA];
//! assert!(is_valid_frame(&window));
//!
//! let mut packet = Packet::new();
//! packet.add_frame(Frame::decode(&window));
//! assert_eq!(packet.len(), 1);
//! assert!(!packet.is_full());
//! ```

mod data_mode;
pub mod field_location;
mod frame;
mod packet;
mod reading;
pub mod status_flags;

pub use data_mode::DataMode;
pub use field_location::{FRAMES_PER_PACKET, FieldSlot};
pub use frame::{FRAME_LEN, Frame, PulseQuality, is_sync_frame, is_valid_frame};
pub use packet::{INVALID_DATA, MISSING_HR, MISSING_SPO2, Packet, PacketState};
pub use reading::{FieldValue, Reading};
