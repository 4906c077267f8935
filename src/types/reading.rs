//! Summary record of a decoded packet for downstream applications

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::field_location::FRAMES_PER_PACKET;
use super::packet::{INVALID_DATA, MISSING_HR, MISSING_SPO2, Packet};

/// Typed classification of a sentinel-carrying field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A measurement.
    Value(u16),
    /// The device reported that no value is available.
    Unavailable,
    /// The decoder could not reach the field.
    Incomplete,
}

impl FieldValue {
    /// Classify a heart-rate accessor result.
    pub fn heart_rate(raw: i32) -> Self {
        Self::classify(raw, Some(MISSING_HR))
    }

    /// Classify an SpO2 accessor result.
    pub fn spo2(raw: i32) -> Self {
        Self::classify(raw, Some(MISSING_SPO2))
    }

    /// Classify a field without a device sentinel (timer, firmware revision).
    pub fn plain(raw: i32) -> Self {
        Self::classify(raw, None)
    }

    fn classify(raw: i32, missing: Option<i32>) -> Self {
        if raw == INVALID_DATA {
            return FieldValue::Incomplete;
        }
        if missing == Some(raw) {
            return FieldValue::Unavailable;
        }
        u16::try_from(raw).map_or(FieldValue::Incomplete, FieldValue::Value)
    }

    pub fn value(self) -> Option<u16> {
        match self {
            FieldValue::Value(v) => Some(v),
            FieldValue::Unavailable | FieldValue::Incomplete => None,
        }
    }
}

/// One reporting interval reduced to the values applications usually need.
///
/// Numeric fields keep the raw sentinel contract of [`Packet`]. JSON keys
/// follow the record format existing consumers of this device already parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// 4-beat SpO2 average
    pub spo2: i32,
    /// Beat-to-beat SpO2
    pub instant_spo2: i32,
    /// 4-beat pulse rate average
    #[serde(rename = "hr")]
    pub heart_rate: i32,
    /// Host wall-clock time, ms since the UNIX epoch
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
    /// Device 3 Hz timer
    pub timer: i32,
    pub has_artifacts: bool,
    pub has_sustained_artifacts: bool,
    #[serde(rename = "nofinger")]
    pub no_finger: bool,
    pub sensor_alarm: bool,
    #[serde(rename = "batterylow")]
    pub battery_low: bool,
    pub smart_point: bool,
    /// Pleth samples of the interval; empty if the packet was not full
    #[serde(rename = "PPG")]
    pub ppg: Vec<u16>,
}

impl Reading {
    /// Summarise a packet with an explicit timestamp.
    pub fn from_packet(packet: &Packet, timestamp_ms: u64) -> Self {
        let ppg = packet.pleth_samples().map(|s| s.to_vec()).unwrap_or_default();
        debug_assert!(ppg.is_empty() || ppg.len() == FRAMES_PER_PACKET);

        Self {
            spo2: packet.spo2_average(),
            instant_spo2: packet.beat_to_beat_spo2(),
            heart_rate: packet.hr_average(),
            timestamp_ms,
            timer: packet.timer(),
            has_artifacts: packet.has_any_artifact(),
            has_sustained_artifacts: packet.has_any_out_of_track(),
            no_finger: packet.has_any_sensor_alarm(),
            sensor_alarm: packet.has_any_sensor_alarm(),
            battery_low: packet.is_battery_low(),
            smart_point: packet.is_smart_point_measurement(),
            ppg,
        }
    }

    /// Summarise a packet stamped with the current wall-clock time.
    pub fn now(packet: &Packet) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0);
        Self::from_packet(packet, timestamp_ms)
    }

    pub fn spo2_value(&self) -> FieldValue {
        FieldValue::spo2(self.spo2)
    }

    pub fn heart_rate_value(&self) -> FieldValue {
        FieldValue::heart_rate(self.heart_rate)
    }
}
