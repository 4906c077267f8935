//! Data-reporting modes and the device configuration command

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::OximeterError;

const STX: u8 = 0x02;
const OP_CODE: u8 = 0x70;
const DATA_SIZE: u8 = 0x02;
const DATA_TYPE: u8 = 0x02;
const ETX: u8 = 0x03;

/// Data-reporting mode selecting which fields the device fills per packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataMode {
    D2,
    #[default]
    D7,
    D8,
    D13,
}

impl DataMode {
    /// Mode byte sent in the configuration command.
    pub fn code(self) -> u8 {
        match self {
            DataMode::D2 => 0x02,
            DataMode::D7 => 0x07,
            DataMode::D8 => 0x08,
            DataMode::D13 => 0x0D,
        }
    }

    /// The 6-byte command switching the device into this mode.
    pub fn command(self) -> [u8; 6] {
        [STX, OP_CODE, DATA_SIZE, DATA_TYPE, self.code(), ETX]
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataMode::D2 => "D2",
            DataMode::D7 => "D7",
            DataMode::D8 => "D8",
            DataMode::D13 => "D13",
        };
        f.write_str(name)
    }
}

impl FromStr for DataMode {
    type Err = OximeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "D2" => Ok(DataMode::D2),
            "D7" => Ok(DataMode::D7),
            "D8" => Ok(DataMode::D8),
            "D13" => Ok(DataMode::D13),
            _ => Err(OximeterError::UnknownDataMode { mode: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_bit_exact() {
        assert_eq!(DataMode::D7.command(), [0x02, 0x70, 0x02, 0x02, 0x07, 0x03]);
        assert_eq!(DataMode::D13.command(), [0x02, 0x70, 0x02, 0x02, 0x0D, 0x03]);
        assert_eq!(DataMode::D8.command(), [0x02, 0x70, 0x02, 0x02, 0x08, 0x03]);
        assert_eq!(DataMode::D2.command(), [0x02, 0x70, 0x02, 0x02, 0x02, 0x03]);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("d7".parse::<DataMode>().unwrap(), DataMode::D7);
        assert_eq!("D13".parse::<DataMode>().unwrap(), DataMode::D13);
        for mode in [DataMode::D2, DataMode::D7, DataMode::D8, DataMode::D13] {
            assert_eq!(mode.to_string().parse::<DataMode>().unwrap(), mode);
        }
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = "D9".parse::<DataMode>().unwrap_err();
        assert!(matches!(err, OximeterError::UnknownDataMode { ref mode } if mode == "D9"));
    }

    #[test]
    fn default_is_d7() {
        assert_eq!(DataMode::default(), DataMode::D7);
    }
}
