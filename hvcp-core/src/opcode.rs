//! HVC protocol command opcodes

use std::fmt;

use crate::error::{Error, Result};

/// Protocol command opcodes
///
/// All commands from the HVC-P serial command specification. The device
/// has no request identifiers: the response shape is determined entirely
/// by the opcode of the command that was just sent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    GetVersion = 0x00,
    SetCameraAngle = 0x01,
    GetCameraAngle = 0x02,
    Execute = 0x04,
    SetThresholdValues = 0x05,
    GetThresholdValues = 0x06,
    SetDetectionSize = 0x07,
    GetDetectionSize = 0x08,
    SetFaceAngle = 0x09,
    GetFaceAngle = 0x0A,
}

impl Opcode {
    /// Check if this is a "set" command (empty success response)
    pub fn is_set(self) -> bool {
        matches!(
            self,
            Self::SetCameraAngle
                | Self::SetThresholdValues
                | Self::SetDetectionSize
                | Self::SetFaceAngle
        )
    }

    /// Get opcode name
    pub fn name(self) -> &'static str {
        match self {
            Self::GetVersion => "GET_VERSION",
            Self::SetCameraAngle => "SET_CAMERA_ANGLE",
            Self::GetCameraAngle => "GET_CAMERA_ANGLE",
            Self::Execute => "EXECUTE",
            Self::SetThresholdValues => "SET_THRESHOLD_VALUES",
            Self::GetThresholdValues => "GET_THRESHOLD_VALUES",
            Self::SetDetectionSize => "SET_DETECTION_SIZE",
            Self::GetDetectionSize => "GET_DETECTION_SIZE",
            Self::SetFaceAngle => "SET_FACE_ANGLE",
            Self::GetFaceAngle => "GET_FACE_ANGLE",
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> u8 {
        opcode as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::GetVersion),
            0x01 => Ok(Self::SetCameraAngle),
            0x02 => Ok(Self::GetCameraAngle),
            0x04 => Ok(Self::Execute),
            0x05 => Ok(Self::SetThresholdValues),
            0x06 => Ok(Self::GetThresholdValues),
            0x07 => Ok(Self::SetDetectionSize),
            0x08 => Ok(Self::GetDetectionSize),
            0x09 => Ok(Self::SetFaceAngle),
            0x0A => Ok(Self::GetFaceAngle),
            _ => Err(Error::UnknownOpcode(value)),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}
