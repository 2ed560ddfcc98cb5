//! Protocol constants

use bitflags::bitflags;

use crate::error::{Error, Result};

/// Sync code marking the start of every frame and response header
pub const SYNC_CODE: u8 = 0xFE;

/// Default number of availability polls before a command times out
pub const DEFAULT_READ_RETRY: u32 = 5;

/// Default sleep between availability polls (milliseconds)
pub const READ_RETRY_SLEEP_MS: u64 = 1000;

/// Maximum bytes read per chunk while draining an image payload
pub const IMAGE_READ_BUFFER: usize = 200;

/// Sleep between image drain polls when no bytes are available (milliseconds)
pub const IMAGE_READ_SLEEP_MS: u64 = 20;

/// Size of one opaque body/hand detection metadata block.
/// Asserted from the datasheet: x, y, size, confidence as u16 each.
pub const DETECTION_BLOCK_SIZE: usize = 8;

/// Camera mount angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CameraAngle {
    Deg0 = 0x00,
    Deg90 = 0x01,
    Deg180 = 0x02,
    Deg270 = 0x03,
}

impl TryFrom<u8> for CameraAngle {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::Deg0),
            0x01 => Ok(Self::Deg90),
            0x02 => Ok(Self::Deg180),
            0x03 => Ok(Self::Deg270),
            _ => Err(Error::UnexpectedValue {
                field: "camera angle",
                value,
            }),
        }
    }
}

/// Face profile (yaw) detection range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum YawAngle {
    Deg30 = 0x00,
    Deg60 = 0x01,
    Deg90 = 0x02,
}

/// Head tilt (roll) detection range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RollAngle {
    Deg15 = 0x00,
    Deg45 = 0x01,
}

bitflags! {
    /// Detection/estimation functions selected for one execute command.
    ///
    /// Bits are independently combinable. Only the body/hand/face counts
    /// are decoded from the response; the estimation bits are accepted on
    /// the wire but their result blocks are not interpreted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExecutionFlags: u16 {
        const BODY_DETECTION = 0x0001;
        const HAND_DETECTION = 0x0002;
        const FACE_DETECTION = 0x0004;
        const FACE_DIRECTION = 0x0008;
        const AGE_ESTIMATION = 0x0010;
        const GENDER_ESTIMATION = 0x0020;
        const GAZE_ESTIMATION = 0x0040;
        const BLINK_ESTIMATION = 0x0080;
        const EXPRESSION_ESTIMATION = 0x0100;
        const FACE_RECOGNITION = 0x0200;
    }
}

/// Image capture option for the execute command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ImageOption {
    /// No image in the response
    #[default]
    None = 0x00,
    /// 320x240 capture appended to the response
    Qvga = 0x01,
    /// 160x120 capture appended to the response
    QvgaHalf = 0x02,
}

impl ImageOption {
    /// Check if this option makes the device append an image payload
    pub fn requests_image(self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_angle_conversion() {
        assert_eq!(CameraAngle::try_from(0x02).unwrap(), CameraAngle::Deg180);
        assert!(CameraAngle::try_from(0x04).is_err());
    }

    #[test]
    fn test_execution_flags_combine() {
        let flags = ExecutionFlags::BODY_DETECTION | ExecutionFlags::FACE_DETECTION;
        assert_eq!(flags.bits(), 0x0005);
        assert!(flags.contains(ExecutionFlags::BODY_DETECTION));
        assert!(!flags.contains(ExecutionFlags::HAND_DETECTION));
    }

    #[test]
    fn test_image_option() {
        assert!(!ImageOption::None.requests_image());
        assert!(ImageOption::Qvga.requests_image());
        assert!(ImageOption::QvgaHalf.requests_image());
    }
}
