//! Typed response structures
//!
//! Each structure corresponds to one response shape on the wire. They are
//! owned by the caller once returned; the driver retains nothing between
//! calls.

use std::fmt;

use crate::error::{Error, Result};

/// Device model and firmware version, from GET_VERSION
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Model string (12 ASCII bytes on the wire, NUL padding trimmed)
    pub model: String,

    /// Major firmware version
    pub major: u8,

    /// Minor firmware version
    pub minor: u8,

    /// Release number
    pub release: u8,

    /// Firmware revision bytes
    pub revision: [u8; 4],
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{}.{}.{} (rev {:02x}{:02x}{:02x}{:02x})",
            self.model,
            self.major,
            self.minor,
            self.release,
            self.revision[0],
            self.revision[1],
            self.revision[2],
            self.revision[3]
        )
    }
}

/// Detection threshold values, one per detector
///
/// Valid range for each threshold is 1..=1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdValues {
    pub body: u16,
    pub hand: u16,
    pub face: u16,
    pub recognition: u16,
}

impl ThresholdValues {
    /// Check all thresholds are within the device-accepted range
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("body", self.body),
            ("hand", self.hand),
            ("face", self.face),
            ("recognition", self.recognition),
        ] {
            if !(1..=1000).contains(&value) {
                return Err(Error::Validation(format!(
                    "{name} threshold {value} out of range 1..=1000"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ThresholdValues {
    fn default() -> Self {
        Self {
            body: 500,
            hand: 500,
            face: 500,
            recognition: 500,
        }
    }
}

impl fmt::Display for ThresholdValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Thresholds[body={} hand={} face={} recognition={}]",
            self.body, self.hand, self.face, self.recognition
        )
    }
}

/// Min/max detection sizes in pixels, per detector
///
/// Valid range for each bound is 20..=8192 with min <= max.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionSize {
    pub min_body: u16,
    pub max_body: u16,
    pub min_hand: u16,
    pub max_hand: u16,
    pub min_face: u16,
    pub max_face: u16,
}

impl DetectionSize {
    /// Check all bounds are within the device-accepted range and ordered
    pub fn validate(&self) -> Result<()> {
        for (name, min, max) in [
            ("body", self.min_body, self.max_body),
            ("hand", self.min_hand, self.max_hand),
            ("face", self.min_face, self.max_face),
        ] {
            for value in [min, max] {
                if !(20..=8192).contains(&value) {
                    return Err(Error::Validation(format!(
                        "{name} detection size {value} out of range 20..=8192"
                    )));
                }
            }
            if min > max {
                return Err(Error::Validation(format!(
                    "{name} detection size min {min} exceeds max {max}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for DetectionSize {
    fn default() -> Self {
        Self {
            min_body: 30,
            max_body: 8192,
            min_hand: 40,
            max_hand: 8192,
            min_face: 64,
            max_face: 8192,
        }
    }
}

impl fmt::Display for DetectionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DetectionSize[body={}-{} hand={}-{} face={}-{}]",
            self.min_body, self.max_body, self.min_hand, self.max_hand, self.min_face,
            self.max_face
        )
    }
}

/// Face angle detection ranges, from GET_FACE_ANGLE
///
/// Raw device bytes; the set command takes the typed angle enums instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceAngle {
    pub yaw: u8,
    pub roll: u8,
}

impl fmt::Display for FaceAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaceAngle[yaw=0x{:02x} roll=0x{:02x}]", self.yaw, self.roll)
    }
}

/// Outcome of the optional image drain attached to an execute response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCapture {
    /// Image width in pixels
    pub width: u16,

    /// Image height in pixels
    pub height: u16,

    /// Bytes actually delivered to the sink, in wire order
    pub bytes_written: usize,

    /// False when the drain gave up before `width * height` bytes arrived.
    /// The sink then holds an exact prefix of the image; the caller
    /// decides whether to keep it.
    pub complete: bool,
}

impl ImageCapture {
    /// Total bytes the device declared for this image
    pub fn expected_bytes(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Result of one execute command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Number of bodies detected
    pub body_count: u8,

    /// Number of hands detected
    pub hand_count: u8,

    /// Number of faces detected
    pub face_count: u8,

    /// Image capture outcome, present only when an image was requested
    pub image: Option<ImageCapture>,
}

impl ExecutionResult {
    /// Detections counted towards the detection event trigger.
    /// Hands are tracked but deliberately excluded here.
    pub fn detections(&self) -> u16 {
        self.body_count as u16 + self.face_count as u16
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Detections[body={} hand={} face={}]",
            self.body_count, self.hand_count, self.face_count
        )?;

        if let Some(image) = &self.image {
            write!(
                f,
                " Image[{}x{} {}/{} bytes]",
                image.width,
                image.height,
                image.bytes_written,
                image.expected_bytes()
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_threshold_validation() {
        assert!(ThresholdValues::default().validate().is_ok());

        let bad = ThresholdValues {
            body: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = ThresholdValues {
            recognition: 1001,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_detection_size_validation() {
        assert!(DetectionSize::default().validate().is_ok());

        let bad = DetectionSize {
            min_face: 10,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = DetectionSize {
            min_body: 2000,
            max_body: 1000,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_detection_trigger_excludes_hands() {
        let result = ExecutionResult {
            body_count: 0,
            hand_count: 3,
            face_count: 0,
            image: None,
        };
        assert_eq!(result.detections(), 0);

        let result = ExecutionResult {
            body_count: 1,
            hand_count: 0,
            face_count: 2,
            image: None,
        };
        assert_eq!(result.detections(), 3);
    }

    #[test]
    fn test_version_display() {
        let info = VersionInfo {
            model: "HVC-P".to_string(),
            major: 1,
            minor: 2,
            release: 3,
            revision: [0xAB, 0xCD, 0x00, 0x01],
        };
        assert_eq!(info.to_string(), "HVC-P v1.2.3 (rev abcd0001)");
    }
}
