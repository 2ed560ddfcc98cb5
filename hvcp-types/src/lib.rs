//! Type definitions for hvcp

pub mod error;
pub mod response;

pub use error::{Error, Result};
pub use response::{
    DetectionSize, ExecutionResult, FaceAngle, ImageCapture, ThresholdValues, VersionInfo,
};
