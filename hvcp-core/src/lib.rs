//! # hvcp-core
//!
//! Core protocol implementation for the Omron HVC-P vision sensor.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding, response header decoding
//! - Opcode definitions
//! - LSB/MSB wire helpers
//! - Retry/poll policy state machine
//! - Protocol constants (execution flags, image options, angles)

pub mod constants;
pub mod error;
pub mod frame;
pub mod opcode;
pub mod poll;
pub mod wire;

pub use constants::{
    CameraAngle, ExecutionFlags, ImageOption, RollAngle, YawAngle, SYNC_CODE,
};
pub use error::{Error, Result};
pub use frame::{Frame, ResponseHeader};
pub use opcode::Opcode;
pub use poll::{PollVerdict, PollWait, RetryPolicy};
