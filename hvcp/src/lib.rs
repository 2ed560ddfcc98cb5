//! # hvcp
//!
//! Driver for the Omron HVC-P vision sensor over a byte-stream serial
//! link.
//!
//! ## Features
//!
//! - Typed command API for every sensor operation
//! - Async/await API using Tokio, cooperative polling (no busy spins)
//! - Streaming image drain with bounded memory and partial-failure
//!   tolerance
//! - Background monitor task publishing detection events
//!
//! ## Quick Start
//!
//! ```no_run
//! use hvcp::{Device, ExecutionFlags};
//! use hvcp_transport::SerialTransport;
//!
//! #[tokio::main]
//! async fn main() -> hvcp::Result<()> {
//!     let transport = SerialTransport::open("/dev/ttyUSB0", 921_600)?;
//!     let mut device = Device::new(transport);
//!
//!     let version = device.get_version().await?;
//!     println!("Sensor: {}", version);
//!
//!     let result = device
//!         .execute(ExecutionFlags::BODY_DETECTION | ExecutionFlags::FACE_DETECTION)
//!         .await?;
//!     println!("{}", result);
//!
//!     Ok(())
//! }
//! ```

mod decode;

pub mod device;
pub mod error;
pub mod event;
pub mod monitor;

// Re-exports
pub use device::Device;
pub use error::{Error, Result};
pub use event::Event;
pub use monitor::{Monitor, MonitorConfig};

// Re-export protocol types
pub use hvcp_core::{
    CameraAngle, ExecutionFlags, ImageOption, Opcode, RetryPolicy, RollAngle, YawAngle,
};
pub use hvcp_types::{
    DetectionSize, ExecutionResult, FaceAngle, ImageCapture, ThresholdValues, VersionInfo,
};
