//! Transport layer for the HVC-P driver
//!
//! Provides the byte-stream interface the command executor drives, plus a
//! serial implementation and a scripted mock for tests.
//!
//! Transfers are best-effort: short reads and writes are reported to the
//! caller, never retried transparently. The executor owns retry decisions.

pub mod error;
pub mod mock;
pub mod serial;

pub use error::{Error, Result};
pub use mock::MockTransport;
pub use serial::SerialTransport;

use async_trait::async_trait;

/// Byte-stream link to the sensor
///
/// One transport carries exactly one in-flight command at a time; the
/// protocol has no request identifiers to disambiguate interleaved
/// responses, so callers must serialize access.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write raw bytes, returning how many were accepted
    async fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read up to `buf.len()` bytes, returning how many arrived
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Number of bytes ready to read without blocking
    async fn available(&mut self) -> Result<usize>;

    /// Human-readable link name for logging
    fn port_name(&self) -> String;
}
