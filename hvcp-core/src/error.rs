//! Error types for hvcp-core

/// Result type alias for core protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command payload exceeds the device send buffer
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// Response header buffer is too short to decode
    #[error("Header too short: expected {expected} bytes, got {actual} bytes")]
    HeaderTooShort {
        expected: usize,
        actual: usize,
    },

    /// Response header carried the wrong sync code
    #[error("Invalid sync code: expected 0x{expected:02X}, received 0x{received:02X}")]
    BadSync {
        expected: u8,
        received: u8,
    },

    /// Device rejected the command with a nonzero status
    #[error("Device returned error status 0x{status:02X}")]
    DeviceError {
        status: u8,
    },

    /// Unknown opcode
    #[error("Unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    /// A field decoded to a value outside its defined set
    #[error("Unexpected {field} value: 0x{value:02X}")]
    UnexpectedValue {
        field: &'static str,
        value: u8,
    },
}

impl Error {
    /// Check if this error was reported by the device itself
    /// (as opposed to a malformed or truncated response)
    pub fn is_device_reported(&self) -> bool {
        matches!(self, Self::DeviceError { .. })
    }
}
