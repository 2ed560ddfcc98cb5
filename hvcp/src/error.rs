//! High-level driver error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Core(#[from] hvcp_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] hvcp_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] hvcp_types::Error),

    /// The transport accepted fewer bytes than the frame required.
    /// Fatal for the call: re-sending risks double execution on the
    /// device, so the frame is never retried.
    #[error("Short write: {written}/{expected} bytes accepted")]
    ShortWrite {
        written: usize,
        expected: usize,
    },

    /// No response bytes arrived within the poll budget
    #[error("Timeout waiting for response after {polls} polls")]
    Timeout {
        polls: u32,
    },

    /// The response header was truncated
    #[error("Short header: only {read} of 6 bytes arrived")]
    ShortHeader {
        read: usize,
    },

    /// A payload field was truncated
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        expected: usize,
        actual: usize,
    },

    /// The caller's image sink failed while the drain was streaming
    #[error("Image sink error: {0}")]
    Sink(#[source] std::io::Error),
}

impl Error {
    /// Check if the failure was reported by the device rather than
    /// produced by the link
    pub fn is_device_reported(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_device_reported())
    }
}
