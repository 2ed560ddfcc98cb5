//! HVC frame structure and encoding/decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    constants::SYNC_CODE,
    error::{Error, Result},
    opcode::Opcode,
    wire,
};

/// Outbound command frame
///
/// # Frame Structure
///
/// ```text
/// ┌─────────────┬─────────────┬─────────────┬─────────────┬─────────────┐
/// │    Sync     │   Opcode    │  Length LSB │  Length MSB │   Payload   │
/// │   1 byte    │   1 byte    │   1 byte    │   1 byte    │   N bytes   │
/// │   (0xFE)    │             │      (LE u16 length)      │             │
/// └─────────────┴─────────────┴─────────────┴─────────────┴─────────────┘
/// ```
///
/// The length field is little-endian on the wire regardless of host
/// endianness. Note the asymmetry with [`ResponseHeader`]: outbound
/// lengths are 2 bytes, inbound lengths are 4.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use hvcp_core::{Frame, Opcode};
///
/// let frame = Frame::new(Opcode::GetVersion, Bytes::new()).unwrap();
/// let encoded = frame.encode();
/// assert_eq!(&encoded[..], &[0xFE, 0x00, 0x00, 0x00]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command opcode
    pub opcode: Opcode,

    /// Command payload (0..28 bytes)
    pub payload: Bytes,
}

impl Frame {
    /// Frame header size in bytes (sync + opcode + 2-byte length)
    pub const HEADER_SIZE: usize = 4;

    /// Maximum payload size accepted by the device send buffer
    pub const MAX_PAYLOAD_SIZE: usize = 28;

    /// Create a new frame
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the payload exceeds
    /// [`Self::MAX_PAYLOAD_SIZE`]. This is rejected before any I/O.
    pub fn new(opcode: Opcode, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();

        if payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self { opcode, payload })
    }

    /// Encode frame to wire bytes
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::HEADER_SIZE + self.payload.len());

        let (lsb, msb) = wire::u16_to_lsb_msb(self.payload.len() as u16);

        buf.put_u8(SYNC_CODE);
        buf.put_u8(self.opcode.into());
        buf.put_u8(lsb);
        buf.put_u8(msb);
        buf.put_slice(&self.payload);

        buf
    }

    /// Get total frame size on the wire
    pub fn size(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("opcode", &self.opcode)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Inbound response header
///
/// # Header Structure
///
/// ```text
/// ┌─────────────┬─────────────┬───────────────────────────┐
/// │    Sync     │   Status    │      Payload Length       │
/// │   1 byte    │   1 byte    │     4 bytes (LE u32)      │
/// │   (0xFE)    │ (0x00 = OK) │                           │
/// └─────────────┴─────────────┴───────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Sync code, must equal [`SYNC_CODE`] for a valid response
    pub sync_code: u8,

    /// Device status byte, zero on success
    pub status: u8,

    /// Length of the payload following the header
    pub payload_length: u32,
}

impl ResponseHeader {
    /// Header size in bytes
    pub const SIZE: usize = 6;

    /// Decode a header from exactly [`Self::SIZE`] bytes
    ///
    /// Pure transform, no validation beyond length. Use [`validate`]
    /// to check sync and status.
    ///
    /// [`validate`]: Self::validate
    ///
    /// # Examples
    ///
    /// ```
    /// use hvcp_core::ResponseHeader;
    ///
    /// let header = ResponseHeader::decode(&[0xFE, 0x00, 0x13, 0x00, 0x00, 0x00]).unwrap();
    /// assert_eq!(header.payload_length, 19);
    /// ```
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            return Err(Error::HeaderTooShort {
                expected: Self::SIZE,
                actual: buf.len(),
            });
        }

        let mut buf = &buf[..Self::SIZE];
        let sync_code = buf.get_u8();
        let status = buf.get_u8();
        let payload_length = buf.get_u32_le();

        Ok(Self {
            sync_code,
            status,
            payload_length,
        })
    }

    /// Encode a header to wire bytes (used by tests and mock devices)
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_u8(self.sync_code);
        buf.put_u8(self.status);
        buf.put_u32_le(self.payload_length);
        buf
    }

    /// Validate sync code and device status
    ///
    /// # Errors
    ///
    /// - [`Error::BadSync`] if the sync code mismatches [`SYNC_CODE`]
    /// - [`Error::DeviceError`] if the status byte is nonzero
    ///
    /// Payload decoding must not proceed after either failure.
    pub fn validate(&self) -> Result<()> {
        if self.sync_code != SYNC_CODE {
            return Err(Error::BadSync {
                expected: SYNC_CODE,
                received: self.sync_code,
            });
        }

        if self.status != 0x00 {
            return Err(Error::DeviceError {
                status: self.status,
            });
        }

        Ok(())
    }

    /// Check if the device reported success
    pub fn is_ok(&self) -> bool {
        self.sync_code == SYNC_CODE && self.status == 0x00
    }
}

impl fmt::Display for ResponseHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header[sync=0x{:02X}, status=0x{:02X}, len={}]",
            self.sync_code, self.status, self.payload_length
        )
    }
}
