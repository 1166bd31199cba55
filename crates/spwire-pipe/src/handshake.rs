//! The fixed 8-byte SP connection header exchange.
//!
//! ```text
//! ┌──────────┬─────┬─────┬─────────┬──────────────┬──────────┐
//! │ reserved │ 'S' │ 'P' │ version │ protocol     │ reserved │
//! │ 0x00     │ 0x53│ 0x50│ 0x00    │ (2B BE)      │ (2B) 0   │
//! └──────────┴─────┴─────┴─────────┴──────────────┴──────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};
use tracing::debug;

use crate::error::{PipeError, Result};

/// Size of the connection header.
pub const HEADER_SIZE: usize = 8;

/// Magic bytes: "SP" (0x53 0x50).
pub const MAGIC: [u8; 2] = *b"SP";

/// The only wire version this implementation speaks.
pub const VERSION: u8 = 0;

/// Connection header exchanged once by each side before any data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnHeader {
    /// Byte 0, must be zero.
    pub zero: u8,
    /// Bytes 1-2, must be `MAGIC`.
    pub magic: [u8; 2],
    /// Byte 3.
    pub version: u8,
    /// Bytes 4-5, the sender's protocol number.
    pub protocol: u16,
    /// Bytes 6-7, must be zero.
    pub reserved: u16,
}

impl ConnHeader {
    /// Header announcing `protocol` at the current wire version.
    pub fn new(protocol: u16) -> Self {
        Self {
            zero: 0,
            magic: MAGIC,
            version: VERSION,
            protocol,
            reserved: 0,
        }
    }

    /// Encode into wire bytes.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut dst = BytesMut::with_capacity(HEADER_SIZE);
        dst.put_u8(self.zero);
        dst.put_slice(&self.magic);
        dst.put_u8(self.version);
        dst.put_u16(self.protocol);
        dst.put_u16(self.reserved);

        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(&dst);
        out
    }

    /// Decode from wire bytes without validating any field.
    pub fn decode(raw: [u8; HEADER_SIZE]) -> Self {
        let mut src = &raw[..];
        let zero = src.get_u8();
        let magic = [src.get_u8(), src.get_u8()];
        let version = src.get_u8();
        let protocol = src.get_u16();
        let reserved = src.get_u16();
        Self {
            zero,
            magic,
            version,
            protocol,
            reserved,
        }
    }

    /// Check the reserved and magic bytes.
    pub fn check_header(&self) -> Result<()> {
        if self.zero != 0 || self.magic != MAGIC || self.reserved != 0 {
            return Err(PipeError::BadHeader);
        }
        Ok(())
    }

    /// Check the wire version.
    pub fn check_version(&self) -> Result<()> {
        if self.version != VERSION {
            return Err(PipeError::BadVersion {
                version: self.version,
            });
        }
        Ok(())
    }

    /// Run both checks in wire order: header first, then version.
    pub fn validate(&self) -> Result<()> {
        self.check_header()?;
        self.check_version()
    }
}

/// Send our header, then read and validate the peer's.
///
/// Both sides write before reading, so two peers can run this at the same
/// time as long as the stream buffers eight unread bytes. Returns the peer's
/// protocol number. The caller is responsible for closing the stream on error.
pub fn exchange<R: Read, W: Write>(reader: &mut R, writer: &mut W, local: u16) -> Result<u16> {
    writer.write_all(&ConnHeader::new(local).encode())?;
    writer.flush()?;

    let mut raw = [0u8; HEADER_SIZE];
    reader.read_exact(&mut raw)?;

    let peer = ConnHeader::decode(raw);
    peer.validate()?;

    debug!(local, remote = peer.protocol, "sp handshake complete");
    Ok(peer.protocol)
}
