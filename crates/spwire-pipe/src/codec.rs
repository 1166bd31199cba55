use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{PipeError, Result};

/// Size of the big-endian length prefix in front of every frame.
pub const LENGTH_PREFIX_SIZE: usize = 8;

/// Default upper bound on a received frame: 1 MiB.
///
/// Not mandated by the wire protocol; it only keeps a corrupt or hostile peer
/// from making us allocate whatever it declares.
pub const DEFAULT_MAX_MESSAGE_SIZE: u64 = 1024 * 1024;

/// Default deadline for the 8-byte header exchange.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// The unit exchanged over a pipe.
///
/// On the wire only the combined length travels, so a received message always
/// carries the whole payload in `body` and an empty `header`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Caller-defined bytes sent immediately after the length prefix.
    pub header: Bytes,
    /// The payload.
    pub body: Bytes,
}

impl Message {
    /// Create a message from a header and a body.
    pub fn new(header: impl Into<Bytes>, body: impl Into<Bytes>) -> Self {
        Self {
            header: header.into(),
            body: body.into(),
        }
    }

    /// Create a message with an empty header.
    pub fn from_body(body: impl Into<Bytes>) -> Self {
        Self {
            header: Bytes::new(),
            body: body.into(),
        }
    }

    /// The length that travels in the frame prefix (header + body).
    pub fn wire_len(&self) -> usize {
        self.header.len() + self.body.len()
    }
}

/// Configuration for a pipe.
#[derive(Debug, Clone)]
pub struct PipeConfig {
    /// Largest frame accepted on receive, in bytes. Default: 1 MiB.
    pub max_message_size: u64,
    /// Read timeout applied to the stream once the pipe is open.
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to the stream once the pipe is open.
    pub write_timeout: Option<Duration>,
    /// Read and write timeout applied only while the handshake runs.
    /// Default: 5s. `None` lets a silent peer block the handshake forever.
    pub handshake_timeout: Option<Duration>,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            read_timeout: None,
            write_timeout: None,
            handshake_timeout: Some(DEFAULT_HANDSHAKE_TIMEOUT),
        }
    }
}

/// Encode a frame length prefix (big-endian u64) into `dst`.
pub fn encode_length(len: u64, dst: &mut BytesMut) {
    dst.reserve(LENGTH_PREFIX_SIZE);
    dst.put_u64(len);
}

/// Decode a frame length prefix and check it against `max`.
///
/// The prefix is unsigned on the wire; values that would be negative as a
/// signed 64-bit quantity are rejected as well as values above `max`.
pub fn decode_length(prefix: [u8; LENGTH_PREFIX_SIZE], max: u64) -> Result<usize> {
    let size = (&prefix[..]).get_u64();
    if size > max || (size as i64) < 0 {
        return Err(PipeError::TooLong { size, max });
    }
    usize::try_from(size).map_err(|_| PipeError::TooLong { size, max })
}
