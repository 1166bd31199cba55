use std::io::Read;

use bytes::{Bytes, BytesMut};

use crate::codec::{decode_length, Message, PipeConfig, LENGTH_PREFIX_SIZE};
use crate::error::Result;

/// Reads complete messages from any `Read` stream.
///
/// Never returns a partial message: a short read surfaces as an I/O error.
pub struct MessageReader<T> {
    inner: T,
    max_message_size: u64,
}

impl<T: Read> MessageReader<T> {
    /// Create a new message reader with the default size bound.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, &PipeConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: T, config: &PipeConfig) -> Self {
        Self {
            inner,
            max_message_size: config.max_message_size,
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// The whole payload is returned as the body; header and body are not
    /// distinguishable on the wire.
    pub fn read_message(&mut self) -> Result<Message> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        self.inner.read_exact(&mut prefix)?;

        let len = decode_length(prefix, self.max_message_size)?;

        let mut body = BytesMut::zeroed(len);
        self.inner.read_exact(&mut body)?;

        Ok(Message {
            header: Bytes::new(),
            body: body.freeze(),
        })
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current receive bound.
    pub fn max_message_size(&self) -> u64 {
        self.max_message_size
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};

    use bytes::BufMut;

    use super::*;
    use crate::codec::DEFAULT_MAX_MESSAGE_SIZE;
    use crate::error::PipeError;

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut wire = BytesMut::new();
        wire.put_u64(payload.len() as u64);
        wire.put_slice(payload);
        wire.to_vec()
    }

    #[test]
    fn read_single_message() {
        let mut reader = MessageReader::new(Cursor::new(frame(b"hello")));
        let msg = reader.read_message().unwrap();

        assert!(msg.header.is_empty());
        assert_eq!(msg.body.as_ref(), b"hello");
    }

    #[test]
    fn read_multiple_messages() {
        let mut wire = frame(b"one");
        wire.extend(frame(b"two"));
        wire.extend(frame(b""));

        let mut reader = MessageReader::new(Cursor::new(wire));

        assert_eq!(reader.read_message().unwrap().body.as_ref(), b"one");
        assert_eq!(reader.read_message().unwrap().body.as_ref(), b"two");
        assert!(reader.read_message().unwrap().body.is_empty());
    }

    #[test]
    fn partial_reads_are_reassembled() {
        let byte_reader = ByteByByteReader {
            bytes: frame(b"slow"),
            pos: 0,
        };
        let mut reader = MessageReader::new(byte_reader);

        assert_eq!(reader.read_message().unwrap().body.as_ref(), b"slow");
    }

    #[test]
    fn eof_before_prefix_is_io_error() {
        let mut reader = MessageReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, PipeError::Io(e) if e.kind() == ErrorKind::UnexpectedEof));
    }

    #[test]
    fn eof_mid_body_is_io_error() {
        let mut wire = BytesMut::new();
        wire.put_u64(16);
        wire.put_slice(b"only-part");

        let mut reader = MessageReader::new(Cursor::new(wire.to_vec()));
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, PipeError::Io(e) if e.kind() == ErrorKind::UnexpectedEof));
    }

    #[test]
    fn oversized_frame_rejected_before_allocation() {
        let mut wire = BytesMut::new();
        wire.put_u64(1024);

        let cfg = PipeConfig {
            max_message_size: 16,
            ..PipeConfig::default()
        };
        let mut reader = MessageReader::with_config(Cursor::new(wire.to_vec()), &cfg);
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, PipeError::TooLong { size: 1024, max: 16 }));
    }

    #[test]
    fn negative_length_rejected() {
        let mut wire = BytesMut::new();
        wire.put_i64(-1);

        let mut reader = MessageReader::new(Cursor::new(wire.to_vec()));
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, PipeError::TooLong { .. }));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            interrupted: false,
            bytes: frame(b"ok"),
            pos: 0,
        };
        let mut framed = MessageReader::new(reader);

        assert_eq!(framed.read_message().unwrap().body.as_ref(), b"ok");
    }

    #[test]
    fn would_block_propagates_io_error() {
        let mut framed = MessageReader::new(AlwaysWouldBlock);
        let err = framed.read_message().unwrap_err();
        assert!(matches!(err, PipeError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = MessageReader::new(Cursor::new(Vec::<u8>::new()));
        assert_eq!(reader.max_message_size(), DEFAULT_MAX_MESSAGE_SIZE);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct AlwaysWouldBlock;

    impl Read for AlwaysWouldBlock {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }
    }
}
