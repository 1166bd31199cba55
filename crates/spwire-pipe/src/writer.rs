use std::io::Write;

use bytes::BytesMut;

use crate::codec::{encode_length, Message, LENGTH_PREFIX_SIZE};
use crate::error::Result;

/// Writes complete messages to any `Write` stream.
///
/// A failed write leaves the peer's framing in an unknown state; the
/// connection must be treated as broken afterwards.
pub struct MessageWriter<T> {
    inner: T,
    prefix: BytesMut,
}

impl<T: Write> MessageWriter<T> {
    /// Create a new message writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            prefix: BytesMut::with_capacity(LENGTH_PREFIX_SIZE),
        }
    }

    /// Write one message: length prefix, header bytes, body bytes (blocking).
    pub fn write_message(&mut self, msg: &Message) -> Result<()> {
        self.prefix.clear();
        encode_length(msg.wire_len() as u64, &mut self.prefix);

        self.inner.write_all(&self.prefix)?;
        self.inner.write_all(&msg.header)?;
        self.inner.write_all(&msg.body)?;
        self.inner.flush()?;
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::PipeError;
    use crate::reader::MessageReader;

    #[test]
    fn writes_prefix_header_body() {
        let mut writer = MessageWriter::new(Vec::new());
        writer
            .write_message(&Message::new(&b"hd"[..], &b"body"[..]))
            .unwrap();

        let wire = writer.into_inner();
        assert_eq!(&wire[..8], &6u64.to_be_bytes());
        assert_eq!(&wire[8..], b"hdbody");
    }

    #[test]
    fn empty_message_is_prefix_only() {
        let mut writer = MessageWriter::new(Vec::new());
        writer.write_message(&Message::default()).unwrap();
        assert_eq!(writer.into_inner(), vec![0u8; 8]);
    }

    #[test]
    fn written_frames_read_back_concatenated() {
        let mut writer = MessageWriter::new(Vec::new());
        writer
            .write_message(&Message::new(&b"req-id:"[..], &b"42"[..]))
            .unwrap();
        writer
            .write_message(&Message::from_body(&b"second"[..]))
            .unwrap();

        let mut reader = MessageReader::new(Cursor::new(writer.into_inner()));
        assert_eq!(reader.read_message().unwrap().body.as_ref(), b"req-id:42");
        assert_eq!(reader.read_message().unwrap().body.as_ref(), b"second");
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = MessageWriter::new(sink);

        writer.write_message(&Message::from_body(&b"x"[..])).unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn zero_length_write_is_io_error() {
        let mut writer = MessageWriter::new(ZeroWriter);
        let err = writer
            .write_message(&Message::from_body(&b"x"[..]))
            .unwrap_err();
        assert!(matches!(err, PipeError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[test]
    fn interrupted_write_retries() {
        let mut writer = MessageWriter::new(InterruptedOnce {
            interrupted: false,
            data: Vec::new(),
        });
        writer
            .write_message(&Message::from_body(&b"retry"[..]))
            .unwrap();
        assert_eq!(writer.into_inner().data.len(), 8 + 5);
    }

    #[test]
    fn broken_pipe_surfaces_verbatim() {
        let mut writer = MessageWriter::new(BrokenWriter);
        let err = writer.write_message(&Message::default()).unwrap_err();
        assert!(matches!(err, PipeError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = MessageWriter::new(Vec::<u8>::new());
        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptedOnce {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedOnce {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
