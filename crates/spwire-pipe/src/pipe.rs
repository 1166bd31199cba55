use std::fmt;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use spwire_transport::Stream;
use tracing::debug;

use crate::codec::{Message, PipeConfig};
use crate::error::{PipeError, Result};
use crate::handshake;
use crate::reader::MessageReader;
use crate::writer::MessageWriter;

/// One handshake-negotiated, framed connection between two SP endpoints.
///
/// This is what a socket layer holds for every connected peer. Sends are
/// serialized against other sends and receives against other receives, but a
/// send and a receive can run at the same time.
pub trait Pipe: Send + Sync {
    /// Send one message. Concurrent sends never interleave on the wire.
    fn send(&self, msg: Message) -> Result<()>;

    /// Receive one complete message. The whole payload arrives as the body.
    fn recv(&self) -> Result<Message>;

    /// Close the pipe and the underlying stream.
    ///
    /// Calls blocked in `send` or `recv` are woken by the stream shutdown and
    /// return an error. Closing an already closed pipe is a no-op.
    fn close(&self) -> Result<()>;

    /// Our protocol number.
    fn local_protocol(&self) -> u16;

    /// The peer's protocol number, as announced in its handshake.
    fn remote_protocol(&self) -> u16;

    /// True after a successful handshake until the pipe is closed.
    ///
    /// Not synchronized with a concurrent `close`; the answer may be stale.
    fn is_open(&self) -> bool;
}

/// [`Pipe`] over any connected [`Stream`].
///
/// The stream is cloned into a read half and a write half, each behind its
/// own lock. A third handle is kept to shut the connection down.
pub struct StreamPipe<S> {
    reader: Mutex<MessageReader<S>>,
    writer: Mutex<MessageWriter<S>>,
    control: S,
    local_proto: u16,
    remote_proto: u16,
    open: AtomicBool,
}

impl<S: Stream> StreamPipe<S> {
    /// Perform the SP handshake on `stream` with default configuration.
    ///
    /// Only returns once the handshake has completed. On failure the stream is
    /// shut down and dropped.
    pub fn new(stream: S, local_proto: u16) -> Result<Self> {
        Self::with_config(stream, local_proto, PipeConfig::default())
    }

    /// Perform the SP handshake on `stream` with explicit configuration.
    pub fn with_config(stream: S, local_proto: u16, config: PipeConfig) -> Result<Self> {
        let (read_half, write_half, remote_proto) =
            match Self::establish(&stream, local_proto, &config) {
                Ok(parts) => parts,
                Err(err) => {
                    debug!(local = local_proto, error = %err, "sp handshake failed");
                    let _ = stream.shutdown();
                    return Err(err);
                }
            };

        Ok(Self {
            reader: Mutex::new(MessageReader::with_config(read_half, &config)),
            writer: Mutex::new(MessageWriter::new(write_half)),
            control: stream,
            local_proto,
            remote_proto,
            open: AtomicBool::new(true),
        })
    }

    fn establish(stream: &S, local_proto: u16, config: &PipeConfig) -> Result<(S, S, u16)> {
        let mut read_half = stream.try_clone()?;
        let mut write_half = stream.try_clone()?;

        // The handshake gets its own deadline; steady-state timeouts come after.
        if config.handshake_timeout.is_some() {
            stream.set_read_timeout(config.handshake_timeout)?;
            stream.set_write_timeout(config.handshake_timeout)?;
        }

        let remote_proto = handshake::exchange(&mut read_half, &mut write_half, local_proto)?;

        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;

        Ok((read_half, write_half, remote_proto))
    }

    /// Borrow the underlying stream, e.g. for peer credentials.
    pub fn get_ref(&self) -> &S {
        &self.control
    }

    fn lock_reader(&self) -> MutexGuard<'_, MessageReader<S>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_writer(&self) -> MutexGuard<'_, MessageWriter<S>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn shutdown_stream(&self) -> Result<()> {
        match self.control.shutdown() {
            Ok(()) => Ok(()),
            // Peer already tore the connection down.
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl<S: Stream> Pipe for StreamPipe<S> {
    fn send(&self, msg: Message) -> Result<()> {
        if !self.is_open() {
            return Err(PipeError::Closed);
        }
        self.lock_writer().write_message(&msg)
    }

    fn recv(&self) -> Result<Message> {
        if !self.is_open() {
            return Err(PipeError::Closed);
        }

        let mut reader = self.lock_reader();
        match reader.read_message() {
            Err(err @ PipeError::TooLong { .. }) => {
                // Framing is lost; nothing after this point can be trusted.
                debug!(error = %err, "rejecting frame and closing pipe");
                self.open.store(false, Ordering::Release);
                let _ = self.shutdown_stream();
                Err(err)
            }
            other => other,
        }
    }

    fn close(&self) -> Result<()> {
        if !self.open.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        debug!(
            local = self.local_proto,
            remote = self.remote_proto,
            "closing sp pipe"
        );
        self.shutdown_stream()
    }

    fn local_protocol(&self) -> u16 {
        self.local_proto
    }

    fn remote_protocol(&self) -> u16 {
        self.remote_proto
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }
}

impl<S> fmt::Debug for StreamPipe<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamPipe")
            .field("local_proto", &self.local_proto)
            .field("remote_proto", &self.remote_proto)
            .field("open", &self.open.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
