/// Errors that can occur on an SP pipe.
///
/// Every error is terminal for the pipe: callers close it and, if they want,
/// establish a new connection.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// The underlying stream failed, including peer disconnect.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The peer's handshake failed the reserved/magic byte checks.
    #[error("bad SP header")]
    BadHeader,

    /// The peer's handshake carries an unsupported wire version.
    #[error("bad SP version {version}")]
    BadVersion { version: u8 },

    /// The peer declared a frame longer than the configured bound.
    #[error("message too long ({size} bytes, max {max})")]
    TooLong { size: u64, max: u64 },

    /// The pipe has been closed.
    #[error("pipe closed")]
    Closed,

    /// Establishing the underlying connection failed.
    #[error("transport error: {0}")]
    Transport(#[from] spwire_transport::TransportError),
}

impl PipeError {
    /// True for the protocol-level errors that force the stream closed.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            PipeError::BadHeader | PipeError::BadVersion { .. } | PipeError::TooLong { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipeError>;
