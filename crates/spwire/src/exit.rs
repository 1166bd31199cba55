use std::fmt;
use std::io;

use spwire::pipe::PipeError;
use spwire::transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        TransportError::InvalidAddress(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn pipe_error(context: &str, err: PipeError) -> CliError {
    match err {
        PipeError::Io(source) => io_error(context, source),
        PipeError::Transport(err) => transport_error(context, err),
        PipeError::BadHeader | PipeError::BadVersion { .. } | PipeError::TooLong { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        PipeError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_map_to_data_invalid() {
        assert_eq!(pipe_error("recv", PipeError::BadHeader).code, DATA_INVALID);
        assert_eq!(
            pipe_error("recv", PipeError::BadVersion { version: 1 }).code,
            DATA_INVALID
        );
        let err = pipe_error("recv", PipeError::TooLong { size: 10, max: 5 });
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("recv: "));
    }

    #[test]
    fn io_errors_keep_their_kind_mapping() {
        let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
        assert_eq!(pipe_error("recv", PipeError::Io(eof)).code, FAILURE);
        let timeout = io::Error::from(io::ErrorKind::WouldBlock);
        assert_eq!(pipe_error("recv", PipeError::Io(timeout)).code, TIMEOUT);
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(pipe_error("recv", PipeError::Io(denied)).code, PERMISSION_DENIED);
    }

    #[test]
    fn transport_errors_unwrap_io_source() {
        let err = TransportError::Connect {
            addr: "tcp://127.0.0.1:1".to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(pipe_error("dial", PipeError::Transport(err)).code, FAILURE);
        let unsupported = TransportError::Unsupported("ipc");
        assert_eq!(transport_error("bind", unsupported).code, TRANSPORT_ERROR);
        let invalid = TransportError::InvalidAddress("nope".to_string());
        assert_eq!(transport_error("parse", invalid).code, USAGE);
    }

    #[test]
    fn closed_pipe_is_plain_failure() {
        assert_eq!(pipe_error("send", PipeError::Closed).code, FAILURE);
    }
}
