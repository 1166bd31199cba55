//! SP pipe: handshake and message framing over a reliable byte stream.
//!
//! This is the lowest layer of a Scalable Protocols stack. A pipe wraps one
//! connected stream and:
//! - exchanges the fixed 8-byte SP header so both ends learn each other's
//!   protocol number
//! - frames every message as a big-endian u64 length followed by the header
//!   and body bytes
//! - keeps concurrent sends (and concurrent receives) from interleaving while
//!   letting a send and a receive run at the same time
//!
//! Message semantics, multiplexing many pipes, and reconnecting are left to
//! the socket layer above.

pub mod codec;
pub mod connector;
pub mod error;
pub mod handshake;
pub mod listener;
pub mod pipe;
pub mod protocol;
pub mod reader;
pub mod writer;

pub use codec::{
    Message, PipeConfig, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_MAX_MESSAGE_SIZE, LENGTH_PREFIX_SIZE,
};
pub use connector::{dial, dial_with_config};
pub use error::{PipeError, Result};
pub use handshake::ConnHeader;
pub use listener::PipeListener;
pub use pipe::{Pipe, StreamPipe};
pub use reader::MessageReader;
pub use writer::MessageWriter;
