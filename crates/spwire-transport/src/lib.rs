//! Reliable byte-stream transports for SP pipes.
//!
//! Establishing a connection is not the pipe's job. This crate supplies the
//! connected streams the pipe is built on:
//! - TCP (`tcp://host:port`)
//! - Unix domain sockets (`ipc:///path`, Unix only)
//!
//! Everything above builds on the [`Stream`] trait defined here.

pub mod addr;
pub mod endpoint;
pub mod error;
pub mod stream;
pub mod tcp;

#[cfg(unix)]
pub mod uds;

pub use addr::Address;
pub use endpoint::{connect, Listener};
pub use error::{Result, TransportError};
pub use stream::{SpStream, Stream};
pub use tcp::TcpTransport;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
