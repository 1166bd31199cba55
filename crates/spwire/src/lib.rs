//! Scalable Protocols pipes over reliable byte streams.
//!
//! # Crate Structure
//!
//! - [`transport`] - connected byte streams (TCP, Unix domain sockets)
//! - [`pipe`] - SP handshake, message framing and the `Pipe` abstraction

/// Re-export transport types.
pub mod transport {
    pub use spwire_transport::*;
}

/// Re-export pipe types.
pub mod pipe {
    pub use spwire_pipe::*;
}
