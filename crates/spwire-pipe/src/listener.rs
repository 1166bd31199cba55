use spwire_transport::{Address, Listener, SpStream};
use tracing::debug;

use crate::codec::PipeConfig;
use crate::error::Result;
use crate::pipe::{Pipe, StreamPipe};

/// Listens for connections and hands each one to the pipe constructor.
pub struct PipeListener {
    listener: Listener,
    local_proto: u16,
    config: PipeConfig,
}

impl PipeListener {
    /// Bind to `addr`; accepted pipes announce `local_proto`.
    pub fn bind(addr: &Address, local_proto: u16) -> Result<Self> {
        Ok(Self {
            listener: Listener::bind(addr)?,
            local_proto,
            config: PipeConfig::default(),
        })
    }

    /// Override the configuration applied to accepted pipes.
    pub fn with_config(mut self, config: PipeConfig) -> Self {
        self.config = config;
        self
    }

    /// Accept the next connection and complete its handshake.
    ///
    /// A failed handshake is returned as an error; the listener itself stays
    /// usable. A peer that never sends its header is dropped once the
    /// configured handshake timeout expires.
    pub fn accept(&self) -> Result<StreamPipe<SpStream>> {
        let stream = self.listener.accept()?;
        let pipe = StreamPipe::with_config(stream, self.local_proto, self.config.clone())?;
        debug!(
            local = pipe.local_protocol(),
            remote = pipe.remote_protocol(),
            "accepted sp pipe"
        );
        Ok(pipe)
    }

    /// The address this listener is reachable at.
    pub fn local_address(&self) -> Address {
        self.listener.local_address()
    }

    /// Protocol number announced by accepted pipes.
    pub fn local_protocol(&self) -> u16 {
        self.local_proto
    }
}
