use std::net::{SocketAddr, TcpListener, TcpStream};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::SpStream;

/// TCP listener for `tcp://` addresses.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `host:port`.
    pub fn bind(hostport: &str) -> Result<Self> {
        let bind_err = |source| TransportError::Bind {
            addr: hostport.to_string(),
            source,
        };
        let listener = TcpListener::bind(hostport).map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        info!(%local_addr, "listening on tcp");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<SpStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        // Frames are written as several small writes; don't let Nagle hold them back.
        stream.set_nodelay(true)?;
        debug!(%peer, "accepted tcp connection");
        Ok(SpStream::from_tcp(stream))
    }

    /// Connect to `host:port` (blocking).
    pub fn connect(hostport: &str) -> Result<SpStream> {
        let stream = TcpStream::connect(hostport).map_err(|source| TransportError::Connect {
            addr: hostport.to_string(),
            source,
        })?;
        stream.set_nodelay(true)?;
        debug!(hostport, "connected to tcp endpoint");
        Ok(SpStream::from_tcp(stream))
    }

    /// The locally bound socket address (useful after binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
