use std::fmt;

use crate::addr::Address;
#[cfg(not(unix))]
use crate::error::TransportError;
use crate::error::Result;
use crate::stream::SpStream;
use crate::tcp::TcpTransport;
#[cfg(unix)]
use crate::uds::UnixDomainSocket;

/// A bound listener for any supported [`Address`].
pub enum Listener {
    /// `tcp://` listener.
    Tcp(TcpTransport),
    /// `ipc://` listener.
    #[cfg(unix)]
    Ipc(UnixDomainSocket),
}

impl Listener {
    /// Bind and listen on `addr`.
    pub fn bind(addr: &Address) -> Result<Self> {
        match addr {
            Address::Tcp(hostport) => Ok(Listener::Tcp(TcpTransport::bind(hostport)?)),
            #[cfg(unix)]
            Address::Ipc(path) => Ok(Listener::Ipc(UnixDomainSocket::bind(path)?)),
            #[cfg(not(unix))]
            Address::Ipc(_) => Err(TransportError::Unsupported("ipc")),
        }
    }

    /// Accept the next connection (blocking).
    pub fn accept(&self) -> Result<SpStream> {
        match self {
            Listener::Tcp(listener) => listener.accept(),
            #[cfg(unix)]
            Listener::Ipc(listener) => listener.accept(),
        }
    }

    /// The address this listener is reachable at.
    ///
    /// For TCP this reflects the actually bound port.
    pub fn local_address(&self) -> Address {
        match self {
            Listener::Tcp(listener) => Address::Tcp(listener.local_addr().to_string()),
            #[cfg(unix)]
            Listener::Ipc(listener) => Address::Ipc(listener.path().to_path_buf()),
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("address", &self.local_address().to_string())
            .finish()
    }
}

/// Connect to `addr` (blocking).
pub fn connect(addr: &Address) -> Result<SpStream> {
    match addr {
        Address::Tcp(hostport) => TcpTransport::connect(hostport),
        #[cfg(unix)]
        Address::Ipc(path) => UnixDomainSocket::connect(path),
        #[cfg(not(unix))]
        Address::Ipc(_) => Err(TransportError::Unsupported("ipc")),
    }
}
