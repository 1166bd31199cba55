use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::TransportError;

const TCP_SCHEME: &str = "tcp://";
const IPC_SCHEME: &str = "ipc://";

/// A transport endpoint address.
///
/// ```text
/// tcp://127.0.0.1:5555
/// ipc:///tmp/spwire.sock
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// TCP endpoint in `host:port` form.
    Tcp(String),
    /// Unix domain socket path.
    Ipc(PathBuf),
}

impl Address {
    /// Transport name for diagnostics.
    pub fn scheme(&self) -> &'static str {
        match self {
            Address::Tcp(_) => "tcp",
            Address::Ipc(_) => "ipc",
        }
    }
}

impl FromStr for Address {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix(TCP_SCHEME) {
            // Port is mandatory.
            match rest.rsplit_once(':') {
                Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                    return Ok(Address::Tcp(rest.to_string()));
                }
                _ => return Err(TransportError::InvalidAddress(s.to_string())),
            }
        }

        if let Some(rest) = s.strip_prefix(IPC_SCHEME) {
            if rest.is_empty() {
                return Err(TransportError::InvalidAddress(s.to_string()));
            }
            return Ok(Address::Ipc(PathBuf::from(rest)));
        }

        Err(TransportError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Tcp(hostport) => write!(f, "{TCP_SCHEME}{hostport}"),
            Address::Ipc(path) => write!(f, "{IPC_SCHEME}{}", path.display()),
        }
    }
}
