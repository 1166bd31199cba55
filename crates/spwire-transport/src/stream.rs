use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

/// A connected, reliable, ordered byte stream.
///
/// Handles returned by [`Stream::try_clone`] refer to the same connection, so a
/// reader and a writer can run on separate clones at the same time, and
/// [`Stream::shutdown`] on any clone unblocks I/O pending on the others.
pub trait Stream: Read + Write + Send + Sync + Sized + 'static {
    /// Create another handle to the same connection.
    fn try_clone(&self) -> io::Result<Self>;

    /// Shut down both directions of the connection.
    fn shutdown(&self) -> io::Result<()>;

    /// Set read timeout on the underlying connection.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Set write timeout on the underlying connection.
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

impl Stream for TcpStream {
    fn try_clone(&self) -> io::Result<Self> {
        TcpStream::try_clone(self)
    }

    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }
}

#[cfg(unix)]
impl Stream for UnixStream {
    fn try_clone(&self) -> io::Result<Self> {
        UnixStream::try_clone(self)
    }

    fn shutdown(&self) -> io::Result<()> {
        UnixStream::shutdown(self, Shutdown::Both)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        UnixStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        UnixStream::set_write_timeout(self, timeout)
    }
}

/// A connected stream from any supported transport.
///
/// This is the stream type produced by [`crate::Listener::accept`] and
/// [`crate::connect`].
pub struct SpStream {
    inner: SpStreamInner,
}

enum SpStreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Read for SpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            SpStreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            SpStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for SpStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            SpStreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            SpStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            SpStreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            SpStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl Stream for SpStream {
    fn try_clone(&self) -> io::Result<Self> {
        let inner = match &self.inner {
            SpStreamInner::Tcp(stream) => SpStreamInner::Tcp(stream.try_clone()?),
            #[cfg(unix)]
            SpStreamInner::Unix(stream) => SpStreamInner::Unix(stream.try_clone()?),
        };
        Ok(Self { inner })
    }

    fn shutdown(&self) -> io::Result<()> {
        match &self.inner {
            SpStreamInner::Tcp(stream) => Stream::shutdown(stream),
            #[cfg(unix)]
            SpStreamInner::Unix(stream) => Stream::shutdown(stream),
        }
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match &self.inner {
            SpStreamInner::Tcp(stream) => stream.set_read_timeout(timeout),
            #[cfg(unix)]
            SpStreamInner::Unix(stream) => stream.set_read_timeout(timeout),
        }
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match &self.inner {
            SpStreamInner::Tcp(stream) => stream.set_write_timeout(timeout),
            #[cfg(unix)]
            SpStreamInner::Unix(stream) => stream.set_write_timeout(timeout),
        }
    }
}

impl SpStream {
    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: SpStreamInner::Tcp(stream),
        }
    }

    #[cfg(unix)]
    pub(crate) fn from_unix(stream: UnixStream) -> Self {
        Self {
            inner: SpStreamInner::Unix(stream),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            SpStreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            SpStreamInner::Unix(_) => "ipc",
        }
    }

    /// Get the credentials of the connected peer (Linux Unix sockets only).
    ///
    /// Returns `(uid, gid, pid)` via `SO_PEERCRED`, or `None` if unavailable.
    #[cfg(target_os = "linux")]
    pub fn peer_credentials(&self) -> Option<(u32, u32, u32)> {
        use std::os::fd::AsRawFd;

        let fd = match &self.inner {
            SpStreamInner::Unix(stream) => stream.as_raw_fd(),
            SpStreamInner::Tcp(_) => return None,
        };

        let mut cred = libc::ucred {
            pid: 0,
            uid: 0,
            gid: 0,
        };
        let mut len = std::mem::size_of::<libc::ucred>() as libc::socklen_t;

        // SAFETY: `cred` and `len` are valid writable pointers for the provided sizes,
        // and `fd` is an open Unix socket descriptor owned by this stream.
        let rc = unsafe {
            libc::getsockopt(
                fd,
                libc::SOL_SOCKET,
                libc::SO_PEERCRED,
                (&mut cred as *mut libc::ucred).cast::<libc::c_void>(),
                &mut len,
            )
        };

        if rc == 0 && len as usize == std::mem::size_of::<libc::ucred>() {
            Some((cred.uid, cred.gid, cred.pid as u32))
        } else {
            None
        }
    }

    /// Get the credentials of the connected peer.
    ///
    /// Returns `None` on platforms that do not expose peer credentials.
    #[cfg(not(target_os = "linux"))]
    pub fn peer_credentials(&self) -> Option<(u32, u32, u32)> {
        None
    }
}

impl std::fmt::Debug for SpStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpStream")
            .field("type", &self.transport_name())
            .finish()
    }
}
