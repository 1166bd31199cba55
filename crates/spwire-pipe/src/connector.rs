use spwire_transport::{Address, SpStream};

use crate::codec::PipeConfig;
use crate::error::Result;
use crate::pipe::StreamPipe;

/// Connect to `addr` and perform the SP handshake as `local_proto`.
pub fn dial(addr: &Address, local_proto: u16) -> Result<StreamPipe<SpStream>> {
    dial_with_config(addr, local_proto, PipeConfig::default())
}

/// Connect with explicit configuration.
pub fn dial_with_config(
    addr: &Address,
    local_proto: u16,
    config: PipeConfig,
) -> Result<StreamPipe<SpStream>> {
    let stream = spwire_transport::connect(addr)?;
    StreamPipe::with_config(stream, local_proto, config)
}

#[cfg(all(test, unix))]
mod tests {
    use std::thread;

    use super::*;
    use crate::codec::Message;
    use crate::error::PipeError;
    use crate::listener::PipeListener;
    use crate::pipe::Pipe;
    use crate::protocol::{PULL, PUSH};

    #[test]
    fn dial_over_tcp() {
        let addr: Address = "tcp://127.0.0.1:0".parse().unwrap();
        let listener = PipeListener::bind(&addr, PULL).unwrap();
        let addr = listener.local_address();

        let server = thread::spawn(move || {
            let pipe = listener.accept().unwrap();
            assert_eq!(pipe.remote_protocol(), PUSH);
            pipe.recv().unwrap()
        });

        let pipe = dial(&addr, PUSH).unwrap();
        assert_eq!(pipe.remote_protocol(), PULL);
        pipe.send(Message::from_body(&b"work"[..])).unwrap();

        assert_eq!(server.join().unwrap().body.as_ref(), b"work");
    }

    #[test]
    fn dial_unreachable_is_transport_error() {
        let dir = std::env::temp_dir().join(format!("spwire-dial-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let addr = Address::Ipc(dir.join("nobody.sock"));

        let err = dial(&addr, PUSH).unwrap_err();
        assert!(matches!(err, PipeError::Transport(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
