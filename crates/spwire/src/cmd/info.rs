use std::io;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use spwire::pipe::protocol::{is_compatible, protocol_name};
use spwire::pipe::{dial_with_config, Pipe, PipeConfig, PipeError, StreamPipe};
use spwire::transport::{Address, SpStream, TransportError};

use crate::cmd::{parse_duration, InfoArgs};
use crate::exit::{pipe_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct ProtocolInfo {
    id: u16,
    name: &'static str,
}

impl ProtocolInfo {
    fn new(id: u16) -> Self {
        Self {
            id,
            name: protocol_name(id),
        }
    }
}

#[derive(Serialize)]
struct PeerCreds {
    uid: u32,
    gid: u32,
    pid: u32,
}

#[derive(Serialize)]
struct InfoOutput {
    address: String,
    transport: &'static str,
    local_protocol: ProtocolInfo,
    remote_protocol: ProtocolInfo,
    compatible: bool,
    peer_credentials: Option<PeerCreds>,
    connected: bool,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let config = PipeConfig {
        handshake_timeout: Some(timeout),
        ..args.pipe.config()
    };

    let pipe = dial_with_timeout(&args.address, args.pipe.protocol, &config, timeout)?;

    let peer_credentials = pipe
        .get_ref()
        .peer_credentials()
        .map(|(uid, gid, pid)| PeerCreds { uid, gid, pid });

    let out = InfoOutput {
        address: args.address.to_string(),
        transport: pipe.get_ref().transport_name(),
        local_protocol: ProtocolInfo::new(pipe.local_protocol()),
        remote_protocol: ProtocolInfo::new(pipe.remote_protocol()),
        compatible: is_compatible(pipe.local_protocol(), pipe.remote_protocol()),
        peer_credentials,
        connected: pipe.is_open(),
    };
    pipe.close()
        .map_err(|err| pipe_error("close failed", err))?;

    print_info(&out, format);
    Ok(SUCCESS)
}

fn dial_with_timeout(
    address: &Address,
    protocol: u16,
    config: &PipeConfig,
    timeout: Duration,
) -> CliResult<StreamPipe<SpStream>> {
    let start = Instant::now();
    loop {
        match dial_with_config(address, protocol, config.clone()) {
            Ok(pipe) => return Ok(pipe),
            Err(err) => {
                if !is_retryable_dial_error(&err) {
                    return Err(pipe_error("dial failed", err));
                }
                if start.elapsed() >= timeout {
                    return Err(CliError::new(
                        TIMEOUT,
                        format!("dial timed out after {timeout:?}"),
                    ));
                }
                thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

fn is_retryable_dial_error(err: &PipeError) -> bool {
    match err {
        PipeError::Transport(TransportError::Connect { source, .. }) => matches!(
            source.kind(),
            io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused
        ),
        _ => false,
    }
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Pipe Info:");
            println!("  Address:          {}", out.address);
            println!("  Transport:        {}", out.transport);
            println!(
                "  Local protocol:   {} ({:#06x})",
                out.local_protocol.name, out.local_protocol.id
            );
            println!(
                "  Remote protocol:  {} ({:#06x})",
                out.remote_protocol.name, out.remote_protocol.id
            );
            println!(
                "  Compatible:       {}",
                if out.compatible { "yes" } else { "no" }
            );
            match &out.peer_credentials {
                Some(c) => println!(
                    "  Peer credentials: uid={} gid={} pid={}",
                    c.uid, c.gid, c.pid
                ),
                None => println!("  Peer credentials: unavailable"),
            }
        }
        OutputFormat::Raw => {
            println!("{}", out.remote_protocol.id);
        }
    }
}
