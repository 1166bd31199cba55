use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use spwire::pipe::protocol::{parse_protocol, PAIR};
use spwire::pipe::{
    PipeConfig, PipeError, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_MAX_MESSAGE_SIZE,
};
use spwire::transport::Address;

use crate::exit::{pipe_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod echo;
pub mod info;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept pipes and echo every message back.
    Echo(EchoArgs),
    /// Dial, send a single message, optionally wait for a reply.
    Send(SendArgs),
    /// Accept pipes and print received messages.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Dial, handshake and print the negotiated protocols.
    Info(InfoArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Echo(args) => echo::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Info(args) => info::run(args, format),
    }
}

/// Options shared by every command that opens a pipe.
#[derive(Args, Debug)]
pub struct PipeArgs {
    /// Local SP protocol: a name (req, pull, ...), decimal or 0x-prefixed hex.
    #[arg(long, short = 'p', default_value = "pair", value_parser = protocol_arg)]
    pub protocol: u16,
    /// Largest inbound message accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: u64,
    /// Deadline for the peer's SP header (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", value_parser = duration_arg)]
    pub handshake_timeout: Duration,
}

impl PipeArgs {
    pub fn config(&self) -> PipeConfig {
        PipeConfig {
            max_message_size: self.max_message_size,
            handshake_timeout: Some(self.handshake_timeout),
            ..PipeConfig::default()
        }
    }
}

impl Default for PipeArgs {
    fn default() -> Self {
        Self {
            protocol: PAIR,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Address to bind (tcp://host:port or ipc:///path).
    #[arg(value_parser = address_arg)]
    pub address: Address,
    #[command(flatten)]
    pub pipe: PipeArgs,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Address to dial.
    #[arg(value_parser = address_arg)]
    pub address: Address,
    #[command(flatten)]
    pub pipe: PipeArgs,
    /// Raw string body.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read body from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Protocol header bytes written ahead of the body.
    #[arg(long)]
    pub header: Option<String>,
    /// Wait for one reply message and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the reply when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind.
    #[arg(value_parser = address_arg)]
    pub address: Address,
    #[command(flatten)]
    pub pipe: PipeArgs,
    /// Exit after receiving N messages.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Address to dial.
    #[arg(value_parser = address_arg)]
    pub address: Address,
    #[command(flatten)]
    pub pipe: PipeArgs,
    /// Connection and handshake timeout (e.g. 5s, 500ms). Takes precedence
    /// over --handshake-timeout.
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

fn address_arg(input: &str) -> Result<Address, String> {
    input.parse::<Address>().map_err(|err| err.to_string())
}

fn duration_arg(input: &str) -> Result<Duration, String> {
    parse_duration(input).map_err(|err| err.message)
}

fn protocol_arg(input: &str) -> Result<u16, String> {
    parse_protocol(input).ok_or_else(|| format!("unknown protocol: {input}"))
}

/// What a server loop does after `recv` fails on an accepted pipe.
pub enum RecvErrorDisposition {
    /// Peer went away; accept the next connection.
    Disconnected,
    /// Peer violated framing; the pipe is already closed.
    Rejected(PipeError),
    Fatal(CliError),
}

pub fn classify_recv_error(err: PipeError) -> RecvErrorDisposition {
    match err {
        PipeError::Io(ref source)
            if matches!(
                source.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::BrokenPipe
            ) =>
        {
            RecvErrorDisposition::Disconnected
        }
        PipeError::Closed => RecvErrorDisposition::Disconnected,
        err if err.is_protocol_error() => RecvErrorDisposition::Rejected(err),
        err => RecvErrorDisposition::Fatal(pipe_error("receive failed", err)),
    }
}

/// Handshake failures on accept only drop that connection.
pub fn is_fatal_accept_error(err: &PipeError) -> bool {
    matches!(err, PipeError::Transport(_))
}

pub fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

/// Parse `5s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
