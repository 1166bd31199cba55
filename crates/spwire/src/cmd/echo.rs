use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spwire::pipe::protocol::protocol_name;
use spwire::pipe::{Pipe, PipeListener};

use crate::cmd::{
    classify_recv_error, install_ctrlc_handler, is_fatal_accept_error, EchoArgs,
    RecvErrorDisposition,
};
use crate::exit::{pipe_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: EchoArgs, _format: OutputFormat) -> CliResult<i32> {
    let listener = PipeListener::bind(&args.address, args.pipe.protocol)
        .map_err(|err| pipe_error("bind failed", err))?
        .with_config(args.pipe.config());
    tracing::info!(address = %listener.local_address(), "echo server listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        let pipe = match listener.accept() {
            Ok(pipe) => pipe,
            Err(err) if is_fatal_accept_error(&err) => {
                return Err(pipe_error("accept failed", err))
            }
            Err(err) => {
                tracing::warn!(error = %err, "handshake failed");
                continue;
            }
        };

        while running.load(Ordering::SeqCst) {
            let message = match pipe.recv() {
                Ok(message) => message,
                Err(err) => match classify_recv_error(err) {
                    RecvErrorDisposition::Disconnected => break,
                    RecvErrorDisposition::Rejected(err) => {
                        tracing::warn!(error = %err, "dropping pipe");
                        break;
                    }
                    RecvErrorDisposition::Fatal(cli_err) => return Err(cli_err),
                },
            };

            tracing::info!(
                remote_protocol = pipe.remote_protocol(),
                remote_protocol_name = protocol_name(pipe.remote_protocol()),
                size = message.body.len(),
                "echoing message"
            );

            if let Err(err) = pipe.send(message) {
                tracing::warn!(error = %err, "echo send failed");
                break;
            }
        }
        let _ = pipe.close();
    }

    Ok(SUCCESS)
}
