use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spwire::pipe::{Pipe, PipeListener};

use crate::cmd::{
    classify_recv_error, install_ctrlc_handler, is_fatal_accept_error, ListenArgs,
    RecvErrorDisposition,
};
use crate::exit::{pipe_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let listener = PipeListener::bind(&args.address, args.pipe.protocol)
        .map_err(|err| pipe_error("bind failed", err))?
        .with_config(args.pipe.config());
    tracing::info!(address = %listener.local_address(), "listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0u64;
    let mut connections = 0u64;

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
        connections = connections.saturating_add(1);
        let peer = format!("conn-{connections}");

        while running.load(Ordering::SeqCst) {
            let message = match pipe.recv() {
                Ok(message) => message,
                Err(err) => match classify_recv_error(err) {
                    RecvErrorDisposition::Disconnected => break,
                    RecvErrorDisposition::Rejected(err) => {
                        tracing::warn!(peer = %peer, error = %err, "dropping pipe");
                        break;
                    }
                    RecvErrorDisposition::Fatal(cli_err) => return Err(cli_err),
                },
            };

            print_message(&message, pipe.remote_protocol(), &peer, format);
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count {
                    let _ = pipe.close();
                    return Ok(SUCCESS);
                }
            }
        }
        let _ = pipe.close();
    }

    Ok(SUCCESS)
}
