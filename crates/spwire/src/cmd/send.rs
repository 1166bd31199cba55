use std::fs;

use spwire::pipe::{dial_with_config, Message, Pipe, PipeConfig};

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{io_error, pipe_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let config = PipeConfig {
        read_timeout: args.wait.then_some(wait_timeout),
        ..args.pipe.config()
    };

    let message = resolve_message(&args)?;
    let pipe = dial_with_config(&args.address, args.pipe.protocol, config)
        .map_err(|err| pipe_error("dial failed", err))?;
    tracing::debug!(
        address = %args.address,
        remote_protocol = pipe.remote_protocol(),
        "pipe open"
    );

    pipe.send(message)
        .map_err(|err| pipe_error("send failed", err))?;

    if args.wait {
        let reply = pipe
            .recv()
            .map_err(|err| pipe_error("receive failed", err))?;
        print_message(
            &reply,
            pipe.remote_protocol(),
            &args.address.to_string(),
            format,
        );
    }

    pipe.close()
        .map_err(|err| pipe_error("close failed", err))?;
    Ok(SUCCESS)
}

fn resolve_message(args: &SendArgs) -> CliResult<Message> {
    let body = if let Some(data) = &args.data {
        data.as_bytes().to_vec()
    } else if let Some(path) = &args.file {
        fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?
    } else {
        Vec::new()
    };
    let header = args
        .header
        .as_ref()
        .map(|h| h.as_bytes().to_vec())
        .unwrap_or_default();
    Ok(Message::new(header, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::PipeArgs;
    use crate::exit::INTERNAL;

    fn args() -> SendArgs {
        SendArgs {
            address: "tcp://127.0.0.1:5555".parse().unwrap(),
            pipe: PipeArgs::default(),
            data: None,
            file: None,
            header: None,
            wait: false,
            wait_timeout: "5s".to_string(),
        }
    }

    #[test]
    fn message_from_data_and_header() {
        let mut args = args();
        args.data = Some("body".to_string());
        args.header = Some("hd".to_string());
        let message = resolve_message(&args).unwrap();
        assert_eq!(message.header.as_ref(), b"hd");
        assert_eq!(message.body.as_ref(), b"body");
    }

    #[test]
    fn empty_message_without_payload() {
        let message = resolve_message(&args()).unwrap();
        assert!(message.header.is_empty());
        assert!(message.body.is_empty());
    }

    #[test]
    fn missing_file_is_reported() {
        let mut args = args();
        args.file = Some("/nonexistent/spwire-body.bin".into());
        let err = resolve_message(&args).unwrap_err();
        assert_eq!(err.code, INTERNAL);
        assert!(err.message.contains("spwire-body.bin"));
    }
}
