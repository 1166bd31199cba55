use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use spwire::pipe::protocol::protocol_name;
use spwire::pipe::Message;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    remote_protocol: u16,
    remote_protocol_name: &'a str,
    peer: &'a str,
    size: usize,
    body: String,
    timestamp: String,
}

/// Print one received message. `peer` identifies the connection it came from.
pub fn print_message(message: &Message, remote_protocol: u16, peer: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                remote_protocol,
                remote_protocol_name: protocol_name(remote_protocol),
                peer,
                size: message.body.len(),
                body: body_preview(message.body.as_ref()),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PROTOCOL", "SIZE", "PEER", "BODY"])
                .add_row(vec![
                    protocol_name(remote_protocol).to_string(),
                    message.body.len().to_string(),
                    peer.to_string(),
                    body_preview(message.body.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "protocol={:#06x} ({}) size={} peer={} body={}",
                remote_protocol,
                protocol_name(remote_protocol),
                message.body.len(),
                peer,
                body_preview(message.body.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(message.body.as_ref());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn body_preview(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", body.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_shows_text_and_summarizes_binary() {
        assert_eq!(body_preview(b"hello"), "hello");
        assert_eq!(body_preview(&[0xff, 0xfe, 0x00]), "<binary 3 bytes>");
    }

    #[test]
    fn message_output_serializes_protocol_name() {
        let out = MessageOutput {
            remote_protocol: 0x51,
            remote_protocol_name: protocol_name(0x51),
            peer: "tcp://127.0.0.1:5555",
            size: 2,
            body: "hi".to_string(),
            timestamp: "0".to_string(),
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"remote_protocol\":81"));
        assert!(json.contains("\"remote_protocol_name\":\"pull\""));
    }
}
