use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use xbee_frame::{api_name, bytes_to_hex, ApiFrame, AtCommand, Response};
use xbee_session::Reply;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
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
struct EncodedOutput {
    api_id: u8,
    api_name: &'static str,
    frame_id: u8,
    command: String,
    length: u16,
    checksum: u8,
    hex: String,
}

impl EncodedOutput {
    fn new(frame: &impl ApiFrame, command: AtCommand) -> Self {
        Self {
            api_id: frame.api_id(),
            api_name: api_name(frame.api_id()),
            frame_id: frame.frame_id(),
            command: command.to_string(),
            length: frame.frame().length(),
            checksum: frame.frame().checksum(),
            hex: bytes_to_hex(frame.raw()),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
enum ReplyOutput {
    Response(ResponseOutput),
    Rejected { index: usize, error: String },
}

#[derive(Serialize)]
struct ResponseOutput {
    index: usize,
    api_id: u8,
    api_name: &'static str,
    frame_id: u8,
    command: String,
    status: String,
    status_code: u8,
    ok: bool,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address16: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal_strength: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_id: Option<String>,
    raw: String,
}

impl ResponseOutput {
    fn new(index: usize, response: &Response) -> Self {
        Self {
            index,
            api_id: response.api_id(),
            api_name: api_name(response.api_id()),
            frame_id: response.frame_id(),
            command: response.command().to_string(),
            status: response.status().to_string(),
            status_code: response.status().as_u8(),
            ok: response.is_ok(),
            data: bytes_to_hex(response.data()),
            address16: response.address16().map(|a| bytes_to_hex(&a)),
            address64: response.address64().map(|a| bytes_to_hex(&a)),
            signal_strength: response.signal_strength(),
            node_id: response.node_id(),
            raw: bytes_to_hex(response.raw()),
        }
    }
}

impl ReplyOutput {
    fn new(index: usize, reply: &Reply) -> Self {
        match reply {
            Ok(response) => Self::Response(ResponseOutput::new(index, response)),
            Err(err) => Self::Rejected {
                index,
                error: err.to_string(),
            },
        }
    }
}

/// Print one built command frame.
pub fn print_encoded(frame: &impl ApiFrame, command: AtCommand, format: OutputFormat) {
    let out = EncodedOutput::new(frame, command);
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["API", "FRAME", "CMD", "LEN", "SUM", "HEX"])
                .add_row(vec![
                    out.api_name.to_string(),
                    out.frame_id.to_string(),
                    out.command,
                    out.length.to_string(),
                    format!("{:02x}", out.checksum),
                    out.hex,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", out.hex),
        OutputFormat::Raw => print_raw(frame.raw()),
    }
}

/// Print parse results, numbering them from `first_index`.
pub fn print_replies(replies: &[Reply], first_index: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for (i, reply) in replies.iter().enumerate() {
                print_json(&ReplyOutput::new(first_index + i, reply));
            }
        }
        OutputFormat::Table => {
            if replies.is_empty() {
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "API", "FRAME", "CMD", "STATUS", "DATA", "NODE"]);
            for (i, reply) in replies.iter().enumerate() {
                let row = match ReplyOutput::new(first_index + i, reply) {
                    ReplyOutput::Response(r) => vec![
                        r.index.to_string(),
                        r.api_name.to_string(),
                        r.frame_id.to_string(),
                        r.command,
                        r.status,
                        r.data,
                        r.node_id.unwrap_or_default(),
                    ],
                    ReplyOutput::Rejected { index, error } => vec![
                        index.to_string(),
                        "-".to_string(),
                        "-".to_string(),
                        "-".to_string(),
                        format!("rejected: {error}"),
                        String::new(),
                        String::new(),
                    ],
                };
                table.add_row(row);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (i, reply) in replies.iter().enumerate() {
                println!("{}", pretty_line(first_index + i, reply));
            }
        }
        OutputFormat::Raw => {
            for response in replies.iter().flatten() {
                print_raw(response.raw());
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn pretty_line(index: usize, reply: &Reply) -> String {
    let response = match reply {
        Ok(response) => response,
        Err(err) => return format!("#{index} rejected: {err}"),
    };

    let mut line = format!(
        "#{index} {} frame={} cmd={} status={}",
        api_name(response.api_id()),
        response.frame_id(),
        response.command(),
        response.status()
    );
    if !response.data().is_empty() {
        line.push_str(&format!(" data={}", bytes_to_hex(response.data())));
    }
    if let Some(node_id) = response.node_id() {
        line.push_str(&format!(" node={node_id:?}"));
    }
    if let (Some(a16), Some(a64)) = (response.address16(), response.address64()) {
        line.push_str(&format!(
            " addr16={} addr64={}",
            bytes_to_hex(&a16),
            bytes_to_hex(&a64)
        ));
    }
    if let Some(signal) = response.signal_strength() {
        line.push_str(&format!(" signal=-{signal}dBm"));
    }
    line
}

#[cfg(test)]
mod tests {
    use xbee_frame::{checksum, parse_response, DecodeError, FrameBuilder};

    use super::*;

    fn response(payload: &[u8]) -> Response {
        let mut candidate = (payload.len() as u16).to_be_bytes().to_vec();
        candidate.extend_from_slice(payload);
        candidate.push(checksum(payload));
        parse_response(&candidate).unwrap()
    }

    #[test]
    fn encoded_output_fields() {
        let frame = FrameBuilder::new().local_at("ND", &[]).unwrap();
        let out = EncodedOutput::new(&frame, frame.command());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["api_name"], "LOCAL_AT");
        assert_eq!(json["command"], "ND");
        assert_eq!(json["length"], 4);
        assert_eq!(json["checksum"], 0x64);
        assert_eq!(json["hex"], "7e000408014e4464");
    }

    #[test]
    fn response_output_omits_absent_fields() {
        let reply: Reply = Ok(response(&[0x88, 0x01, b'I', b'D', 0x00, 0x33, 0x32]));
        let json = serde_json::to_value(ReplyOutput::new(0, &reply)).unwrap();
        assert_eq!(json["result"], "response");
        assert_eq!(json["status"], "OK");
        assert_eq!(json["ok"], true);
        assert_eq!(json["data"], "3332");
        assert!(json.get("address16").is_none());
        assert!(json.get("address64").is_none());
        assert!(json.get("node_id").is_none());
    }

    #[test]
    fn node_identifier_reply_has_no_node_fields() {
        let mut payload = vec![0x88, 0x01, b'N', b'I', 0x00];
        payload.extend_from_slice(b"ROUTER");
        let reply: Reply = Ok(response(&payload));
        let json = serde_json::to_value(ReplyOutput::new(0, &reply)).unwrap();
        assert_eq!(json["command"], "NI");
        assert_eq!(json["data"], "524f55544552");
        assert!(json.get("address16").is_none());
        assert!(json.get("signal_strength").is_none());
        assert!(json.get("node_id").is_none());
    }

    #[test]
    fn rejected_output() {
        let reply: Reply = Err(DecodeError::UnknownApiId(0x8A));
        let json = serde_json::to_value(ReplyOutput::new(3, &reply)).unwrap();
        assert_eq!(json["result"], "rejected");
        assert_eq!(json["index"], 3);
        assert!(json["error"].as_str().unwrap().contains("0x8a"));
    }

    #[test]
    fn pretty_line_for_node_discovery() {
        let mut payload = vec![0x88, 0x01, b'N', b'D', 0x00, 0x12, 0x34];
        payload.extend_from_slice(&[0x00, 0x13, 0xA2, 0x00, 0x40, 0x52, 0x2B, 0xAA, 0x28]);
        payload.extend_from_slice(b"SENSOR\0");
        let line = pretty_line(0, &Ok(response(&payload)));
        assert!(line.starts_with("#0 LOCAL_AT_RESPONSE frame=1 cmd=ND status=OK"));
        assert!(line.contains("node=\"SENSOR\""));
        assert!(line.contains("addr16=1234 addr64=0013a20040522baa"));
        assert!(line.contains("signal=-40dBm"));
    }
}
