use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use xbee_frame::hex_to_bytes;
use xbee_transport::{SerialConfig, SerialPort, DEFAULT_BAUD_RATE};

use crate::exit::{frame_error, transport_error, CliResult};
use crate::output::OutputFormat;

pub mod at;
pub mod decode;
pub mod encode;
pub mod listen;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a command frame and print it.
    #[command(subcommand)]
    Encode(EncodeCommand),
    /// Decode captured bytes into responses.
    Decode(DecodeArgs),
    /// Send one AT command to a module and print the replies.
    At(AtArgs),
    /// Print frames from a module as they arrive.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(cmd) => encode::run(cmd, format),
        Command::Decode(args) => decode::run(args, format),
        Command::At(args) => at::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Subcommand, Debug)]
pub enum EncodeCommand {
    /// Local AT command for the attached module.
    Local(EncodeLocalArgs),
    /// Remote AT command for a module reached over the air.
    Remote(EncodeRemoteArgs),
}

#[derive(Args, Debug)]
pub struct EncodeLocalArgs {
    /// Two-character AT command name (e.g. ND, NI, D0).
    pub command: String,
    /// Parameter value as hex. Omit to query.
    #[arg(long, value_name = "HEX")]
    pub value: Option<String>,
    /// Frame id (decimal or 0x-prefixed hex).
    #[arg(long, value_name = "N", value_parser = parse_u8)]
    pub frame_id: Option<u8>,
}

#[derive(Args, Debug)]
pub struct EncodeRemoteArgs {
    /// 16-bit destination address as hex (e.g. 5678, FFFE).
    pub address16: String,
    /// Two-character AT command name.
    pub command: String,
    #[command(flatten)]
    pub remote: RemoteArgs,
    /// Parameter value as hex. Omit to query.
    #[arg(long, value_name = "HEX")]
    pub value: Option<String>,
    /// Frame id (decimal or 0x-prefixed hex).
    #[arg(long, value_name = "N", value_parser = parse_u8)]
    pub frame_id: Option<u8>,
}

/// Addressing extras for remote commands.
#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// 64-bit destination address as hex. Default: unknown (all zeros).
    #[arg(long, value_name = "HEX")]
    pub address64: Option<String>,
    /// Remote command options byte as hex. Default: 02 (apply changes).
    #[arg(long, value_name = "HEX")]
    pub options: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Captured bytes as hex. Whitespace and ':' separators are ignored.
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read raw captured bytes from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AtArgs {
    /// Two-character AT command name.
    pub command: String,
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Parameter value as hex. Omit to query.
    #[arg(long, value_name = "HEX")]
    pub value: Option<String>,
    /// Send to the module with this 16-bit address instead of the local one.
    #[arg(long, value_name = "ADDR16")]
    pub remote: Option<String>,
    #[command(flatten)]
    pub remote_args: RemoteArgs,
    /// Frame id (decimal or 0x-prefixed hex).
    #[arg(long, value_name = "N", value_parser = parse_u8)]
    pub frame_id: Option<u8>,
    /// How long to collect replies (e.g. 100ms, 3s).
    #[arg(long, default_value = "100ms", value_parser = parse_duration)]
    pub wait: Duration,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Pause between device reads (e.g. 10ms).
    #[arg(long, default_value = "10ms", value_parser = parse_duration)]
    pub poll: Duration,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Serial device selection shared by the device commands.
#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Serial device path.
    #[arg(long, env = "XBEE_DEVICE", value_name = "PATH")]
    pub device: PathBuf,
    /// Line speed.
    #[arg(long, env = "XBEE_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

impl DeviceArgs {
    pub fn open(&self) -> CliResult<SerialPort> {
        let config = SerialConfig::with_baud_rate(self.baud);
        SerialPort::open_with_config(&self.device, &config)
            .map_err(|err| transport_error("open failed", err))
    }
}

/// Parse a hex argument, ignoring whitespace, ':' separators and a `0x` prefix.
pub fn parse_hex(field: &str, input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let digits: String = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex_to_bytes(&digits).map_err(|err| frame_error(&format!("invalid {field}"), err))
}

/// Parse an optional hex argument; absent means empty.
pub fn parse_optional_hex(field: &str, input: Option<&str>) -> CliResult<Vec<u8>> {
    input.map_or_else(|| Ok(Vec::new()), |input| parse_hex(field, input))
}

fn parse_u8(input: &str) -> Result<u8, String> {
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("expected a byte value (0-255 or 0x00-0xff), got {input:?}"))
}

fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, scale) = if let Some(num) = input.strip_suffix("ms") {
        (num, Duration::from_millis(1))
    } else if let Some(num) = input.strip_suffix('s') {
        (num, Duration::from_secs(1))
    } else {
        (input, Duration::from_millis(1))
    };

    let value: u32 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(scale * value)
}
