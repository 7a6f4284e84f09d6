use xbee_frame::{FrameBuilder, APPLY_CHANGES, UNKNOWN_ADDRESS64};

use crate::cmd::{parse_hex, parse_optional_hex, EncodeCommand, RemoteArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(command: EncodeCommand, format: OutputFormat) -> CliResult<i32> {
    match command {
        EncodeCommand::Local(args) => {
            let value = parse_optional_hex("value", args.value.as_deref())?;
            let frame = builder(args.frame_id)
                .local_at(&args.command, &value)
                .map_err(|err| frame_error("encode failed", err))?;
            print_encoded(&frame, frame.command(), format);
        }
        EncodeCommand::Remote(args) => {
            let address16 = parse_hex("address16", &args.address16)?;
            let value = parse_optional_hex("value", args.value.as_deref())?;
            let (address64, options) = remote_fields(&args.remote)?;
            let frame = builder(args.frame_id)
                .remote_at_with(&address16, &args.command, &value, &address64, &options)
                .map_err(|err| frame_error("encode failed", err))?;
            print_encoded(&frame, frame.command(), format);
        }
    }
    Ok(SUCCESS)
}

pub(crate) fn builder(frame_id: Option<u8>) -> FrameBuilder {
    match frame_id {
        Some(id) => FrameBuilder::new().frame_id(id),
        None => FrameBuilder::new(),
    }
}

/// 64-bit address and options bytes, with their defaults applied.
pub(crate) fn remote_fields(args: &RemoteArgs) -> CliResult<(Vec<u8>, Vec<u8>)> {
    let address64 = match &args.address64 {
        Some(hex) => parse_hex("address64", hex)?,
        None => UNKNOWN_ADDRESS64.to_vec(),
    };
    let options = match &args.options {
        Some(hex) => parse_hex("options", hex)?,
        None => vec![APPLY_CHANGES],
    };
    Ok((address64, options))
}
