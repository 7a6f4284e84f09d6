use tracing::debug;
use xbee_frame::{decode_stream, split_frames};
use xbee_session::Reply;

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_replies, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = match (&args.hex, &args.file) {
        (Some(hex), _) => parse_hex("capture", hex)?,
        (None, Some(path)) => {
            std::fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err))?
        }
        (None, None) => return Err(CliError::usage("decode needs a hex capture or --file")),
    };

    debug!(
        len = bytes.len(),
        candidates = split_frames(&bytes).count(),
        "decoding capture"
    );
    let replies: Vec<Reply> = decode_stream(&bytes).collect();
    if replies.is_empty() {
        return Err(CliError::new(
            DATA_INVALID,
            "no start delimiter (0x7e) found in capture",
        ));
    }

    print_replies(&replies, 0, format);
    Ok(exit_code(&replies))
}

/// Success only when every candidate decoded.
fn exit_code(replies: &[Reply]) -> i32 {
    if replies.iter().all(Result::is_ok) {
        SUCCESS
    } else {
        DATA_INVALID
    }
}
