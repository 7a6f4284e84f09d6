use xbee_frame::{ApiFrame, Command};
use xbee_session::{Reply, Session, SessionConfig};

use crate::cmd::encode::{builder, remote_fields};
use crate::cmd::{parse_hex, parse_optional_hex, AtArgs};
use crate::exit::{
    frame_error, session_error, CliError, CliResult, DATA_INVALID, FAILURE, SUCCESS, TIMEOUT,
};
use crate::output::{print_replies, OutputFormat};

pub fn run(args: AtArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = build(&args)?;

    let port = args.device.open()?;
    let config = SessionConfig {
        reply_wait: args.wait,
        ..SessionConfig::default()
    };
    let mut session = Session::with_config(port, config);

    let replies = session
        .request(&frame)
        .map_err(|err| session_error("request failed", err))?;
    if replies.is_empty() {
        return Err(CliError::new(
            TIMEOUT,
            format!("no reply to {} within {:?}", frame.command(), args.wait),
        ));
    }

    print_replies(&replies, 0, format);
    Ok(exit_code(&replies))
}

fn build(args: &AtArgs) -> CliResult<Command> {
    let value = parse_optional_hex("value", args.value.as_deref())?;
    let builder = builder(args.frame_id);

    let Some(remote) = &args.remote else {
        if args.remote_args.address64.is_some() || args.remote_args.options.is_some() {
            return Err(CliError::usage(
                "--address64 and --options require --remote",
            ));
        }
        return builder
            .local_at(&args.command, &value)
            .map(Command::from)
            .map_err(|err| frame_error("encode failed", err));
    };

    let address16 = parse_hex("remote address", remote)?;
    let (address64, options) = remote_fields(&args.remote_args)?;
    builder
        .remote_at_with(&address16, &args.command, &value, &address64, &options)
        .map(Command::from)
        .map_err(|err| frame_error("encode failed", err))
}

/// Rejected frames outrank error statuses; both outrank success.
fn exit_code(replies: &[Reply]) -> i32 {
    if replies.iter().any(Result::is_err) {
        DATA_INVALID
    } else if replies.iter().flatten().any(|r| !r.is_ok()) {
        FAILURE
    } else {
        SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use xbee_frame::{checksum, parse_response, DecodeError};

    use super::*;
    use crate::cmd::Command as CliCommand;
    use crate::Cli;

    fn at_args(argv: &[&str]) -> AtArgs {
        let mut full = vec!["xbee", "at", "--device", "/dev/null"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            CliCommand::At(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn reply(status: u8) -> Reply {
        let payload = [0x88, 0x01, b'D', b'0', status];
        let mut candidate = vec![0x00, 0x05];
        candidate.extend_from_slice(&payload);
        candidate.push(checksum(&payload));
        parse_response(&candidate)
    }

    #[test]
    fn builds_local_command() {
        let frame = build(&at_args(&["ND"])).unwrap();
        assert_eq!(frame.raw(), &[0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x44, 0x64]);
    }

    #[test]
    fn builds_remote_command() {
        let frame = build(&at_args(&["D0", "--remote", "5678", "--value", "04"])).unwrap();
        assert_eq!(frame.api_id(), 0x17);
        assert_eq!(&frame.command_payload()[10..], &[0x56, 0x78, 0x02, b'D', b'0', 0x04]);
    }

    #[test]
    fn remote_options_need_remote() {
        let err = build(&at_args(&["D0", "--options", "00"])).unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
    }

    #[test]
    fn invalid_command_name_is_usage() {
        let err = build(&at_args(&["NDX"])).unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
    }

    #[test]
    fn exit_code_ranking() {
        assert_eq!(exit_code(&[reply(0x00)]), SUCCESS);
        assert_eq!(exit_code(&[reply(0x00), reply(0x02)]), FAILURE);
        assert_eq!(
            exit_code(&[reply(0x02), Err(DecodeError::UnknownApiId(0x8A))]),
            DATA_INVALID
        );
    }
}
