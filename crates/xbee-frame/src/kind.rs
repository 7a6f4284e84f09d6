use crate::api::ApiId;
use crate::builder::{Command, LocalAtCommand, RemoteAtCommand};
use crate::error::DecodeError;
use crate::frame::{ApiFrame, Frame};
use crate::response::Response;

/// Any frame the codec understands, in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    Command(Command),
    Response(Response),
}

impl FrameKind {
    /// Decode a validated frame by its api id.
    pub fn from_frame(frame: Frame) -> Result<Self, DecodeError> {
        match ApiId::from_u8(frame.api_id()) {
            Some(ApiId::LocalAtCommand) => {
                LocalAtCommand::from_frame(frame).map(|c| Self::Command(c.into()))
            }
            Some(ApiId::RemoteAtCommand) => {
                RemoteAtCommand::from_frame(frame).map(|c| Self::Command(c.into()))
            }
            Some(ApiId::LocalAtResponse | ApiId::RemoteAtResponse) => {
                Response::from_frame(frame).map(Self::Response)
            }
            _ => Err(DecodeError::UnknownApiId(frame.api_id())),
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response(_))
    }
}

impl ApiFrame for FrameKind {
    fn frame(&self) -> &Frame {
        match self {
            Self::Command(c) => c.frame(),
            Self::Response(r) => r.frame(),
        }
    }
}

/// Validate and decode one candidate span into a command or response.
pub fn parse_frame(candidate: &[u8]) -> Result<FrameKind, DecodeError> {
    FrameKind::from_frame(Frame::decode(candidate)?)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::builder::{encode_local_at, encode_remote_at, FrameBuilder};

    #[test]
    fn local_command_round_trip() {
        let wire = encode_local_at("NI", b"GATEWAY").unwrap();
        let kind = parse_frame(&wire[1..]).unwrap();

        assert!(kind.is_command());
        assert_eq!(kind.api_id(), 0x08);
        assert_eq!(kind.frame_id(), 0x01);
        assert_eq!(kind.raw(), wire.as_ref());
        let FrameKind::Command(Command::LocalAt(cmd)) = kind else {
            panic!("expected local command");
        };
        assert_eq!(cmd.command().to_string(), "NI");
        assert_eq!(cmd.value(), b"GATEWAY");
    }

    #[test]
    fn remote_command_round_trip() {
        let address64 = [0x00, 0x13, 0xA2, 0x00, 0x40, 0x52, 0x2B, 0xAA];
        let wire =
            encode_remote_at(&[0x56, 0x78], "D0", &[0x04], Some(&address64), Some(&[0x00]))
                .unwrap();
        let kind = parse_frame(&wire[1..]).unwrap();

        let FrameKind::Command(Command::RemoteAt(cmd)) = kind else {
            panic!("expected remote command");
        };
        assert_eq!(cmd.address64(), address64);
        assert_eq!(cmd.address16(), [0x56, 0x78]);
        assert_eq!(cmd.options(), 0x00);
        assert_eq!(cmd.command().to_string(), "D0");
        assert_eq!(cmd.value(), &[0x04]);
    }

    #[test]
    fn responses_are_decoded() {
        // 7E 00 05 88 01 4E 44 00 <sum>
        let payload = [0x88, 0x01, 0x4E, 0x44, 0x00];
        let mut candidate = vec![0x00, 0x05];
        candidate.extend_from_slice(&payload);
        candidate.push(crate::codec::checksum(&payload));

        let kind = parse_frame(&candidate).unwrap();
        assert!(kind.is_response());
        let FrameKind::Response(response) = kind else {
            panic!("expected response");
        };
        assert!(response.is_ok());
    }

    #[test]
    fn truncated_remote_command() {
        // Remote command api id with only a frame id and part of an address.
        let payload = [0x17, 0x01, 0x00];
        let mut candidate = vec![0x00, 0x03];
        candidate.extend_from_slice(&payload);
        candidate.push(crate::codec::checksum(&payload));
        assert!(matches!(
            parse_frame(&candidate),
            Err(DecodeError::FrameTooShort { .. })
        ));
    }

    #[test]
    fn unknown_api_id() {
        // Modem status frame, not decoded by this codec.
        let candidate = [0x00, 0x02, 0x8A, 0x06, 0x6F];
        assert_eq!(parse_frame(&candidate), Err(DecodeError::UnknownApiId(0x8A)));
    }

    proptest! {
        #[test]
        fn local_at_round_trip(
            name in "[A-Z0-9]{2}",
            value in proptest::collection::vec(any::<u8>(), 0..64),
            frame_id in any::<u8>(),
        ) {
            let built = FrameBuilder::new().frame_id(frame_id).local_at(&name, &value).unwrap();
            let kind = parse_frame(&built.raw()[1..]).unwrap();
            prop_assert_eq!(kind.api_id(), 0x08);
            prop_assert_eq!(kind.frame_id(), frame_id);
            prop_assert_eq!(kind.command_payload(), built.command_payload());
            let FrameKind::Command(Command::LocalAt(cmd)) = kind else {
                return Err(TestCaseError::fail("expected local command"));
            };
            prop_assert_eq!(cmd.command().to_string(), name);
            prop_assert_eq!(cmd.value(), value.as_slice());
        }
    }
}
