//! Byte-level primitives shared by the encode and decode paths.
//!
//! Wire format (API mode 1, no escaping):
//! ```text
//! ┌───────────┬──────────────┬────────┬──────────┬──────────────┬──────────┐
//! │ 0x7E      │ Length (2B)  │ API id │ Frame id │ Command data │ Checksum │
//! │ delimiter │ big-endian   │ (1B)   │ (1B)     │ (N bytes)    │ (1B)     │
//! └───────────┴──────────────┴────────┴──────────┴──────────────┴──────────┘
//! ```
//!
//! Length and checksum both cover the span from the API id to the end of the
//! command data. The checksum is `0xFF` minus the low byte of the sum of that
//! span.

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Delimiter (1) + length (2) + checksum (1).
pub const FRAMING_OVERHEAD: usize = 4;

/// Convert a hex string into raw bytes, two digits per byte.
///
/// Upper and lower case digits are accepted. Odd-length input or a non-hex
/// character fails with [`FrameError::MalformedHex`].
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(hex)?)
}

/// Convert raw bytes into lower-case hex, two digits per byte.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Additive checksum: `0xFF - (sum(payload) mod 256)`.
pub fn checksum(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0xFF - sum
}

/// Big-endian 16-bit length of `payload`.
pub fn length_field(payload: &[u8]) -> Result<[u8; 2]> {
    let len = u16::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_PAYLOAD,
    })?;
    Ok(len.to_be_bytes())
}

/// Frame `payload` (api id onwards) and append it to `dst`.
///
/// Nothing is written to `dst` when the payload is too large.
pub fn encode_frame(start_byte: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let length = length_field(payload)?;
    dst.reserve(FRAMING_OVERHEAD + payload.len());
    dst.put_u8(start_byte);
    dst.put_slice(&length);
    dst.put_slice(payload);
    dst.put_u8(checksum(payload));
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::api::START_DELIMITER;

    #[test]
    fn checksum_of_node_discover() {
        assert_eq!(checksum(&[0x08, 0x01, 0x4E, 0x44]), 0x64);
    }

    #[test]
    fn checksum_of_empty_payload() {
        assert_eq!(checksum(&[]), 0xFF);
    }

    #[test]
    fn checksum_wraps_modulo_256() {
        // 0xFF + 0x02 = 0x101, low byte 0x01.
        assert_eq!(checksum(&[0xFF, 0x02]), 0xFE);
    }

    #[test]
    fn length_field_is_big_endian() {
        assert_eq!(length_field(&[0u8; 4]).unwrap(), [0x00, 0x04]);
        assert_eq!(length_field(&[0u8; 0x1234]).unwrap(), [0x12, 0x34]);
        assert_eq!(length_field(&[]).unwrap(), [0x00, 0x00]);
    }

    #[test]
    fn length_field_accepts_maximum() {
        let payload = vec![0u8; MAX_PAYLOAD];
        assert_eq!(length_field(&payload).unwrap(), [0xFF, 0xFF]);
    }

    #[test]
    fn length_field_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let err = length_field(&payload).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge {
                size,
                max: MAX_PAYLOAD
            } if size == MAX_PAYLOAD + 1
        ));
    }

    #[test]
    fn hex_to_bytes_accepts_mixed_case() {
        assert_eq!(hex_to_bytes("7e00Ff").unwrap(), vec![0x7E, 0x00, 0xFF]);
        assert_eq!(hex_to_bytes("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn hex_to_bytes_rejects_odd_length() {
        let err = hex_to_bytes("7e0").unwrap_err();
        assert!(matches!(err, FrameError::MalformedHex(hex::FromHexError::OddLength)));
    }

    #[test]
    fn hex_to_bytes_rejects_non_hex() {
        let err = hex_to_bytes("7g").unwrap_err();
        assert!(matches!(
            err,
            FrameError::MalformedHex(hex::FromHexError::InvalidHexCharacter { c: 'g', index: 1 })
        ));
    }

    #[test]
    fn bytes_to_hex_is_lower_case() {
        assert_eq!(bytes_to_hex(&[0x7E, 0x4E, 0x0A]), "7e4e0a");
    }

    #[test]
    fn encode_node_discover_frame() {
        let mut buf = BytesMut::new();
        encode_frame(START_DELIMITER, &[0x08, 0x01, 0x4E, 0x44], &mut buf).unwrap();
        assert_eq!(
            buf.as_ref(),
            &[0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x44, 0x64]
        );
    }

    #[test]
    fn encode_appends_to_existing_buffer() {
        let mut buf = BytesMut::from(&[0xAA][..]);
        encode_frame(START_DELIMITER, &[0x08, 0x01], &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0xAA, 0x7E, 0x00, 0x02, 0x08, 0x01, 0xF6]);
    }

    #[test]
    fn encode_oversized_writes_nothing() {
        let mut buf = BytesMut::new();
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        assert!(encode_frame(START_DELIMITER, &payload, &mut buf).is_err());
        assert!(buf.is_empty());
    }

    proptest! {
        #[test]
        fn checksum_complements_sum(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
            let sum = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
            prop_assert_eq!(sum.wrapping_add(checksum(&payload)), 0xFF);
        }

        #[test]
        fn hex_text_survives_conversion(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let text = bytes_to_hex(&bytes);
            prop_assert_eq!(bytes_to_hex(&hex_to_bytes(&text).unwrap()), text);
        }
    }
}
