//! Length-prefixed text and raw byte buffers.
//!
//! No terminator is written or expected; embedded NUL and control bytes pass
//! through untouched.

use crate::common::buf::{WireBuf, WireReader};
use crate::common::error::{BoundaryError, BoundaryResult};

use super::domain::{WireKind, WireValue};

pub fn encode(text: impl Into<String>) -> WireValue {
    WireValue::Text(text.into())
}

pub fn decode(value: &WireValue) -> BoundaryResult<&str> {
    match value {
        WireValue::Text(text) => Ok(text.as_str()),
        other => Err(BoundaryError::mismatch(WireKind::Text, other.kind())),
    }
}

pub fn decode_bytes(value: &WireValue) -> BoundaryResult<&[u8]> {
    match value {
        WireValue::Bytes(bytes) => Ok(bytes.as_slice()),
        other => Err(BoundaryError::mismatch(WireKind::Bytes, other.kind())),
    }
}

pub fn write_text(text: &str, buf: &mut WireBuf) -> BoundaryResult<()> {
    buf.put_prefixed(text.as_bytes())
}

pub fn read_text(reader: &mut WireReader<'_>) -> BoundaryResult<String> {
    let raw = reader.get_prefixed()?;
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| BoundaryError::Malformed("text is not valid utf-8"))
}

pub fn write_bytes(bytes: &[u8], buf: &mut WireBuf) -> BoundaryResult<()> {
    buf.put_prefixed(bytes)
}

pub fn read_bytes(reader: &mut WireReader<'_>) -> BoundaryResult<Vec<u8>> {
    reader.get_prefixed().map(<[u8]>::to_vec)
}

/// Text "increment": the input followed by itself.
pub fn duplicate(text: &str) -> String {
    text.repeat(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn round_trip(text: &str) -> String {
        let mut buf = WireBuf::default();
        write_text(text, &mut buf).unwrap();
        let mut reader = WireReader::new(buf.as_slice());
        let out = read_text(&mut reader).unwrap();
        reader.finish().unwrap();
        out
    }

    #[test]
    fn prefix_is_byte_length_not_char_count() {
        let mut buf = WireBuf::default();
        write_text("héllo", &mut buf).unwrap();
        assert_eq!(&buf.as_slice()[..4], &[0, 0, 0, 6]);
    }

    #[test]
    fn control_bytes_and_multibyte_survive() {
        for sample in ["", "a\0b\x07c", "Hello World!", "日本語 ✓ 🚀"] {
            assert_eq!(round_trip(sample), sample);
        }
    }

    #[test]
    fn short_body_is_truncated() {
        let mut reader = WireReader::new(&[0, 0, 0, 5, b'a', b'b']);
        assert_eq!(
            read_text(&mut reader),
            Err(BoundaryError::Truncated {
                needed: 5,
                available: 2
            })
        );
    }

    #[test]
    fn invalid_utf8_is_malformed_but_fine_as_bytes() {
        let frame = [0, 0, 0, 2, 0xc3, 0x28];
        assert!(matches!(
            read_text(&mut WireReader::new(&frame)),
            Err(BoundaryError::Malformed(_))
        ));
        assert_eq!(
            read_bytes(&mut WireReader::new(&frame)).unwrap(),
            vec![0xc3, 0x28]
        );
    }

    #[test]
    fn decode_checks_the_tag() {
        assert_eq!(decode(&encode("x")).unwrap(), "x");
        assert!(decode(&WireValue::Bytes(vec![])).is_err());
        assert!(decode_bytes(&encode("x")).is_err());
    }

    proptest! {
        #[test]
        fn duplicate_is_concatenation(s in any::<String>()) {
            let expected = [s.as_bytes(), s.as_bytes()].concat();
            prop_assert_eq!(duplicate(&s).into_bytes(), expected);
        }

        #[test]
        fn arbitrary_text_round_trips(s in any::<String>()) {
            prop_assert_eq!(round_trip(&s), s);
        }
    }
}
