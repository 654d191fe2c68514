//! Self-describing frames: one tag byte per value, followed by its payload.

use crate::common::buf::{WireBuf, WireReader};
use crate::common::config::WireCfg;
use crate::common::error::{BoundaryError, BoundaryResult};

use super::domain::{WireKind, WireValue};
use super::{collection, reference, scalar, text};

/// Guards applied while decoding untrusted frames.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DecodeLimits {
    pub max_frame_len: usize,
    pub max_depth: usize,
}

impl DecodeLimits {
    pub fn from_cfg(cfg: &WireCfg) -> Self {
        Self {
            max_frame_len: cfg.max_frame_len,
            max_depth: cfg.max_depth,
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_frame_len: WireCfg::DEFAULT_MAX_FRAME,
            max_depth: WireCfg::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Recursive frame decoder tracking nesting depth.
#[derive(Debug)]
pub struct Decoder {
    limits: DecodeLimits,
    depth: usize,
}

impl Decoder {
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits, depth: 0 }
    }

    pub fn read_value(&mut self, reader: &mut WireReader<'_>) -> BoundaryResult<WireValue> {
        let tag = reader.get_u8()?;
        let kind = WireKind::from_tag(tag).ok_or(BoundaryError::UnknownTag(tag))?;
        if let Some(value) = scalar::read_payload(kind, reader) {
            return value;
        }

        match kind {
            WireKind::Text => text::read_text(reader).map(WireValue::Text),
            WireKind::Bytes => text::read_bytes(reader).map(WireValue::Bytes),
            WireKind::Record => reference::read_record(reader).map(WireValue::Record),
            WireKind::Optional => self
                .nested(|d| collection::read_optional(d, reader))
                .map(WireValue::Optional),
            WireKind::Sequence => self
                .nested(|d| collection::read_sequence(d, reader))
                .map(WireValue::Sequence),
            WireKind::Mapping => self
                .nested(|d| collection::read_mapping(d, reader))
                .map(WireValue::Mapping),
            _ => Err(BoundaryError::UnknownTag(tag)),
        }
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> BoundaryResult<T>,
    ) -> BoundaryResult<T> {
        if self.depth >= self.limits.max_depth {
            return Err(BoundaryError::DepthExceeded(self.limits.max_depth));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }
}

/// Append the tagged encoding of `value`.
pub fn write_value(value: &WireValue, buf: &mut WireBuf) -> BoundaryResult<()> {
    buf.put_u8(value.kind().tag());
    if scalar::write_payload(value, buf) {
        return Ok(());
    }

    match value {
        WireValue::Text(s) => text::write_text(s, buf),
        WireValue::Bytes(b) => text::write_bytes(b, buf),
        WireValue::Record(r) => {
            reference::write_record(r, buf);
            Ok(())
        }
        WireValue::Optional(inner) => collection::write_optional(inner.as_deref(), buf),
        WireValue::Sequence(items) => collection::write_sequence(items, buf),
        WireValue::Mapping(entries) => collection::write_mapping(entries, buf),
        _ => Ok(()),
    }
}

/// Encode a complete frame.
pub fn encode_frame(value: &WireValue) -> BoundaryResult<Vec<u8>> {
    let mut buf = WireBuf::with_capacity(16);
    write_value(value, &mut buf)?;
    Ok(buf.into_vec())
}

/// Decode a complete frame; trailing bytes are an error.
pub fn decode_frame(bytes: &[u8], limits: DecodeLimits) -> BoundaryResult<WireValue> {
    if bytes.len() > limits.max_frame_len {
        return Err(BoundaryError::FrameTooLarge {
            len: bytes.len(),
            limit: limits.max_frame_len,
        });
    }
    let mut reader = WireReader::new(bytes);
    let value = Decoder::new(limits).read_value(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

/// Decode a frame whose top-level kind is fixed by the call signature.
pub fn decode_expect(
    bytes: &[u8],
    expected: WireKind,
    limits: DecodeLimits,
) -> BoundaryResult<WireValue> {
    let value = decode_frame(bytes, limits)?;
    if value.kind() != expected {
        return Err(BoundaryError::mismatch(expected, value.kind()));
    }
    Ok(value)
}
