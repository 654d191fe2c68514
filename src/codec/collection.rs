//! Sequences, string-keyed mappings and optionals.
//!
//! Elements and mapping values carry their own tag, so nested and mixed
//! collections decode structurally. Mapping keys are untagged text.

use std::collections::HashMap;

use crate::common::buf::{WireBuf, WireReader};
use crate::common::error::{BoundaryError, BoundaryResult};

use super::domain::{WireKind, WireValue};
use super::frame::{self, Decoder};
use super::scalar::{self, WireScalar};
use super::text;

/// Key added by the mapping "increment".
pub const AUGMENT_KEY: &str = "zero";

pub fn encode_seq<I, T>(items: I) -> WireValue
where
    I: IntoIterator<Item = T>,
    T: Into<WireValue>,
{
    WireValue::Sequence(items.into_iter().map(Into::into).collect())
}

/// Build a mapping; on duplicate keys the last entry wins.
pub fn encode_map<I, K, V>(entries: I) -> WireValue
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<WireValue>,
{
    WireValue::Mapping(
        entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    )
}

pub fn encode_optional(value: Option<WireValue>) -> WireValue {
    WireValue::Optional(value.map(Box::new))
}

pub fn decode_seq(value: &WireValue) -> BoundaryResult<&[WireValue]> {
    match value {
        WireValue::Sequence(items) => Ok(items.as_slice()),
        other => Err(BoundaryError::mismatch(WireKind::Sequence, other.kind())),
    }
}

pub fn decode_map(value: &WireValue) -> BoundaryResult<&HashMap<String, WireValue>> {
    match value {
        WireValue::Mapping(entries) => Ok(entries),
        other => Err(BoundaryError::mismatch(WireKind::Mapping, other.kind())),
    }
}

pub fn decode_optional(value: &WireValue) -> BoundaryResult<Option<&WireValue>> {
    match value {
        WireValue::Optional(inner) => Ok(inner.as_deref()),
        other => Err(BoundaryError::mismatch(WireKind::Optional, other.kind())),
    }
}

pub fn encode_text_seq(items: &[String]) -> WireValue {
    encode_seq(items.iter().cloned())
}

pub fn decode_text_seq(value: &WireValue) -> BoundaryResult<Vec<String>> {
    decode_seq(value)?
        .iter()
        .map(|item| text::decode(item).map(str::to_owned))
        .collect()
}

pub fn encode_scalar_map<T: WireScalar>(entries: &HashMap<String, T>) -> WireValue {
    encode_map(entries.iter().map(|(k, v)| (k.clone(), v.into_wire())))
}

pub fn decode_scalar_map<T: WireScalar>(value: &WireValue) -> BoundaryResult<HashMap<String, T>> {
    decode_map(value)?
        .iter()
        .map(|(k, v)| scalar::decode::<T>(v).map(|v| (k.clone(), v)))
        .collect()
}

/// Sequence "increment": the input followed by itself.
pub fn duplicate<T: Clone>(items: &[T]) -> Vec<T> {
    items.iter().chain(items.iter()).cloned().collect()
}

/// Mapping "increment": adds `"zero" -> 0`, keeping any existing entry.
pub fn augment(mut entries: HashMap<String, i32>) -> HashMap<String, i32> {
    entries.entry(AUGMENT_KEY.to_string()).or_insert(0);
    entries
}

pub(crate) fn write_sequence(items: &[WireValue], buf: &mut WireBuf) -> BoundaryResult<()> {
    buf.put_len(items.len())?;
    for item in items {
        frame::write_value(item, buf)?;
    }
    Ok(())
}

pub(crate) fn write_mapping(
    entries: &HashMap<String, WireValue>,
    buf: &mut WireBuf,
) -> BoundaryResult<()> {
    buf.put_len(entries.len())?;
    for (key, value) in entries {
        text::write_text(key, buf)?;
        frame::write_value(value, buf)?;
    }
    Ok(())
}

pub(crate) fn write_optional(inner: Option<&WireValue>, buf: &mut WireBuf) -> BoundaryResult<()> {
    match inner {
        None => buf.put_u8(0),
        Some(value) => {
            buf.put_u8(1);
            frame::write_value(value, buf)?;
        }
    }
    Ok(())
}

pub(crate) fn read_sequence(
    decoder: &mut Decoder,
    reader: &mut WireReader<'_>,
) -> BoundaryResult<Vec<WireValue>> {
    let count = reader.get_len()?;
    let mut items = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        items.push(decoder.read_value(reader)?);
    }
    Ok(items)
}

pub(crate) fn read_mapping(
    decoder: &mut Decoder,
    reader: &mut WireReader<'_>,
) -> BoundaryResult<HashMap<String, WireValue>> {
    let count = reader.get_len()?;
    let mut entries = HashMap::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        let key = text::read_text(reader)?;
        let value = decoder.read_value(reader)?;
        entries.insert(key, value);
    }
    Ok(entries)
}

pub(crate) fn read_optional(
    decoder: &mut Decoder,
    reader: &mut WireReader<'_>,
) -> BoundaryResult<Option<Box<WireValue>>> {
    match reader.get_u8()? {
        0 => Ok(None),
        1 => decoder.read_value(reader).map(|v| Some(Box::new(v))),
        _ => Err(BoundaryError::Malformed("optional flag must be 0 or 1")),
    }
}
