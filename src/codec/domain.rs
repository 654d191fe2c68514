//! Wire model shared by every codec: the tagged value tree and its kinds.

use std::collections::HashMap;
use std::fmt;

/// Tag-only view of a `WireValue`. The discriminant is the tag byte on the wire.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WireKind {
    Bool = 0x01,
    I8 = 0x02,
    I16 = 0x03,
    I32 = 0x04,
    I64 = 0x05,
    U8 = 0x06,
    U16 = 0x07,
    U32 = 0x08,
    U64 = 0x09,
    F32 = 0x0a,
    F64 = 0x0b,
    Text = 0x10,
    Bytes = 0x11,
    Optional = 0x20,
    Sequence = 0x21,
    Mapping = 0x22,
    Record = 0x30,
}

impl WireKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        let kind = match tag {
            0x01 => WireKind::Bool,
            0x02 => WireKind::I8,
            0x03 => WireKind::I16,
            0x04 => WireKind::I32,
            0x05 => WireKind::I64,
            0x06 => WireKind::U8,
            0x07 => WireKind::U16,
            0x08 => WireKind::U32,
            0x09 => WireKind::U64,
            0x0a => WireKind::F32,
            0x0b => WireKind::F64,
            0x10 => WireKind::Text,
            0x11 => WireKind::Bytes,
            0x20 => WireKind::Optional,
            0x21 => WireKind::Sequence,
            0x22 => WireKind::Mapping,
            0x30 => WireKind::Record,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WireKind::Bool => "bool",
            WireKind::I8 => "i8",
            WireKind::I16 => "i16",
            WireKind::I32 => "i32",
            WireKind::I64 => "i64",
            WireKind::U8 => "u8",
            WireKind::U16 => "u16",
            WireKind::U32 => "u32",
            WireKind::U64 => "u64",
            WireKind::F32 => "f32",
            WireKind::F64 => "f64",
            WireKind::Text => "text",
            WireKind::Bytes => "bytes",
            WireKind::Optional => "optional",
            WireKind::Sequence => "sequence",
            WireKind::Mapping => "mapping",
            WireKind::Record => "record",
        }
    }

    /// Fixed payload width for scalar kinds.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            WireKind::Bool | WireKind::I8 | WireKind::U8 => Some(1),
            WireKind::I16 | WireKind::U16 => Some(2),
            WireKind::I32 | WireKind::U32 | WireKind::F32 => Some(4),
            WireKind::I64 | WireKind::U64 | WireKind::F64 => Some(8),
            WireKind::Record => Some(16),
            _ => None,
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-like record marshalled by value or by reference.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub x: f64,
    pub y: f64,
}

impl Record {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Canonical tagged value moved across the boundary.
///
/// Mapping equality is key-set equality with equal values; iteration order is
/// not part of the value.
#[derive(Clone, Debug, PartialEq)]
pub enum WireValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Optional(Option<Box<WireValue>>),
    Sequence(Vec<WireValue>),
    Mapping(HashMap<String, WireValue>),
    Record(Record),
}

impl WireValue {
    pub fn kind(&self) -> WireKind {
        match self {
            WireValue::Bool(_) => WireKind::Bool,
            WireValue::I8(_) => WireKind::I8,
            WireValue::I16(_) => WireKind::I16,
            WireValue::I32(_) => WireKind::I32,
            WireValue::I64(_) => WireKind::I64,
            WireValue::U8(_) => WireKind::U8,
            WireValue::U16(_) => WireKind::U16,
            WireValue::U32(_) => WireKind::U32,
            WireValue::U64(_) => WireKind::U64,
            WireValue::F32(_) => WireKind::F32,
            WireValue::F64(_) => WireKind::F64,
            WireValue::Text(_) => WireKind::Text,
            WireValue::Bytes(_) => WireKind::Bytes,
            WireValue::Optional(_) => WireKind::Optional,
            WireValue::Sequence(_) => WireKind::Sequence,
            WireValue::Mapping(_) => WireKind::Mapping,
            WireValue::Record(_) => WireKind::Record,
        }
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        WireValue::Text(value.to_string())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        WireValue::Text(value)
    }
}

impl From<Record> for WireValue {
    fn from(value: Record) -> Self {
        WireValue::Record(value)
    }
}
