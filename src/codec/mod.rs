//! Marshalling between Rust values and the tagged wire representation.
//!
//! `domain` defines the value tree; the other modules each own the payload
//! layout of one family of kinds and `frame` stitches them together.

pub mod collection;
pub mod domain;
pub mod frame;
pub mod reference;
pub mod scalar;
pub mod text;

pub use domain::{Record, WireKind, WireValue};
pub use frame::{decode_expect, decode_frame, encode_frame, DecodeLimits};
pub use reference::{Handle, HandleTable, RecordPatch};
