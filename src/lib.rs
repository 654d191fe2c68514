// lib.rs - wire marshalling core with a C ABI surface
pub mod api;
pub mod battery;
pub mod codec;
pub mod common;
pub mod dispatch;

pub use codec::{Record, WireKind, WireValue};
pub use common::error::{BoundaryCode, BoundaryError, BoundaryResult, TypedError, TypedErrorKind};
pub use dispatch::{CallDescriptor, CallState, Dispatcher, ErrorChannel};
