//! Shared utilities: errors, configuration, logging, byte buffers.
pub mod buf;
pub mod config;
pub mod error;
pub mod log;
pub mod time;

pub use error::{BoundaryCode, BoundaryError, BoundaryResult, TypedError, TypedErrorKind};
