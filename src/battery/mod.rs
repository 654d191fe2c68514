//! The fixed battery of marshalling operations a host harness calls to verify
//! a binding: primitive increments, text and collection duplication,
//! by-reference mutation, a void call and a fallible sum.

pub mod ops;
pub mod service;

use crate::codec::frame::DecodeLimits;
use crate::common::config::WireCfg;
use crate::dispatch::service::Dispatcher;

pub use service::{register, OPERATIONS};

/// Dispatcher with the whole battery registered, limits taken from `cfg`.
pub fn dispatcher(cfg: &WireCfg) -> Dispatcher {
    let mut d = Dispatcher::new(DecodeLimits::from_cfg(cfg));
    register(&mut d);
    d
}
