//! Call dispatch across the boundary: descriptors, the error channel and the
//! synchronous dispatcher.

pub mod channel;
pub mod domain;
pub mod service;

pub use channel::{CallState, ErrorChannel};
pub use domain::{
    Arg, CallArgs, CallDescriptor, ErrorDecl, Operation, ParamKind, ReturnKind, Signature,
};
pub use service::Dispatcher;
