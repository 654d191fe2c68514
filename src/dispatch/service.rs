//! Synchronous call dispatcher.
//!
//! `invoke` runs the named operation on the calling thread and returns only
//! after it has finished and every by-reference record has been written back.
//! Each call runs the operation at most once.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::{debug, warn};

use crate::codec::domain::{Record, WireKind, WireValue};
use crate::codec::frame::{self, DecodeLimits};
use crate::common::error::{BoundaryError, BoundaryResult};
use crate::common::time;

use super::channel::{CallState, ErrorChannel};
use super::domain::{
    Arg, CallArgs, CallDescriptor, ErrorDecl, Operation, ParamKind, ReturnKind, Signature,
};

struct Registered {
    signature: Signature,
    op: Box<dyn Operation>,
}

/// Table of named operations plus the decode limits applied to frames.
pub struct Dispatcher {
    ops: HashMap<String, Registered>,
    limits: DecodeLimits,
    completed: AtomicU64,
}

impl Dispatcher {
    pub fn new(limits: DecodeLimits) -> Self {
        Self {
            ops: HashMap::new(),
            limits,
            completed: AtomicU64::new(0),
        }
    }

    /// Register (or replace) a closure-backed operation under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, signature: Signature, f: F)
    where
        F: Fn(&mut CallArgs) -> BoundaryResult<Option<WireValue>> + Send + Sync + 'static,
    {
        self.register_operation(name, signature, f);
    }

    /// Register (or replace) any `Operation` under `name`.
    pub fn register_operation<O>(&mut self, name: impl Into<String>, signature: Signature, op: O)
    where
        O: Operation + 'static,
    {
        let name = name.into();
        debug!(op = %name, params = signature.params.len(), "registered operation");
        self.ops.insert(
            name,
            Registered {
                signature,
                op: Box::new(op),
            },
        );
    }

    pub fn signature(&self, name: &str) -> Option<&Signature> {
        self.ops.get(name).map(|r| &r.signature)
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// Calls that reached a terminal state, whatever the outcome.
    pub fn completed_calls(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Run a call and return its value (`None` for void) or its error.
    pub fn invoke(&self, desc: CallDescriptor<'_>) -> BoundaryResult<Option<WireValue>> {
        self.invoke_tracked(desc).into_result()
    }

    /// Run a call and return the terminal state of its error channel.
    pub fn invoke_tracked(&self, desc: CallDescriptor<'_>) -> CallState {
        let start = Instant::now();
        let name = desc.name().to_string();
        let mut channel = ErrorChannel::new();

        let result = self.run(desc);
        if let Err(err) = channel.settle(result) {
            warn!(op = %name, error = %err, "call settled twice");
        }
        let state = channel.into_state();
        self.completed.fetch_add(1, Ordering::AcqRel);

        match &state {
            CallState::TransportFailed(err) => warn!(
                op = %name,
                outcome = state.as_str(),
                code = err.code() as u32,
                error = %err,
                dur_ms = time::elapsed_ms(start),
                "call failed"
            ),
            _ => debug!(
                op = %name,
                outcome = state.as_str(),
                dur_ms = time::elapsed_ms(start),
                "call completed"
            ),
        }
        state
    }

    /// Run a call from an encoded argument frame (a sequence) and return the
    /// encoded result frame, empty for void. The registered signature is the
    /// static signature for decoding. By-reference parameters take `record`.
    pub fn invoke_frame(
        &self,
        name: &str,
        args_frame: &[u8],
        mut record: Option<&mut Record>,
    ) -> BoundaryResult<Vec<u8>> {
        let signature = self
            .signature(name)
            .ok_or_else(|| BoundaryError::UnknownOperation(name.to_string()))?;

        let values = match frame::decode_frame(args_frame, self.limits)? {
            WireValue::Sequence(values) => values,
            other => {
                return Err(BoundaryError::mismatch(WireKind::Sequence, other.kind()))
            }
        };

        let mut desc = CallDescriptor::for_signature(name, signature);
        let mut values = values.into_iter();
        for param in &signature.params {
            desc = match param {
                ParamKind::ByRef => match record.take() {
                    Some(rec) => desc.by_ref(rec),
                    None => return Err(BoundaryError::NullPointer("by-reference record")),
                },
                ParamKind::Value(_) => match values.next() {
                    Some(value) => desc.arg(value),
                    None => break,
                },
            };
        }
        for extra in values {
            desc = desc.arg(extra);
        }

        match self.invoke(desc)? {
            Some(value) => frame::encode_frame(&value),
            None => Ok(Vec::new()),
        }
    }

    fn run(&self, desc: CallDescriptor<'_>) -> BoundaryResult<Option<WireValue>> {
        let (name, args, returns, errors) = desc.into_parts();
        let registered = self
            .ops
            .get(&name)
            .ok_or_else(|| BoundaryError::UnknownOperation(name.clone()))?;

        check_call(&name, &registered.signature, returns, errors, &args)?;

        let mut call_args = CallArgs::new();
        let mut lent: Vec<&mut Record> = Vec::new();
        for arg in args {
            match arg {
                Arg::Value(value) => call_args.push_value(value),
                Arg::ByRef(record) => {
                    call_args.push_ref(record);
                    lent.push(record);
                }
            }
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            registered.op.call(&mut call_args)
        }))
        .map_err(|payload| BoundaryError::Panicked(panic_message(payload.as_ref())))?;

        let value = match outcome {
            Ok(value) => value,
            Err(BoundaryError::Domain(err)) if registered.signature.errors.allows(err.kind) => {
                return Err(BoundaryError::Domain(err));
            }
            Err(BoundaryError::Domain(err)) => {
                return Err(BoundaryError::UndeclaredError(err.kind));
            }
            Err(other) => return Err(other),
        };

        check_return(returns, value.as_ref())?;

        // copy-out happens only for calls that succeeded
        for (target, updated) in lent.into_iter().zip(call_args.into_refs().into_records()) {
            *target = updated;
        }
        Ok(value)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DecodeLimits::default())
    }
}

/// Reject a descriptor that disagrees with the registered signature. Runs
/// before the operation, so a rejected call has no side effects.
fn check_call(
    name: &str,
    signature: &Signature,
    returns: ReturnKind,
    errors: ErrorDecl,
    args: &[Arg<'_>],
) -> BoundaryResult<()> {
    match (signature.returns, returns) {
        (declared, requested) if declared == requested => {}
        (ReturnKind::Value(expected), ReturnKind::Value(found)) => {
            return Err(BoundaryError::mismatch(expected, found));
        }
        _ => return Err(BoundaryError::Malformed("return kind differs from registered signature")),
    }
    // a descriptor may leave its error declaration out, but not claim a different one
    if let ErrorDecl::Typed(kind) = errors {
        if !signature.errors.allows(kind) {
            return Err(BoundaryError::UndeclaredError(kind));
        }
    }
    if args.len() != signature.params.len() {
        return Err(BoundaryError::ArityMismatch {
            op: name.to_string(),
            expected: signature.params.len(),
            found: args.len(),
        });
    }
    for (param, arg) in signature.params.iter().zip(args) {
        match (param, arg) {
            (ParamKind::Value(kind), Arg::Value(value)) if value.kind() == *kind => {}
            (ParamKind::Value(kind), Arg::Value(value)) => {
                return Err(BoundaryError::mismatch(*kind, value.kind()));
            }
            (ParamKind::ByRef, Arg::ByRef(_)) => {}
            (ParamKind::ByRef, Arg::Value(_)) => {
                return Err(BoundaryError::Malformed("expected a by-reference argument"));
            }
            (ParamKind::Value(_), Arg::ByRef(_)) => {
                return Err(BoundaryError::Malformed("expected a by-value argument"));
            }
        }
    }
    Ok(())
}

fn check_return(declared: ReturnKind, value: Option<&WireValue>) -> BoundaryResult<()> {
    match (declared, value) {
        (ReturnKind::Void, None) => Ok(()),
        (ReturnKind::Void, Some(_)) => Err(BoundaryError::Malformed("void call produced a value")),
        (ReturnKind::Value(_), None) => {
            Err(BoundaryError::Malformed("call declared a value but returned none"))
        }
        (ReturnKind::Value(kind), Some(value)) if value.kind() == kind => Ok(()),
        (ReturnKind::Value(kind), Some(value)) => Err(BoundaryError::mismatch(kind, value.kind())),
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
