//! Call model: descriptors built by callers, signatures registered by callees,
//! and the argument view an operation receives.

use crate::codec::domain::{Record, WireKind, WireValue};
use crate::codec::reference::{Handle, HandleTable, RecordPatch};
use crate::codec::scalar::{self, WireScalar};
use crate::common::error::{BoundaryError, BoundaryResult, TypedErrorKind};

/// What a call hands back on success.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReturnKind {
    Value(WireKind),
    Void,
}

/// Which typed error, if any, a call may raise.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorDecl {
    None,
    Typed(TypedErrorKind),
}

impl ErrorDecl {
    pub fn allows(&self, kind: TypedErrorKind) -> bool {
        matches!(self, ErrorDecl::Typed(declared) if *declared == kind)
    }
}

/// Parameter slot in an operation's signature.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParamKind {
    Value(WireKind),
    ByRef,
}

/// Static signature an operation is registered with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    pub params: Vec<ParamKind>,
    pub returns: ReturnKind,
    pub errors: ErrorDecl,
}

impl Signature {
    pub fn new(params: impl Into<Vec<ParamKind>>, returns: ReturnKind) -> Self {
        Self {
            params: params.into(),
            returns,
            errors: ErrorDecl::None,
        }
    }

    /// Shorthand for `T -> T` operations.
    pub fn unary(kind: WireKind) -> Self {
        Self::new([ParamKind::Value(kind)], ReturnKind::Value(kind))
    }

    pub fn raising(mut self, kind: TypedErrorKind) -> Self {
        self.errors = ErrorDecl::Typed(kind);
        self
    }
}

/// Caller-side argument.
#[derive(Debug)]
pub enum Arg<'a> {
    Value(WireValue),
    /// Caller-owned record, mutated in place once the call returns.
    ByRef(&'a mut Record),
}

/// A single call request. Built once, then consumed by the dispatcher.
#[derive(Debug)]
pub struct CallDescriptor<'a> {
    name: String,
    args: Vec<Arg<'a>>,
    returns: ReturnKind,
    errors: ErrorDecl,
}

impl<'a> CallDescriptor<'a> {
    pub fn new(name: impl Into<String>, returns: ReturnKind) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            returns,
            errors: ErrorDecl::None,
        }
    }

    /// Descriptor matching a registered signature, for callers that only know the name.
    pub fn for_signature(name: impl Into<String>, signature: &Signature) -> Self {
        Self {
            name: name.into(),
            args: Vec::with_capacity(signature.params.len()),
            returns: signature.returns,
            errors: signature.errors,
        }
    }

    pub fn arg(mut self, value: impl Into<WireValue>) -> Self {
        self.args.push(Arg::Value(value.into()));
        self
    }

    pub fn by_ref(mut self, record: &'a mut Record) -> Self {
        self.args.push(Arg::ByRef(record));
        self
    }

    pub fn raises(mut self, kind: TypedErrorKind) -> Self {
        self.errors = ErrorDecl::Typed(kind);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn returns(&self) -> ReturnKind {
        self.returns
    }

    pub fn errors(&self) -> ErrorDecl {
        self.errors
    }

    pub fn args(&self) -> &[Arg<'a>] {
        &self.args
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Arg<'a>>, ReturnKind, ErrorDecl) {
        (self.name, self.args, self.returns, self.errors)
    }
}

/// Argument as the callee sees it.
#[derive(Debug)]
enum CalleeArg {
    Value(WireValue),
    Ref(Handle),
}

/// Arguments handed to an operation, plus the records lent to this call.
#[derive(Debug, Default)]
pub struct CallArgs {
    args: Vec<CalleeArg>,
    refs: HandleTable,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_value(&mut self, value: WireValue) {
        self.args.push(CalleeArg::Value(value));
    }

    pub fn push_ref(&mut self, record: &Record) -> Handle {
        let handle = self.refs.encode_by_ref(record);
        self.args.push(CalleeArg::Ref(handle));
        handle
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn value(&self, idx: usize) -> BoundaryResult<&WireValue> {
        match self.args.get(idx) {
            Some(CalleeArg::Value(value)) => Ok(value),
            Some(CalleeArg::Ref(_)) => Err(BoundaryError::Malformed("argument is by-reference")),
            None => Err(BoundaryError::Malformed("argument index out of range")),
        }
    }

    /// Take ownership of a value argument, leaving a placeholder behind.
    pub fn take_value(&mut self, idx: usize) -> BoundaryResult<WireValue> {
        match self.args.get_mut(idx) {
            Some(CalleeArg::Value(value)) => Ok(std::mem::replace(value, WireValue::Bool(false))),
            Some(CalleeArg::Ref(_)) => Err(BoundaryError::Malformed("argument is by-reference")),
            None => Err(BoundaryError::Malformed("argument index out of range")),
        }
    }

    pub fn scalar<T: WireScalar>(&self, idx: usize) -> BoundaryResult<T> {
        scalar::decode(self.value(idx)?)
    }

    pub fn handle(&self, idx: usize) -> BoundaryResult<Handle> {
        match self.args.get(idx) {
            Some(CalleeArg::Ref(handle)) => Ok(*handle),
            Some(CalleeArg::Value(_)) => Err(BoundaryError::Malformed("argument is by-value")),
            None => Err(BoundaryError::Malformed("argument index out of range")),
        }
    }

    pub fn record(&self, handle: Handle) -> BoundaryResult<Record> {
        self.refs.get(handle)
    }

    pub fn apply_mutation(&mut self, handle: Handle, patch: RecordPatch) -> BoundaryResult<()> {
        self.refs.apply_mutation(handle, patch)
    }

    pub(crate) fn into_refs(self) -> HandleTable {
        self.refs
    }
}

/// Callee side of a registered operation.
///
/// `Ok(None)` is the void return. Typed failures are `BoundaryError::Domain`.
pub trait Operation: Send + Sync {
    fn call(&self, args: &mut CallArgs) -> BoundaryResult<Option<WireValue>>;
}

impl<F> Operation for F
where
    F: Fn(&mut CallArgs) -> BoundaryResult<Option<WireValue>> + Send + Sync,
{
    fn call(&self, args: &mut CallArgs) -> BoundaryResult<Option<WireValue>> {
        self(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_argument_order() {
        let mut record = Record::default();
        let desc = CallDescriptor::new("op", ReturnKind::Void)
            .arg(WireValue::I32(1))
            .by_ref(&mut record)
            .arg("two")
            .raises(TypedErrorKind::Overflow);
        assert_eq!(desc.name(), "op");
        assert_eq!(desc.args().len(), 3);
        assert!(matches!(desc.args()[1], Arg::ByRef(_)));
        assert!(desc.errors().allows(TypedErrorKind::Overflow));
    }

    #[test]
    fn call_args_distinguish_values_and_refs() {
        let mut args = CallArgs::new();
        args.push_value(WireValue::I64(5));
        let handle = args.push_ref(&Record::new(1.0, 1.0));
        assert_eq!(args.scalar::<i64>(0).unwrap(), 5);
        assert!(args.scalar::<i32>(0).is_err());
        assert_eq!(args.handle(1).unwrap(), handle);
        assert!(args.handle(0).is_err());
        assert!(args.value(2).is_err());
        assert_eq!(args.record(handle).unwrap(), Record::new(1.0, 1.0));
    }

    #[test]
    fn undeclared_errors_are_not_allowed() {
        assert!(!ErrorDecl::None.allows(TypedErrorKind::Overflow));
    }
}
