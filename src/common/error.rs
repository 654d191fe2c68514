//! Error handling primitives shared across the core.
//!
//! Two families live here: transport failures (bad frames, wrong tags, unknown
//! operations) and typed domain errors raised by an operation's contract. Both
//! travel as `BoundaryError`, but only `BoundaryError::Domain` carries a
//! `TypedError`, so callers can match on the discriminant instead of the message.

use std::fmt;

use crate::codec::domain::{WireKind, WireValue};

/// Stable error codes that cross the FFI boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BoundaryCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Contract-defined failure carrying a `TypedError`.
    Domain = 1,
    /// Buffer ended before a value was complete.
    Truncated = 2,
    /// Wire tag did not match the expected kind.
    TypeMismatch = 3,
    /// Bytes could not be interpreted (bad flag, negative length, invalid UTF-8).
    Malformed = 4,
    /// Operation name, arity or handle did not resolve.
    BadCall = 5,
    /// Catch-all for bugs: panics, null pointers, double settlement.
    Internal = 6,
}

/// Discriminant of a typed domain error.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypedErrorKind {
    /// Arithmetic result left the representable range of its type.
    Overflow = 1,
}

impl TypedErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypedErrorKind::Overflow => "overflow",
        }
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(TypedErrorKind::Overflow),
            _ => None,
        }
    }
}

impl fmt::Display for TypedErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract-defined failure produced by the callee side of a call.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind}{}", payload_suffix(.payload))]
pub struct TypedError {
    pub kind: TypedErrorKind,
    pub payload: Option<WireValue>,
}

impl TypedError {
    pub fn new(kind: TypedErrorKind) -> Self {
        Self {
            kind,
            payload: None,
        }
    }

    pub fn with_payload(kind: TypedErrorKind, payload: WireValue) -> Self {
        Self {
            kind,
            payload: Some(payload),
        }
    }

    /// Overflow helper.
    pub fn overflow() -> Self {
        Self::new(TypedErrorKind::Overflow)
    }
}

fn payload_suffix(payload: &Option<WireValue>) -> String {
    payload
        .as_ref()
        .map(|payload| format!(" ({payload:?})"))
        .unwrap_or_default()
}

/// Canonical error type for every call crossing the boundary.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BoundaryError {
    /// Typed error raised by the operation itself.
    #[error("domain error: {0}")]
    Domain(TypedError),

    #[error("truncated buffer: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: WireKind, found: WireKind },

    #[error("malformed wire data: {0}")]
    Malformed(&'static str),

    #[error("unknown wire tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("{0} trailing bytes left after decoding")]
    TrailingBytes(usize),

    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),

    #[error("frame of {len} bytes exceeds limit of {limit}")]
    FrameTooLarge { len: usize, limit: usize },

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("operation {op} takes {expected} arguments, got {found}")]
    ArityMismatch {
        op: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown record handle {0}")]
    UnknownHandle(u64),

    #[error("operation raised undeclared {0} error")]
    UndeclaredError(TypedErrorKind),

    #[error("call already settled")]
    AlreadySettled,

    #[error("call never settled")]
    Unsettled,

    #[error("operation panicked: {0}")]
    Panicked(String),

    #[error("null pointer passed for {0}")]
    NullPointer(&'static str),
}

/// Result alias used throughout the crate.
pub type BoundaryResult<T> = Result<T, BoundaryError>;

impl BoundaryError {
    /// Stable code for the FFI status word.
    pub fn code(&self) -> BoundaryCode {
        match self {
            BoundaryError::Domain(_) => BoundaryCode::Domain,
            BoundaryError::Truncated { .. } => BoundaryCode::Truncated,
            BoundaryError::TypeMismatch { .. } => BoundaryCode::TypeMismatch,
            BoundaryError::Malformed(_)
            | BoundaryError::UnknownTag(_)
            | BoundaryError::TrailingBytes(_)
            | BoundaryError::DepthExceeded(_)
            | BoundaryError::FrameTooLarge { .. } => BoundaryCode::Malformed,
            BoundaryError::UnknownOperation(_)
            | BoundaryError::ArityMismatch { .. }
            | BoundaryError::UnknownHandle(_) => BoundaryCode::BadCall,
            BoundaryError::UndeclaredError(_)
            | BoundaryError::AlreadySettled
            | BoundaryError::Unsettled
            | BoundaryError::Panicked(_)
            | BoundaryError::NullPointer(_) => BoundaryCode::Internal,
        }
    }

    /// True for contract-defined failures, false for every transport failure.
    pub fn is_domain(&self) -> bool {
        matches!(self, BoundaryError::Domain(_))
    }

    /// Kind of the typed error, if this is one.
    pub fn typed_kind(&self) -> Option<TypedErrorKind> {
        match self {
            BoundaryError::Domain(err) => Some(err.kind),
            _ => None,
        }
    }

    /// Borrow the typed error, if this is one.
    pub fn as_typed(&self) -> Option<&TypedError> {
        match self {
            BoundaryError::Domain(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn mismatch(expected: WireKind, found: WireKind) -> Self {
        BoundaryError::TypeMismatch { expected, found }
    }
}

impl From<TypedError> for BoundaryError {
    fn from(err: TypedError) -> Self {
        BoundaryError::Domain(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(BoundaryCode::Ok as u32, 0);
        assert_eq!(BoundaryCode::Domain as u32, 1);
        assert_eq!(BoundaryCode::Truncated as u32, 2);
        assert_eq!(BoundaryCode::TypeMismatch as u32, 3);
        assert_eq!(BoundaryCode::Malformed as u32, 4);
        assert_eq!(BoundaryCode::BadCall as u32, 5);
        assert_eq!(BoundaryCode::Internal as u32, 6);
        assert_eq!(TypedErrorKind::Overflow.code(), 1);
    }

    #[test]
    fn typed_kind_is_recovered_without_parsing() {
        let err: BoundaryError = TypedError::overflow().into();
        assert!(err.is_domain());
        assert_eq!(err.typed_kind(), Some(TypedErrorKind::Overflow));
        assert_eq!(err.code(), BoundaryCode::Domain);
    }

    #[test]
    fn transport_errors_carry_no_typed_kind() {
        let err = BoundaryError::Truncated {
            needed: 4,
            available: 1,
        };
        assert!(!err.is_domain());
        assert_eq!(err.typed_kind(), None);
        assert_eq!(err.code(), BoundaryCode::Truncated);
    }

    #[test]
    fn kind_round_trips_through_code() {
        assert_eq!(
            TypedErrorKind::from_code(TypedErrorKind::Overflow.code()),
            Some(TypedErrorKind::Overflow)
        );
        assert_eq!(TypedErrorKind::from_code(99), None);
        assert_eq!(TypedErrorKind::Overflow.to_string(), "overflow");
    }

    #[test]
    fn typed_error_display_and_source() {
        assert_eq!(TypedError::overflow().to_string(), "overflow");
        let err = TypedError::with_payload(TypedErrorKind::Overflow, WireValue::U64(7));
        assert_eq!(err.to_string(), "overflow (U64(7))");
        let boxed: Box<dyn std::error::Error> = Box::new(err.clone());
        assert!(boxed.source().is_none());
        assert_eq!(BoundaryError::from(err).to_string(), "domain error: overflow (U64(7))");
    }
}
