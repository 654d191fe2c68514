//! Plain Rust bodies of the battery operations, free of any wire handling.

use std::collections::HashMap;

use crate::codec::collection;
use crate::codec::domain::{Record, WireValue};
use crate::codec::scalar::Increment;
use crate::codec::text;
use crate::common::error::{TypedError, TypedErrorKind};

pub fn bool_inc_test(value: bool) -> bool {
    !value
}

/// Checked `+1` for any fixed-width integer.
pub fn int_inc_test<T: Increment>(value: T) -> Result<T, TypedError> {
    value.increment()
}

pub fn float_inc_test(value: f32) -> f32 {
    value + 1.0
}

pub fn double_inc_test(value: f64) -> f64 {
    value + 1.0
}

pub fn string_inc_test(value: &str) -> String {
    text::duplicate(value)
}

/// In-place increment of both fields.
pub fn byref_inc_test(point: &mut Record) {
    point.x += 1.0;
    point.y += 1.0;
}

/// By-value variant: returns an incremented copy.
pub fn record_inc_test(point: Record) -> Record {
    Record::new(point.x + 1.0, point.y + 1.0)
}

pub fn optional_type_inc_test(value: Option<i32>) -> Result<Option<i32>, TypedError> {
    value.map(Increment::increment).transpose()
}

pub fn vector_inc_test(value: &[String]) -> Vec<String> {
    collection::duplicate(value)
}

pub fn hash_map_inc_test(value: HashMap<String, i32>) -> HashMap<String, i32> {
    collection::augment(value)
}

pub fn void_inc_test(value: i32) {
    tracing::trace!(value, "void_inc_test");
}

/// Sum of two unsigned integers, or `Overflow` carrying both operands.
pub fn error_inc_test(a: u64, b: u64) -> Result<u64, TypedError> {
    a.checked_add(b).ok_or_else(|| {
        TypedError::with_payload(
            TypedErrorKind::Overflow,
            collection::encode_map([("a", WireValue::U64(a)), ("b", WireValue::U64(b))]),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal() {
        assert!(!bool_inc_test(true));
        assert_eq!(int_inc_test(0i8), Ok(1));
        assert_eq!(int_inc_test(0i16), Ok(1));
        assert_eq!(int_inc_test(0i32), Ok(1));
        assert_eq!(int_inc_test(0i64), Ok(1));
        assert_eq!(int_inc_test(0u8), Ok(1));
        assert_eq!(int_inc_test(0u64), Ok(1));
        assert_eq!(float_inc_test(0.0), 1.0);
        assert_eq!(double_inc_test(0.0), 1.0);
        assert_eq!(string_inc_test("Hello World!"), "Hello World!Hello World!");

        let mut point = Record::new(1.0, 2.0);
        byref_inc_test(&mut point);
        assert_eq!(point, Record::new(2.0, 3.0));
        assert_eq!(record_inc_test(point), Record::new(3.0, 4.0));

        assert_eq!(optional_type_inc_test(Some(0)), Ok(Some(1)));
        assert_eq!(optional_type_inc_test(None), Ok(None));
        void_inc_test(0);
    }

    #[test]
    fn optional_at_max_overflows() {
        let err = optional_type_inc_test(Some(i32::MAX)).unwrap_err();
        assert_eq!(err.kind, TypedErrorKind::Overflow);
    }

    #[test]
    fn error_inc_on_success_and_failure() {
        assert_eq!(error_inc_test(0, 5), Ok(5));
        let err = error_inc_test(u64::MAX, 1).unwrap_err();
        assert_eq!(err.kind, TypedErrorKind::Overflow);
        let payload = err.payload.expect("operands attached");
        let operands = collection::decode_map(&payload).unwrap();
        assert_eq!(operands["a"], WireValue::U64(u64::MAX));
        assert_eq!(operands["b"], WireValue::U64(1));
    }
}
