//! Fixed-width primitive values: bool, signed/unsigned integers, floats.

use crate::common::buf::{WireBuf, WireReader};
use crate::common::error::{BoundaryError, BoundaryResult, TypedError};

use super::domain::{WireKind, WireValue};

/// Primitive that maps onto exactly one scalar `WireKind`.
pub trait WireScalar: Copy + Sized {
    const KIND: WireKind;

    fn into_wire(self) -> WireValue;

    /// Extract from a value of the matching kind, `None` otherwise.
    fn from_wire(value: &WireValue) -> Option<Self>;

    fn write(self, buf: &mut WireBuf);

    fn read(reader: &mut WireReader<'_>) -> BoundaryResult<Self>;
}

macro_rules! wire_scalar {
    ($($ty:ty => $variant:ident, $put:ident, $get:ident;)*) => {
        $(
            impl WireScalar for $ty {
                const KIND: WireKind = WireKind::$variant;

                fn into_wire(self) -> WireValue {
                    WireValue::$variant(self)
                }

                fn from_wire(value: &WireValue) -> Option<Self> {
                    match value {
                        WireValue::$variant(v) => Some(*v),
                        _ => None,
                    }
                }

                fn write(self, buf: &mut WireBuf) {
                    buf.$put(self);
                }

                fn read(reader: &mut WireReader<'_>) -> BoundaryResult<Self> {
                    reader.$get()
                }
            }
        )*
    };
}

wire_scalar! {
    bool => Bool, put_bool, get_bool;
    i8 => I8, put_i8, get_i8;
    i16 => I16, put_i16, get_i16;
    i32 => I32, put_i32, get_i32;
    i64 => I64, put_i64, get_i64;
    u8 => U8, put_u8, get_u8;
    u16 => U16, put_u16, get_u16;
    u32 => U32, put_u32, get_u32;
    u64 => U64, put_u64, get_u64;
    f32 => F32, put_f32, get_f32;
    f64 => F64, put_f64, get_f64;
}

/// Wrap a primitive. Total and lossless.
pub fn encode<T: WireScalar>(value: T) -> WireValue {
    value.into_wire()
}

/// Unwrap a primitive, failing with `TypeMismatch` when the tag is not `T::KIND`.
pub fn decode<T: WireScalar>(value: &WireValue) -> BoundaryResult<T> {
    T::from_wire(value).ok_or_else(|| BoundaryError::mismatch(T::KIND, value.kind()))
}

/// Write the payload of a scalar value (no tag).
pub(crate) fn write_payload(value: &WireValue, buf: &mut WireBuf) -> bool {
    match *value {
        WireValue::Bool(v) => v.write(buf),
        WireValue::I8(v) => v.write(buf),
        WireValue::I16(v) => v.write(buf),
        WireValue::I32(v) => v.write(buf),
        WireValue::I64(v) => v.write(buf),
        WireValue::U8(v) => v.write(buf),
        WireValue::U16(v) => v.write(buf),
        WireValue::U32(v) => v.write(buf),
        WireValue::U64(v) => v.write(buf),
        WireValue::F32(v) => v.write(buf),
        WireValue::F64(v) => v.write(buf),
        _ => return false,
    }
    true
}

/// Read the payload of a scalar of the given kind, `None` if the kind is not scalar.
pub(crate) fn read_payload(
    kind: WireKind,
    reader: &mut WireReader<'_>,
) -> Option<BoundaryResult<WireValue>> {
    let value = match kind {
        WireKind::Bool => bool::read(reader).map(WireValue::Bool),
        WireKind::I8 => i8::read(reader).map(WireValue::I8),
        WireKind::I16 => i16::read(reader).map(WireValue::I16),
        WireKind::I32 => i32::read(reader).map(WireValue::I32),
        WireKind::I64 => i64::read(reader).map(WireValue::I64),
        WireKind::U8 => u8::read(reader).map(WireValue::U8),
        WireKind::U16 => u16::read(reader).map(WireValue::U16),
        WireKind::U32 => u32::read(reader).map(WireValue::U32),
        WireKind::U64 => u64::read(reader).map(WireValue::U64),
        WireKind::F32 => f32::read(reader).map(WireValue::F32),
        WireKind::F64 => f64::read(reader).map(WireValue::F64),
        _ => return None,
    };
    Some(value)
}

/// The "+1" used by the test battery.
///
/// Integers are checked and raise `Overflow` at their maximum. Floats add 1.0.
/// Booleans flip.
pub trait Increment: Sized {
    fn increment(self) -> Result<Self, TypedError>;
}

macro_rules! checked_increment {
    ($($ty:ty),*) => {
        $(
            impl Increment for $ty {
                fn increment(self) -> Result<Self, TypedError> {
                    self.checked_add(1).ok_or_else(TypedError::overflow)
                }
            }
        )*
    };
}

checked_increment!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Increment for f32 {
    fn increment(self) -> Result<Self, TypedError> {
        Ok(self + 1.0)
    }
}

impl Increment for f64 {
    fn increment(self) -> Result<Self, TypedError> {
        Ok(self + 1.0)
    }
}

impl Increment for bool {
    fn increment(self) -> Result<Self, TypedError> {
        Ok(!self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::TypedErrorKind;
    use proptest::prelude::*;

    fn payload_round_trip<T: WireScalar + PartialEq + std::fmt::Debug>(value: T) {
        let mut buf = WireBuf::default();
        value.write(&mut buf);
        assert_eq!(Some(buf.len()), T::KIND.fixed_width());
        let mut reader = WireReader::new(buf.as_slice());
        assert_eq!(T::read(&mut reader).unwrap(), value);
        reader.finish().unwrap();
    }

    #[test]
    fn extremes_survive_the_wire() {
        payload_round_trip(true);
        payload_round_trip(i8::MIN);
        payload_round_trip(i16::MAX);
        payload_round_trip(i32::MIN);
        payload_round_trip(i64::MAX);
        payload_round_trip(u8::MAX);
        payload_round_trip(u16::MAX);
        payload_round_trip(u32::MAX);
        payload_round_trip(u64::MAX);
        payload_round_trip(f32::MIN_POSITIVE);
        payload_round_trip(f64::NEG_INFINITY);
    }

    #[test]
    fn decode_rejects_other_kinds() {
        let err = decode::<i32>(&WireValue::I64(1)).unwrap_err();
        assert_eq!(
            err,
            BoundaryError::TypeMismatch {
                expected: WireKind::I32,
                found: WireKind::I64
            }
        );
    }

    #[test]
    fn short_payload_is_truncated() {
        let mut reader = WireReader::new(&[0, 0, 0]);
        assert!(matches!(
            i64::read(&mut reader),
            Err(BoundaryError::Truncated {
                needed: 8,
                available: 3
            })
        ));
    }

    #[test]
    fn max_values_overflow_instead_of_wrapping() {
        assert_eq!(i8::MAX.increment().unwrap_err().kind, TypedErrorKind::Overflow);
        assert_eq!(i16::MAX.increment().unwrap_err().kind, TypedErrorKind::Overflow);
        assert_eq!(i32::MAX.increment().unwrap_err().kind, TypedErrorKind::Overflow);
        assert_eq!(i64::MAX.increment().unwrap_err().kind, TypedErrorKind::Overflow);
        assert_eq!(u8::MAX.increment().unwrap_err().kind, TypedErrorKind::Overflow);
        assert_eq!(u16::MAX.increment().unwrap_err().kind, TypedErrorKind::Overflow);
        assert_eq!(u32::MAX.increment().unwrap_err().kind, TypedErrorKind::Overflow);
        assert_eq!(u64::MAX.increment().unwrap_err().kind, TypedErrorKind::Overflow);
    }

    fn wire_round_trip<T>(value: T) -> Result<(), TestCaseError>
    where
        T: WireScalar + PartialEq + std::fmt::Debug + Copy,
    {
        prop_assert_eq!(decode::<T>(&encode(value)).unwrap(), value);
        let mut buf = WireBuf::default();
        value.write(&mut buf);
        prop_assert_eq!(T::read(&mut WireReader::new(buf.as_slice())).unwrap(), value);
        Ok(())
    }

    #[test]
    fn float_and_bool_increments() {
        assert_eq!(0.0f32.increment(), Ok(1.0));
        assert_eq!(0.0f64.increment(), Ok(1.0));
        assert_eq!(true.increment(), Ok(false));
    }

    proptest! {
        #[test]
        fn every_integer_width_round_trips(
            b in any::<bool>(),
            i8v in any::<i8>(),
            i16v in any::<i16>(),
            i32v in any::<i32>(),
            i64v in any::<i64>(),
            u8v in any::<u8>(),
            u16v in any::<u16>(),
            u32v in any::<u32>(),
            u64v in any::<u64>(),
        ) {
            wire_round_trip(b)?;
            wire_round_trip(i8v)?;
            wire_round_trip(i16v)?;
            wire_round_trip(i32v)?;
            wire_round_trip(i64v)?;
            wire_round_trip(u8v)?;
            wire_round_trip(u16v)?;
            wire_round_trip(u32v)?;
            wire_round_trip(u64v)?;
        }

        #[test]
        fn f32_round_trips_bitwise(bits in any::<u32>()) {
            let v = f32::from_bits(bits);
            let mut buf = WireBuf::default();
            v.write(&mut buf);
            let back = f32::read(&mut WireReader::new(buf.as_slice())).unwrap();
            prop_assert_eq!(back.to_bits(), bits);
            prop_assert_eq!(f32::from_wire(&encode(v)).map(f32::to_bits), Some(bits));
        }

        #[test]
        fn f64_round_trips_bitwise(bits in any::<u64>()) {
            let v = f64::from_bits(bits);
            let mut buf = WireBuf::default();
            v.write(&mut buf);
            let back = f64::read(&mut WireReader::new(buf.as_slice())).unwrap();
            prop_assert_eq!(back.to_bits(), bits);
        }

        #[test]
        fn i16_increment_is_exact_below_max(v in i16::MIN..i16::MAX) {
            prop_assert_eq!(v.increment().unwrap(), v + 1);
        }

        #[test]
        fn i8_increment_is_exact_below_max(v in i8::MIN..i8::MAX) {
            prop_assert_eq!(v.increment().unwrap(), v + 1);
        }
    }
}
