//! Wire adapters registering the battery on a dispatcher.

use crate::codec::collection;
use crate::codec::domain::{WireKind, WireValue};
use crate::codec::reference::{self, RecordPatch};
use crate::codec::scalar::{Increment, WireScalar};
use crate::codec::text;
use crate::common::error::TypedErrorKind;
use crate::dispatch::domain::{CallArgs, ParamKind, ReturnKind, Signature};
use crate::dispatch::service::Dispatcher;

use super::ops;

/// Every operation name `register` installs.
pub const OPERATIONS: &[&str] = &[
    "bool_inc_test",
    "i8_inc_test",
    "i16_inc_test",
    "i32_inc_test",
    "i64_inc_test",
    "u8_inc_test",
    "u16_inc_test",
    "u32_inc_test",
    "u64_inc_test",
    "float_inc_test",
    "double_inc_test",
    "string_inc_test",
    "byref_inc_test",
    "record_inc_test",
    "optional_type_inc_test",
    "vector_inc_test",
    "hash_map_inc_test",
    "void_inc_test",
    "error_inc_test",
];

/// Install the full battery.
pub fn register(d: &mut Dispatcher) {
    d.register(
        "bool_inc_test",
        Signature::unary(WireKind::Bool),
        |args: &mut CallArgs| Ok(Some(WireValue::Bool(ops::bool_inc_test(args.scalar(0)?)))),
    );

    register_checked::<i8>(d, "i8_inc_test");
    register_checked::<i16>(d, "i16_inc_test");
    register_checked::<i32>(d, "i32_inc_test");
    register_checked::<i64>(d, "i64_inc_test");
    register_checked::<u8>(d, "u8_inc_test");
    register_checked::<u16>(d, "u16_inc_test");
    register_checked::<u32>(d, "u32_inc_test");
    register_checked::<u64>(d, "u64_inc_test");

    d.register(
        "float_inc_test",
        Signature::unary(WireKind::F32),
        |args: &mut CallArgs| Ok(Some(WireValue::F32(ops::float_inc_test(args.scalar(0)?)))),
    );
    d.register(
        "double_inc_test",
        Signature::unary(WireKind::F64),
        |args: &mut CallArgs| Ok(Some(WireValue::F64(ops::double_inc_test(args.scalar(0)?)))),
    );

    d.register(
        "string_inc_test",
        Signature::unary(WireKind::Text),
        |args: &mut CallArgs| {
            let value = text::decode(args.value(0)?)?;
            Ok(Some(text::encode(ops::string_inc_test(value))))
        },
    );

    d.register(
        "byref_inc_test",
        Signature::new([ParamKind::ByRef], ReturnKind::Void),
        |args: &mut CallArgs| {
            let handle = args.handle(0)?;
            let mut point = args.record(handle)?;
            ops::byref_inc_test(&mut point);
            args.apply_mutation(handle, RecordPatch::both(point.x, point.y))?;
            Ok(None)
        },
    );

    d.register(
        "record_inc_test",
        Signature::unary(WireKind::Record),
        |args: &mut CallArgs| {
            let point = reference::decode(args.value(0)?)?;
            Ok(Some(WireValue::Record(ops::record_inc_test(point))))
        },
    );

    d.register(
        "optional_type_inc_test",
        Signature::unary(WireKind::Optional).raising(TypedErrorKind::Overflow),
        |args: &mut CallArgs| {
            let value = collection::decode_optional(args.value(0)?)?
                .map(crate::codec::scalar::decode::<i32>)
                .transpose()?;
            let out = ops::optional_type_inc_test(value)?;
            Ok(Some(collection::encode_optional(out.map(WireValue::I32))))
        },
    );

    d.register(
        "vector_inc_test",
        Signature::unary(WireKind::Sequence),
        |args: &mut CallArgs| {
            let items = collection::decode_text_seq(args.value(0)?)?;
            Ok(Some(collection::encode_text_seq(&ops::vector_inc_test(&items))))
        },
    );

    d.register(
        "hash_map_inc_test",
        Signature::unary(WireKind::Mapping),
        |args: &mut CallArgs| {
            let entries = collection::decode_scalar_map::<i32>(args.value(0)?)?;
            Ok(Some(collection::encode_scalar_map(&ops::hash_map_inc_test(entries))))
        },
    );

    d.register(
        "void_inc_test",
        Signature::new([ParamKind::Value(WireKind::I32)], ReturnKind::Void),
        |args: &mut CallArgs| {
            ops::void_inc_test(args.scalar(0)?);
            Ok(None)
        },
    );

    d.register(
        "error_inc_test",
        Signature::new(
            [
                ParamKind::Value(WireKind::U64),
                ParamKind::Value(WireKind::U64),
            ],
            ReturnKind::Value(WireKind::U64),
        )
        .raising(TypedErrorKind::Overflow),
        |args: &mut CallArgs| {
            let sum = ops::error_inc_test(args.scalar(0)?, args.scalar(1)?)?;
            Ok(Some(WireValue::U64(sum)))
        },
    );
}

fn register_checked<T>(d: &mut Dispatcher, name: &str)
where
    T: WireScalar + Increment + 'static,
{
    d.register(
        name,
        Signature::unary(T::KIND).raising(TypedErrorKind::Overflow),
        |args: &mut CallArgs| {
            let value: T = args.scalar(0)?;
            Ok(Some(ops::int_inc_test(value)?.into_wire()))
        },
    );
}
