//! C-compatible API exposed to foreign hosts (Python ctypes, Swift, JNA).
//!
//! Ownership rules:
//! - Every `ForeignBuffer` is allocated by Rust (`wirecall_buffer_alloc` or a
//!   call result) and released by Rust (`wirecall_buffer_free`, or by being
//!   passed as `args`, which consumes it).
//! - `CallStatus::error_buf` is owned by the host after a failed call and must
//!   be freed with `wirecall_buffer_free`.
//! - Panics never unwind into the host; they are reported as transport failures.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::OnceLock;

use static_assertions::{assert_eq_size, const_assert_eq};

use crate::battery;
use crate::codec::domain::Record;
use crate::common::config::WireCfg;
use crate::common::error::{BoundaryError, BoundaryResult};
use crate::common::log;
use crate::dispatch::channel::encode_typed_error;
use crate::dispatch::service::{panic_message, Dispatcher};

/// ABI version the host checks before making calls.
pub const API_VERSION: u32 = 1;

pub const CALL_SUCCESS: i8 = 0;
pub const CALL_TYPED_ERROR: i8 = 1;
pub const CALL_TRANSPORT_ERROR: i8 = 2;

/// Byte buffer handed across the boundary.
#[repr(C)]
#[derive(Debug)]
pub struct ForeignBuffer {
    pub capacity: i32,
    pub len: i32,
    pub data: *mut u8,
}

impl ForeignBuffer {
    pub fn empty() -> Self {
        Self {
            capacity: 0,
            len: 0,
            data: ptr::null_mut(),
        }
    }

    /// Move bytes into a buffer the host can read. Capacity equals length.
    pub fn from_vec(bytes: Vec<u8>) -> BoundaryResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::empty());
        }
        let len = i32::try_from(bytes.len()).map_err(|_| BoundaryError::FrameTooLarge {
            len: bytes.len(),
            limit: i32::MAX as usize,
        })?;
        let data = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
        Ok(Self {
            capacity: len,
            len,
            data,
        })
    }

    /// Borrow the filled part of the buffer.
    ///
    /// # Safety
    /// `data` must come from this crate and hold at least `capacity` bytes.
    pub unsafe fn as_slice(&self) -> BoundaryResult<&[u8]> {
        if self.data.is_null() {
            return match self.len {
                0 => Ok(&[]),
                _ => Err(BoundaryError::NullPointer("buffer data")),
            };
        }
        if self.len < 0 || self.len > self.capacity {
            return Err(BoundaryError::Malformed("buffer length outside capacity"));
        }
        Ok(std::slice::from_raw_parts(self.data, self.len as usize))
    }

    /// Release the allocation.
    ///
    /// # Safety
    /// `data` must come from this crate and not have been freed already.
    pub unsafe fn free(self) {
        if self.data.is_null() || self.capacity <= 0 {
            return;
        }
        let slice = ptr::slice_from_raw_parts_mut(self.data, self.capacity as usize);
        drop(Box::from_raw(slice));
    }
}

/// Outcome word written by every call.
#[repr(C)]
#[derive(Debug)]
pub struct CallStatus {
    pub code: i8,
    pub error_buf: ForeignBuffer,
}

impl Default for CallStatus {
    fn default() -> Self {
        Self {
            code: CALL_SUCCESS,
            error_buf: ForeignBuffer::empty(),
        }
    }
}

// Layouts the host bindings hard-code.
assert_eq_size!(Record, [f64; 2]);
const_assert_eq!(std::mem::offset_of!(ForeignBuffer, len), 4);
const_assert_eq!(std::mem::offset_of!(ForeignBuffer, data), 8);
const_assert_eq!(std::mem::offset_of!(CallStatus, error_buf), std::mem::align_of::<ForeignBuffer>());

fn battery_dispatcher() -> &'static Dispatcher {
    static BATTERY: OnceLock<Dispatcher> = OnceLock::new();
    BATTERY.get_or_init(|| battery::dispatcher(&WireCfg::load()))
}

/// Install the tracing subscriber configured by `WIRECALL_LOG*`. Hosts that
/// want logs call this once; repeated calls are no-ops.
#[no_mangle]
pub extern "C" fn wirecall_init_logging() {
    log::init(&WireCfg::load());
}

#[no_mangle]
pub extern "C" fn wirecall_api_version() -> u32 {
    API_VERSION
}

/// Allocate a zeroed buffer of `size` bytes with `len` 0 for the host to fill.
#[no_mangle]
pub extern "C" fn wirecall_buffer_alloc(size: i32) -> ForeignBuffer {
    let Ok(size) = usize::try_from(size) else {
        return ForeignBuffer::empty();
    };
    match ForeignBuffer::from_vec(vec![0u8; size]) {
        Ok(mut buf) => {
            buf.len = 0;
            buf
        }
        Err(_) => ForeignBuffer::empty(),
    }
}

#[no_mangle]
pub extern "C" fn wirecall_buffer_free(buf: ForeignBuffer) {
    unsafe { buf.free() }
}

/// Call a battery operation. `args` is an encoded sequence frame and is consumed.
#[no_mangle]
pub extern "C" fn wirecall_invoke(
    name: *const c_char,
    args: ForeignBuffer,
    status: *mut CallStatus,
) -> ForeignBuffer {
    with_status(name, args, status, |name, frame| {
        battery_dispatcher().invoke_frame(name, frame, None)
    })
}

/// Call a battery operation taking a record by reference. The host's record is
/// updated in place before this returns; on failure it is left untouched.
#[no_mangle]
pub extern "C" fn wirecall_invoke_byref(
    name: *const c_char,
    record: *mut Record,
    args: ForeignBuffer,
    status: *mut CallStatus,
) -> ForeignBuffer {
    with_status(name, args, status, |name, frame| {
        if record.is_null() {
            return Err(BoundaryError::NullPointer("record"));
        }
        let record = unsafe { &mut *record };
        battery_dispatcher().invoke_frame(name, frame, Some(record))
    })
}

fn with_status<F>(
    name: *const c_char,
    args: ForeignBuffer,
    status: *mut CallStatus,
    call: F,
) -> ForeignBuffer
where
    F: FnOnce(&str, &[u8]) -> BoundaryResult<Vec<u8>>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let name = read_name(name)?;
        let frame = unsafe { args.as_slice() }?;
        call(name, frame)
    }))
    .unwrap_or_else(|payload| Err(BoundaryError::Panicked(panic_message(payload.as_ref()))));
    unsafe { args.free() };

    let (code, error_buf, out) = match result.and_then(ForeignBuffer::from_vec) {
        Ok(out) => (CALL_SUCCESS, ForeignBuffer::empty(), out),
        Err(BoundaryError::Domain(err)) => match encode_typed_error(&err).and_then(ForeignBuffer::from_vec) {
            Ok(buf) => (CALL_TYPED_ERROR, buf, ForeignBuffer::empty()),
            Err(encode_err) => (CALL_TRANSPORT_ERROR, message_buf(&encode_err), ForeignBuffer::empty()),
        },
        Err(err) => (CALL_TRANSPORT_ERROR, message_buf(&err), ForeignBuffer::empty()),
    };

    if status.is_null() {
        tracing::warn!(code, "call status pointer is null; dropping error buffer");
        unsafe { error_buf.free() };
    } else {
        unsafe {
            (*status).code = code;
            (*status).error_buf = error_buf;
        }
    }
    out
}

fn read_name<'a>(name: *const c_char) -> BoundaryResult<&'a str> {
    if name.is_null() {
        return Err(BoundaryError::NullPointer("operation name"));
    }
    unsafe { CStr::from_ptr(name) }
        .to_str()
        .map_err(|_| BoundaryError::Malformed("operation name is not utf-8"))
}

fn message_buf(err: &BoundaryError) -> ForeignBuffer {
    ForeignBuffer::from_vec(err.to_string().into_bytes()).unwrap_or_else(|_| ForeignBuffer::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::domain::WireValue;
    use crate::codec::frame::{decode_frame, encode_frame, DecodeLimits};
    use crate::common::error::TypedErrorKind;
    use crate::dispatch::channel::decode_typed_error;
    use std::ffi::CString;

    fn args_buf(values: Vec<WireValue>) -> ForeignBuffer {
        let frame = encode_frame(&WireValue::Sequence(values)).unwrap();
        let mut buf = wirecall_buffer_alloc(frame.len() as i32);
        unsafe { std::slice::from_raw_parts_mut(buf.data, frame.len()) }.copy_from_slice(&frame);
        buf.len = frame.len() as i32;
        buf
    }

    fn call(name: &str, values: Vec<WireValue>) -> (CallStatus, ForeignBuffer) {
        let name = CString::new(name).unwrap();
        let mut status = CallStatus::default();
        let out = wirecall_invoke(name.as_ptr(), args_buf(values), &mut status);
        (status, out)
    }

    fn decode_out(out: &ForeignBuffer) -> WireValue {
        decode_frame(unsafe { out.as_slice() }.unwrap(), DecodeLimits::default()).unwrap()
    }

    #[test]
    fn dispatching_does_not_install_a_subscriber() {
        battery_dispatcher();
        assert!(!tracing::dispatcher::has_been_set());
    }

    #[test]
    fn version_is_stable() {
        assert_eq!(wirecall_api_version(), 1);
    }

    #[test]
    fn successful_call_returns_a_frame() {
        let (status, out) = call("i32_inc_test", vec![WireValue::I32(41)]);
        assert_eq!(status.code, CALL_SUCCESS);
        assert_eq!(decode_out(&out), WireValue::I32(42));
        wirecall_buffer_free(out);
    }

    #[test]
    fn overflow_travels_as_typed_error() {
        let (status, out) = call("u64_inc_test", vec![WireValue::U64(u64::MAX)]);
        assert_eq!(status.code, CALL_TYPED_ERROR);
        assert!(out.data.is_null());
        let bytes = unsafe { status.error_buf.as_slice() }.unwrap();
        let err = decode_typed_error(bytes, DecodeLimits::default()).unwrap();
        assert_eq!(err.kind, TypedErrorKind::Overflow);
        wirecall_buffer_free(status.error_buf);
    }

    #[test]
    fn transport_failures_carry_a_message() {
        let (status, _) = call("no_such_op", vec![]);
        assert_eq!(status.code, CALL_TRANSPORT_ERROR);
        let msg = String::from_utf8(unsafe { status.error_buf.as_slice() }.unwrap().to_vec()).unwrap();
        assert!(msg.contains("no_such_op"));
        wirecall_buffer_free(status.error_buf);
    }

    #[test]
    fn void_call_returns_empty_buffer() {
        let (status, out) = call("void_inc_test", vec![WireValue::I32(0)]);
        assert_eq!(status.code, CALL_SUCCESS);
        assert_eq!(out.len, 0);
        assert!(out.data.is_null());
    }

    #[test]
    fn byref_mutates_host_record() {
        let name = CString::new("byref_inc_test").unwrap();
        let mut point = Record::new(0.0, 0.0);
        let mut status = CallStatus::default();
        let out = wirecall_invoke_byref(name.as_ptr(), &mut point, args_buf(vec![]), &mut status);
        assert_eq!(status.code, CALL_SUCCESS);
        assert_eq!(out.len, 0);
        assert_eq!(point, Record::new(1.0, 1.0));
    }

    #[test]
    fn null_pointers_are_reported_not_dereferenced() {
        let mut status = CallStatus::default();
        wirecall_invoke(ptr::null(), ForeignBuffer::empty(), &mut status);
        assert_eq!(status.code, CALL_TRANSPORT_ERROR);
        wirecall_buffer_free(status.error_buf);

        let name = CString::new("byref_inc_test").unwrap();
        let mut status = CallStatus::default();
        wirecall_invoke_byref(name.as_ptr(), ptr::null_mut(), args_buf(vec![]), &mut status);
        assert_eq!(status.code, CALL_TRANSPORT_ERROR);
        wirecall_buffer_free(status.error_buf);

        // a null status pointer must not crash either
        wirecall_invoke(name.as_ptr(), args_buf(vec![]), ptr::null_mut());
    }

    #[test]
    fn bad_buffer_lengths_are_malformed() {
        let mut buf = wirecall_buffer_alloc(4);
        buf.len = 8;
        let name = CString::new("i32_inc_test").unwrap();
        let mut status = CallStatus::default();
        wirecall_invoke(name.as_ptr(), buf, &mut status);
        assert_eq!(status.code, CALL_TRANSPORT_ERROR);
        wirecall_buffer_free(status.error_buf);
    }

    #[test]
    fn alloc_rejects_negative_sizes() {
        let buf = wirecall_buffer_alloc(-1);
        assert!(buf.data.is_null());
        wirecall_buffer_free(buf);
    }
}
