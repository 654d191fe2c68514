//! Byte buffers used to build and consume wire frames.
//!
//! All fixed-width numbers are big-endian. Lengths and counts are `i32` on the
//! wire; a negative value is malformed.

use super::error::{BoundaryError, BoundaryResult};

/// Growable output buffer for wire frames.
#[derive(Default, Debug)]
pub struct WireBuf {
    inner: Vec<u8>,
}

macro_rules! put_be {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) {
                self.inner.extend_from_slice(&value.to_be_bytes());
            }
        )*
    };
}

impl WireBuf {
    /// Create a buffer with a pre-allocated capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Vec::with_capacity(cap),
        }
    }

    /// Reset the buffer so it can be reused without reallocating.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.inner
    }

    put_be! {
        put_u8: u8,
        put_i8: i8,
        put_u16: u16,
        put_i16: i16,
        put_u32: u32,
        put_i32: i32,
        put_u64: u64,
        put_i64: i64,
        put_f32: f32,
        put_f64: f64,
    }

    pub fn put_bool(&mut self, value: bool) {
        self.inner.push(u8::from(value));
    }

    /// Write a length or element count.
    pub fn put_len(&mut self, len: usize) -> BoundaryResult<()> {
        let len = i32::try_from(len).map_err(|_| BoundaryError::FrameTooLarge {
            len,
            limit: i32::MAX as usize,
        })?;
        self.put_i32(len);
        Ok(())
    }

    /// Write a length prefix followed by the raw bytes.
    pub fn put_prefixed(&mut self, data: &[u8]) -> BoundaryResult<()> {
        self.put_len(data.len())?;
        self.inner.extend_from_slice(data);
        Ok(())
    }
}

/// Cursor over a received wire frame.
#[derive(Debug)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! get_be {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> BoundaryResult<$ty> {
                const WIDTH: usize = std::mem::size_of::<$ty>();
                let mut raw = [0u8; WIDTH];
                raw.copy_from_slice(self.take(WIDTH)?);
                Ok(<$ty>::from_be_bytes(raw))
            }
        )*
    };
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> BoundaryResult<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(BoundaryError::Truncated {
                needed: n,
                available,
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    get_be! {
        get_u8: u8,
        get_i8: i8,
        get_u16: u16,
        get_i16: i16,
        get_u32: u32,
        get_i32: i32,
        get_u64: u64,
        get_i64: i64,
        get_f32: f32,
        get_f64: f64,
    }

    pub fn get_bool(&mut self) -> BoundaryResult<bool> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(BoundaryError::Malformed("boolean byte must be 0 or 1")),
        }
    }

    /// Read a length or element count.
    pub fn get_len(&mut self) -> BoundaryResult<usize> {
        let len = self.get_i32()?;
        usize::try_from(len).map_err(|_| BoundaryError::Malformed("negative length"))
    }

    /// Read a length prefix and that many raw bytes.
    pub fn get_prefixed(&mut self) -> BoundaryResult<&'a [u8]> {
        let len = self.get_len()?;
        self.take(len)
    }

    /// Ensure the whole frame was consumed.
    pub fn finish(self) -> BoundaryResult<()> {
        match self.remaining() {
            0 => Ok(()),
            left => Err(BoundaryError::TrailingBytes(left)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_big_endian() {
        let mut buf = WireBuf::default();
        buf.put_i32(1);
        buf.put_u16(0x0102);
        assert_eq!(buf.as_slice(), &[0, 0, 0, 1, 1, 2]);
    }

    #[test]
    fn short_read_reports_needed_and_available() {
        let mut reader = WireReader::new(&[0, 1]);
        assert_eq!(
            reader.get_i32(),
            Err(BoundaryError::Truncated {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn negative_length_is_malformed() {
        let mut buf = WireBuf::default();
        buf.put_i32(-1);
        let mut reader = WireReader::new(buf.as_slice());
        assert!(matches!(reader.get_len(), Err(BoundaryError::Malformed(_))));
    }

    #[test]
    fn bool_rejects_other_bytes() {
        assert_eq!(WireReader::new(&[1]).get_bool(), Ok(true));
        assert!(WireReader::new(&[2]).get_bool().is_err());
    }

    #[test]
    fn finish_flags_leftovers() {
        let mut reader = WireReader::new(&[7, 8, 9]);
        reader.get_u8().unwrap();
        assert_eq!(reader.finish(), Err(BoundaryError::TrailingBytes(2)));
    }

    #[test]
    fn clear_keeps_buffer_reusable() {
        let mut buf = WireBuf::with_capacity(8);
        buf.put_prefixed(b"abc").unwrap();
        assert_eq!(buf.len(), 7);
        buf.clear();
        assert!(buf.is_empty());
    }
}
