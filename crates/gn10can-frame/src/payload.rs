//! Fixed-width scalar packing for frame payloads.
//!
//! Values are stored little-endian at caller-chosen byte offsets. Floats are
//! stored as their raw IEEE-754 bits, so a value read back is bit-identical
//! to the value written. `bool` occupies one byte, written as `0` or `1`;
//! any non-zero byte reads back as `true`.
//!
//! Out-of-range accesses are rejected with [`PayloadError::OutOfBounds`],
//! never truncated.

use bytes::{Buf, BufMut};

use crate::error::PayloadError;

/// A scalar with a fixed-width little-endian wire representation.
pub trait PayloadValue: Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Write the encoded value. `dst` has at least [`Self::WIDTH`] bytes left.
    fn write<B: BufMut>(self, dst: &mut B);

    /// Read an encoded value. `src` has at least [`Self::WIDTH`] bytes left.
    fn read<B: Buf>(src: &mut B) -> Self;
}

macro_rules! impl_payload_value {
    ($ty:ty, $put:ident, $get:ident) => {
        impl PayloadValue for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn write<B: BufMut>(self, dst: &mut B) {
                dst.$put(self);
            }

            fn read<B: Buf>(src: &mut B) -> Self {
                src.$get()
            }
        }
    };
}

impl_payload_value!(u8, put_u8, get_u8);
impl_payload_value!(i8, put_i8, get_i8);
impl_payload_value!(u16, put_u16_le, get_u16_le);
impl_payload_value!(i16, put_i16_le, get_i16_le);
impl_payload_value!(u32, put_u32_le, get_u32_le);
impl_payload_value!(i32, put_i32_le, get_i32_le);
impl_payload_value!(f32, put_f32_le, get_f32_le);

impl PayloadValue for bool {
    const WIDTH: usize = 1;

    fn write<B: BufMut>(self, dst: &mut B) {
        dst.put_u8(u8::from(self));
    }

    fn read<B: Buf>(src: &mut B) -> Self {
        src.get_u8() != 0
    }
}

/// Write `value` into `buffer` at `offset`.
///
/// Fails if `offset + width` exceeds the buffer capacity.
pub fn pack<T: PayloadValue>(
    buffer: &mut [u8],
    offset: usize,
    value: T,
) -> Result<(), PayloadError> {
    let end = checked_end(offset, T::WIDTH, buffer.len())?;
    let mut dst = &mut buffer[offset..end];
    value.write(&mut dst);
    Ok(())
}

/// Read a value from `buffer` at `offset`.
///
/// `length` is the number of meaningful bytes (a frame's DLC). Fails if
/// `offset + width` exceeds either `length` or the buffer capacity.
pub fn unpack<T: PayloadValue>(
    buffer: &[u8],
    length: usize,
    offset: usize,
) -> Result<T, PayloadError> {
    let limit = length.min(buffer.len());
    let end = checked_end(offset, T::WIDTH, limit)?;
    let mut src = &buffer[offset..end];
    Ok(T::read(&mut src))
}

fn checked_end(offset: usize, width: usize, limit: usize) -> Result<usize, PayloadError> {
    match offset.checked_add(width) {
        Some(end) if end <= limit => Ok(end),
        _ => Err(PayloadError::OutOfBounds {
            offset,
            width,
            limit,
        }),
    }
}
