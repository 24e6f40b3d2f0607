// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! typed views of a tag buffer.
//!
//! All accesses are bounds checked: `ERR_NO_DATA` for an empty buffer,
//! `ERR_OUT_OF_BOUNDS` when `offset + width` exceeds the buffer. Offsets need not be aligned.

use crate::driver::ByteOrder;
use crate::status::code::*;
use crate::{Result, Status};
use std::ops::Range;

/// fixed width value stored in a tag buffer
pub trait Primitive: Copy + Sized {
    /// width in bytes
    const SIZE: usize;

    /// decode from exactly `SIZE` bytes
    fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self;

    /// encode into exactly `SIZE` bytes
    fn to_bytes(self, order: ByteOrder, out: &mut [u8]);
}

macro_rules! primitive_impl {
    ($($type: ident),+) => {
        $(
            impl Primitive for $type {
                const SIZE: usize = std::mem::size_of::<$type>();

                #[inline]
                fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$type>()];
                    raw.copy_from_slice(bytes);
                    match order {
                        ByteOrder::Little => $type::from_le_bytes(raw),
                        ByteOrder::Big => $type::from_be_bytes(raw),
                    }
                }

                #[inline]
                fn to_bytes(self, order: ByteOrder, out: &mut [u8]) {
                    let raw = match order {
                        ByteOrder::Little => self.to_le_bytes(),
                        ByteOrder::Big => self.to_be_bytes(),
                    };
                    out.copy_from_slice(&raw);
                }
            }
        )+
    };
}

primitive_impl!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// byte range of `width` bytes at `offset`
#[inline]
pub fn span(len: usize, offset: usize, width: usize) -> Result<Range<usize>> {
    if len == 0 {
        return Err(Status::Err(ERR_NO_DATA));
    }
    match offset.checked_add(width) {
        Some(end) if end <= len => Ok(offset..end),
        _ => {
            diag!(
                Detail,
                "Access of {} bytes at offset {} is out of bounds, size {}",
                width,
                offset,
                len
            );
            Err(Status::err_out_of_bounds())
        }
    }
}

/// read a value at byte `offset`
#[inline]
pub fn get<T: Primitive>(buf: &[u8], order: ByteOrder, offset: usize) -> Result<T> {
    let range = span(buf.len(), offset, T::SIZE)?;
    Ok(T::from_bytes(&buf[range], order))
}

/// write a value at byte `offset`
#[inline]
pub fn set<T: Primitive>(buf: &mut [u8], order: ByteOrder, offset: usize, value: T) -> Result<()> {
    let range = span(buf.len(), offset, T::SIZE)?;
    value.to_bytes(order, &mut buf[range]);
    Ok(())
}

/// read the bit at `bit_offset`, counted from the least significant bit of byte 0
#[inline]
pub fn get_bit(buf: &[u8], bit_offset: usize) -> Result<bool> {
    let range = span(buf.len(), bit_offset / 8, 1)?;
    Ok(buf[range.start] & (1 << (bit_offset % 8)) != 0)
}

/// change the bit at `bit_offset`, other bits are preserved
#[inline]
pub fn set_bit(buf: &mut [u8], bit_offset: usize, value: bool) -> Result<()> {
    let range = span(buf.len(), bit_offset / 8, 1)?;
    let mask = 1u8 << (bit_offset % 8);
    if value {
        buf[range.start] |= mask;
    } else {
        buf[range.start] &= !mask;
    }
    Ok(())
}

/// copy `out.len()` bytes at `offset` into `out`
#[inline]
pub fn get_bytes(buf: &[u8], offset: usize, out: &mut [u8]) -> Result<usize> {
    let range = span(buf.len(), offset, out.len())?;
    out.copy_from_slice(&buf[range]);
    Ok(out.len())
}

/// copy `data` into the buffer at `offset`
#[inline]
pub fn set_bytes(buf: &mut [u8], offset: usize, data: &[u8]) -> Result<usize> {
    let range = span(buf.len(), offset, data.len())?;
    buf[range].copy_from_slice(data);
    Ok(data.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order() {
        let mut buf = vec![0; 8];
        set(&mut buf, ByteOrder::Little, 0, 0x0102_0304u32).unwrap();
        assert_eq!(&buf[..4], &[4, 3, 2, 1]);
        set(&mut buf, ByteOrder::Big, 4, 0x0102u16).unwrap();
        assert_eq!(&buf[4..6], &[1, 2]);
        assert_eq!(get::<u16>(&buf, ByteOrder::Little, 4).unwrap(), 0x0201);
    }

    #[test]
    fn test_unaligned() {
        let mut buf = vec![0; 12];
        set(&mut buf, ByteOrder::Little, 3, -2.5f64).unwrap();
        assert_eq!(get::<f64>(&buf, ByteOrder::Little, 3).unwrap(), -2.5);
        set(&mut buf, ByteOrder::Little, 1, i16::MIN).unwrap();
        assert_eq!(get::<i16>(&buf, ByteOrder::Little, 1).unwrap(), i16::MIN);
    }

    #[test]
    fn test_bounds() {
        let mut buf = vec![0; 4];
        assert!(get::<u32>(&buf, ByteOrder::Little, 0).is_ok());
        assert_eq!(
            get::<u32>(&buf, ByteOrder::Little, 1).unwrap_err(),
            Status::Err(ERR_OUT_OF_BOUNDS)
        );
        assert_eq!(
            set(&mut buf, ByteOrder::Little, usize::MAX, 1u8).unwrap_err(),
            Status::Err(ERR_OUT_OF_BOUNDS)
        );
        assert_eq!(
            get::<u8>(&[], ByteOrder::Little, 0).unwrap_err(),
            Status::Err(ERR_NO_DATA)
        );
        assert_eq!(get_bit(&buf, 32).unwrap_err(), Status::Err(ERR_OUT_OF_BOUNDS));
    }

    #[test]
    fn test_bits() {
        let mut buf = vec![0b1000_0000, 0];
        assert!(get_bit(&buf, 7).unwrap());
        set_bit(&mut buf, 9, true).unwrap();
        assert_eq!(buf, vec![0b1000_0000, 0b10]);
        set_bit(&mut buf, 7, false).unwrap();
        assert_eq!(buf, vec![0, 0b10]);
        assert!(!get_bit(&buf, 8).unwrap());
    }

    #[test]
    fn test_bytes() {
        let mut buf = vec![0; 4];
        assert_eq!(set_bytes(&mut buf, 1, &[1, 2, 3]).unwrap(), 3);
        let mut out = [0; 2];
        assert_eq!(get_bytes(&buf, 2, &mut out).unwrap(), 2);
        assert_eq!(out, [2, 3]);
        assert!(set_bytes(&mut buf, 2, &[1, 2, 3]).is_err());
    }
}
