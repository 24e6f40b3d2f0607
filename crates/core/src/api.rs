// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! integer handle API over [`Library::global`].
//!
//! Every call answers a status code (`0` ok, `1` pending, negative errors) or, for
//! `create`, a positive handle. Getters return `0` when they fail; the failure is recorded
//! as the tag status and can be read back with [`status`].
//!
//! # Examples
//! ```rust
//! use taglink_core::api;
//!
//! let tag = api::create("make=system&family=library&name=debug", 100);
//! assert!(tag > 0);
//! assert_eq!(api::read(tag, 100), api::STATUS_OK);
//! assert_eq!(api::get_int32(tag, 0), 0);
//!
//! // out of bounds: zero, and the error is kept as tag status
//! assert_eq!(api::get_int32(tag, 2), 0);
//! assert_eq!(api::status(tag), api::ERR_OUT_OF_BOUNDS);
//! assert_eq!(api::decode_error(api::ERR_OUT_OF_BOUNDS), "PLCTAG_ERR_OUT_OF_BOUNDS");
//!
//! assert_eq!(api::destroy(tag), api::STATUS_OK);
//! assert_eq!(api::status(tag), api::ERR_NOT_FOUND);
//! ```

use crate::accessor::Primitive;
use crate::debug::{self, DebugLevel};
use crate::{Library, Result, Status};
use paste::paste;

pub use crate::status::code::*;
pub use crate::status::decode_error;

#[inline(always)]
fn lib() -> &'static Library {
    Library::global()
}

#[inline]
fn code(status: Status) -> i32 {
    status.into()
}

#[inline]
fn timeout_ms(timeout: i32) -> Option<u32> {
    u32::try_from(timeout).ok()
}

#[inline]
fn offset(offset: i32) -> Result<usize> {
    usize::try_from(offset).map_err(|_| Status::err_out_of_bounds())
}

/// getter result, recording a failure as tag status
#[inline]
fn value_or_zero<T: Default>(tag: i32, res: Result<T>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => {
            lib().record(tag, e);
            T::default()
        }
    }
}

fn get<T: Primitive + Default>(tag: i32, byte_offset: i32) -> T {
    let res = offset(byte_offset).and_then(|off| lib().get(tag, off));
    value_or_zero(tag, res)
}

fn set<T: Primitive>(tag: i32, byte_offset: i32, value: T) -> i32 {
    match offset(byte_offset).and_then(|off| lib().set(tag, off, value)) {
        Ok(()) => STATUS_OK,
        Err(e) => code(e),
    }
}

macro_rules! api_accessor {
    ($name: ident, $type: ty) => {
        paste! {
            #[doc = concat!("get ", stringify!($type), " at byte offset, `0` on failure")]
            #[inline]
            pub fn [<get_ $name>](tag: i32, offset: i32) -> $type {
                get(tag, offset)
            }

            #[doc = concat!("set ", stringify!($type), " at byte offset")]
            #[inline]
            pub fn [<set_ $name>](tag: i32, offset: i32, value: $type) -> i32 {
                set(tag, offset, value)
            }
        }
    };
}

api_accessor!(uint8, u8);
api_accessor!(int8, i8);
api_accessor!(uint16, u16);
api_accessor!(int16, i16);
api_accessor!(uint32, u32);
api_accessor!(int32, i32);
api_accessor!(uint64, u64);
api_accessor!(int64, i64);
api_accessor!(float32, f32);
api_accessor!(float64, f64);

/// create a tag, a positive handle or a negative status code
pub fn create(attrib: &str, timeout: i32) -> i32 {
    let timeout = match timeout_ms(timeout) {
        Some(v) => v,
        None => return ERR_BAD_PARAM,
    };
    match lib().create(attrib, timeout) {
        Ok(id) => id.get(),
        Err(e) => code(e),
    }
}

/// destroy a tag
#[inline]
pub fn destroy(tag: i32) -> i32 {
    code(lib().destroy(tag))
}

/// destroy every tag and stop the background ticker
#[inline]
pub fn shutdown() {
    lib().shutdown()
}

/// read tag data, blocking when `timeout > 0`
pub fn read(tag: i32, timeout: i32) -> i32 {
    match timeout_ms(timeout) {
        Some(timeout) => code(lib().read(tag, timeout)),
        None => ERR_BAD_PARAM,
    }
}

/// write tag data, blocking when `timeout > 0`
pub fn write(tag: i32, timeout: i32) -> i32 {
    match timeout_ms(timeout) {
        Some(timeout) => code(lib().write(tag, timeout)),
        None => ERR_BAD_PARAM,
    }
}

/// tag status, never blocks
#[inline]
pub fn status(tag: i32) -> i32 {
    code(lib().status(tag))
}

/// abort outstanding work
#[inline]
pub fn abort(tag: i32) -> i32 {
    code(lib().abort(tag))
}

/// take the external tag lock
#[inline]
pub fn lock(tag: i32) -> i32 {
    code(lib().lock(tag))
}

/// release the external tag lock
#[inline]
pub fn unlock(tag: i32) -> i32 {
    code(lib().unlock(tag))
}

/// buffer size in bytes or a negative status code
pub fn get_size(tag: i32) -> i32 {
    match lib().size(tag) {
        Ok(size) => i32::try_from(size).unwrap_or(i32::MAX),
        Err(e) => code(e),
    }
}

/// integer attribute, `default_value` on failure
pub fn get_int_attribute(tag: i32, name: &str, default_value: i32) -> i32 {
    match lib().get_int_attribute(tag, name) {
        Ok(v) => v,
        Err(e) => {
            lib().record(tag, e);
            default_value
        }
    }
}

/// change an integer attribute
pub fn set_int_attribute(tag: i32, name: &str, value: i32) -> i32 {
    match lib().set_int_attribute(tag, name, value) {
        Ok(()) => STATUS_OK,
        Err(e) => code(e),
    }
}

/// bit at bit offset: `1`, `0`, or a negative status code
pub fn get_bit(tag: i32, bit_offset: i32) -> i32 {
    match offset(bit_offset).and_then(|off| lib().get_bit(tag, off)) {
        Ok(v) => v as i32,
        Err(e) => code(e),
    }
}

/// change bit at bit offset, any non-zero `value` sets the bit
pub fn set_bit(tag: i32, bit_offset: i32, value: i32) -> i32 {
    match offset(bit_offset).and_then(|off| lib().set_bit(tag, off, value != 0)) {
        Ok(()) => STATUS_OK,
        Err(e) => code(e),
    }
}

/// copy `buf.len()` bytes at byte offset into `buf`
pub fn get_raw_bytes(tag: i32, byte_offset: i32, buf: &mut [u8]) -> i32 {
    match offset(byte_offset).and_then(|off| lib().get_bytes(tag, off, buf)) {
        Ok(_) => STATUS_OK,
        Err(e) => code(e),
    }
}

/// copy `buf` into the tag at byte offset
pub fn set_raw_bytes(tag: i32, byte_offset: i32, buf: &[u8]) -> i32 {
    match offset(byte_offset).and_then(|off| lib().set_bytes(tag, off, buf)) {
        Ok(_) => STATUS_OK,
        Err(e) => code(e),
    }
}

/// set the library debug level, `0..=5`
#[inline]
pub fn set_debug_level(level: i32) {
    let level = level.clamp(0, DebugLevel::Spew as i32) as u8;
    debug::set_debug_level(DebugLevel::from(level));
}

/// `STATUS_OK` if this library is compatible with the requested version
pub fn check_lib_version(major: u32, minor: u32, patch: u32) -> i32 {
    let parse = |s: &str| s.parse::<u32>().unwrap_or_default();
    let lib_major = parse(env!("CARGO_PKG_VERSION_MAJOR"));
    let lib_minor = parse(env!("CARGO_PKG_VERSION_MINOR"));
    let lib_patch = parse(env!("CARGO_PKG_VERSION_PATCH"));
    if major == lib_major && (minor, patch) <= (lib_minor, lib_patch) {
        STATUS_OK
    } else {
        ERR_UNSUPPORTED
    }
}
