// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::event::{Event, Handler};
use crate::status::code::*;
use crate::*;
use std::{
    thread,
    time::{Duration, Instant},
};

macro_rules! accessor_impl {
    ($get: ident, $set: ident, $type: ty) => {
        #[doc = concat!("get ", stringify!($type), " value")]
        #[inline(always)]
        pub fn $get(&self, byte_offset: u32) -> Result<$type> {
            self.lib.get(self.id.get(), byte_offset as usize)
        }

        #[doc = concat!("set ", stringify!($type), " value")]
        #[inline(always)]
        pub fn $set(&self, byte_offset: u32, value: $type) -> Result<()> {
            self.lib.set(self.id.get(), byte_offset as usize, value)
        }
    };
}

/// owning handle of a tag, the tag is destroyed when it drops
#[derive(Debug)]
pub struct RawTag {
    id: TagId,
    lib: Library,
}

impl RawTag {
    /// create new RawTag in the process wide [`Library`]
    ///
    /// you might want to use `PathBuilder` to build a path.
    ///
    /// # Examples
    /// ```rust
    /// use taglink_core::RawTag;
    ///
    /// let timeout = 100;
    /// let path = "make=system&family=library&name=debug";
    /// let tag = RawTag::new(path, timeout).unwrap();
    /// assert!(tag.status().is_ok());
    /// ```
    pub fn new(path: impl AsRef<str>, timeout: u32) -> Result<Self> {
        Library::global().create_tag(path.as_ref(), timeout)
    }

    #[inline]
    pub(crate) fn from_parts(id: TagId, lib: Library) -> Self {
        Self { id, lib }
    }

    /// tag id
    #[inline(always)]
    pub fn id(&self) -> TagId {
        self.id
    }

    /// library owning the tag
    #[inline(always)]
    pub fn library(&self) -> &Library {
        &self.lib
    }

    /// perform read operation.
    /// - blocking read if timeout > 0
    /// - non-blocking read if timeout = 0
    #[inline(always)]
    pub fn read(&self, timeout: u32) -> Status {
        self.lib.read(self.id.get(), timeout)
    }

    /// perform write operation
    /// - blocking write if timeout > 0
    /// - non-blocking write if timeout = 0
    #[inline(always)]
    pub fn write(&self, timeout: u32) -> Status {
        self.lib.write(self.id.get(), timeout)
    }

    /// wait until not pending, blocking
    /// # Note
    /// only for simple use cases, the outstanding operation is not aborted on timeout
    #[inline]
    pub fn wait(&self, timeout: Option<Duration>) -> Status {
        let start = Instant::now();
        loop {
            let status = self.status();
            if !status.is_pending() {
                return status;
            }
            if let Some(v) = timeout {
                if start.elapsed() > v {
                    return Status::Err(ERR_TIMEOUT);
                }
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// poll tag status
    #[inline(always)]
    pub fn status(&self) -> Status {
        self.lib.status(self.id.get())
    }

    /// Abort the pending operation.
    /// For non-blocking read/write (timeout=0), it's your responsibility to call this method to cancel the pending
    /// operation when timeout or other necessary situations.
    #[inline(always)]
    pub fn abort(&self) -> Result<()> {
        self.lib.abort(self.id.get()).into_result()
    }

    /// tag size in bytes
    #[inline(always)]
    pub fn size(&self) -> Result<u32> {
        Ok(self.lib.size(self.id.get())? as u32)
    }

    /// element size
    #[inline(always)]
    pub fn elem_size(&self) -> Result<i32> {
        self.get_attr("elem_size", 0)
    }

    /// element count
    #[inline(always)]
    pub fn elem_count(&self) -> Result<i32> {
        self.get_attr("elem_count", 0)
    }

    /// get tag attribute, `default_value` for unsupported attributes
    #[inline]
    pub fn get_attr(&self, attr: impl AsRef<str>, default_value: i32) -> Result<i32> {
        match self.lib.get_int_attribute(self.id.get(), attr.as_ref()) {
            Err(Status::Err(ERR_UNSUPPORTED)) => Ok(default_value),
            res => res,
        }
    }

    /// set tag attribute
    #[inline(always)]
    pub fn set_attr(&self, attr: impl AsRef<str>, value: i32) -> Result<()> {
        self.lib
            .set_int_attribute(self.id.get(), attr.as_ref(), value)
    }

    /// get bit value
    #[inline(always)]
    pub fn get_bit(&self, bit_offset: u32) -> Result<bool> {
        self.lib.get_bit(self.id.get(), bit_offset as usize)
    }

    /// set bit value
    #[inline(always)]
    pub fn set_bit(&self, bit_offset: u32, value: bool) -> Result<()> {
        self.lib.set_bit(self.id.get(), bit_offset as usize, value)
    }

    /// get bool value, any non-zero byte is true
    #[inline(always)]
    pub fn get_bool(&self, byte_offset: u32) -> Result<bool> {
        let value = self.get_u8(byte_offset)?;
        Ok(value > 0)
    }

    /// set bool value, true is stored as 1
    #[inline(always)]
    pub fn set_bool(&self, byte_offset: u32, value: bool) -> Result<()> {
        self.set_u8(byte_offset, if value { 1 } else { 0 })
    }

    accessor_impl!(get_i8, set_i8, i8);
    accessor_impl!(get_u8, set_u8, u8);
    accessor_impl!(get_i16, set_i16, i16);
    accessor_impl!(get_u16, set_u16, u16);
    accessor_impl!(get_i32, set_i32, i32);
    accessor_impl!(get_u32, set_u32, u32);
    accessor_impl!(get_i64, set_i64, i64);
    accessor_impl!(get_u64, set_u64, u64);
    accessor_impl!(get_f32, set_f32, f32);
    accessor_impl!(get_f64, set_f64, f64);

    /// get raw bytes.
    /// If buffer length would exceed the end of the data in the tag data buffer, an out of bounds error is returned
    #[inline(always)]
    pub fn get_bytes_unchecked(&self, byte_offset: u32, buf: &mut [u8]) -> Result<usize> {
        self.lib.get_bytes(self.id.get(), byte_offset as usize, buf)
    }

    /// get raw bytes, at most up to the end of the tag data
    #[inline]
    pub fn get_bytes(&self, byte_offset: u32, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let size = self.size()? as usize;
        if byte_offset as usize >= size {
            return Ok(0);
        }
        let slots_len = size - byte_offset as usize;
        let buf_len = std::cmp::min(slots_len, buf.len());
        let buf = &mut buf[..buf_len];
        self.get_bytes_unchecked(byte_offset, buf)
    }

    /// set raw bytes.
    /// If buffer length would exceed the end of the data in the tag data buffer, an out of bounds error is returned
    #[inline(always)]
    pub fn set_bytes_unchecked(&self, byte_offset: u32, buf: &[u8]) -> Result<usize> {
        self.lib.set_bytes(self.id.get(), byte_offset as usize, buf)
    }

    /// set raw bytes, at most up to the end of the tag data
    #[inline]
    pub fn set_bytes(&self, byte_offset: u32, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let size = self.size()? as usize;
        if byte_offset as usize >= size {
            return Ok(0);
        }
        let slots_len = size - byte_offset as usize;
        let buf_len = std::cmp::min(slots_len, buf.len());
        let buf = &buf[..buf_len];
        self.set_bytes_unchecked(byte_offset, buf)
    }

    /// listen for events
    ///
    /// # Examples
    /// ```rust
    /// use taglink_core::{event::Event, RawTag};
    ///
    /// let tag = RawTag::new("make=system&family=library&name=version", 100).unwrap();
    /// let listener = tag.listen(|id, evt, status| {
    ///     println!("tag {}: {}, status: {}", id, evt, status);
    /// });
    /// assert!(tag.read(100).is_ok());
    ///
    /// //remove listener later
    /// drop(listener);
    /// ```
    #[inline]
    pub fn listen<F>(&self, f: F) -> Handler
    where
        F: Fn(TagId, Event, Status) + Send + Sync + 'static,
    {
        // the tag outlives `self`, the lookup only fails after `Library::shutdown`
        match self.lib.listen(self.id.get(), f) {
            Ok(handler) => handler,
            Err(_) => crate::event::Handler::detached(),
        }
    }

    /// take the external lock of the tag, released when the guard drops
    #[inline]
    pub fn lock(&self) -> Result<TagLock<'_>> {
        self.lib.lock(self.id.get()).into_result()?;
        Ok(TagLock { tag: self })
    }

    /// get tag value of `T` that derives [`Decode`]
    #[cfg(feature = "value")]
    #[inline]
    pub fn get_value<T: Decode>(&self, byte_offset: u32) -> Result<T> {
        T::decode(self, byte_offset)
    }

    /// set tag value that derives [`Encode`]
    #[cfg(feature = "value")]
    #[inline]
    pub fn set_value<T: Encode>(&self, byte_offset: u32, value: T) -> Result<()> {
        value.encode(self, byte_offset)
    }
}

impl Drop for RawTag {
    #[inline]
    fn drop(&mut self) {
        let _ = self.lib.destroy(self.id.get());
    }
}

/// guard of the external tag lock
#[derive(Debug)]
pub struct TagLock<'a> {
    tag: &'a RawTag,
}

impl std::ops::Deref for TagLock<'_> {
    type Target = RawTag;
    #[inline]
    fn deref(&self) -> &RawTag {
        self.tag
    }
}

impl Drop for TagLock<'_> {
    #[inline]
    fn drop(&mut self) {
        let _ = self.tag.lib.unlock(self.tag.id.get());
    }
}
