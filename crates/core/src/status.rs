// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! status codes and their decoded representations

use crate::Result;
use std::fmt;

/// status codes, compatible with the ones of the native tag library
pub mod code {
    #![allow(missing_docs)]
    pub const STATUS_PENDING: i32 = 1;
    pub const STATUS_OK: i32 = 0;

    pub const ERR_ABORT: i32 = -1;
    pub const ERR_BAD_CONFIG: i32 = -2;
    pub const ERR_BAD_CONNECTION: i32 = -3;
    pub const ERR_BAD_DATA: i32 = -4;
    pub const ERR_BAD_DEVICE: i32 = -5;
    pub const ERR_BAD_GATEWAY: i32 = -6;
    pub const ERR_BAD_PARAM: i32 = -7;
    pub const ERR_BAD_REPLY: i32 = -8;
    pub const ERR_BAD_STATUS: i32 = -9;
    pub const ERR_CLOSE: i32 = -10;
    pub const ERR_CREATE: i32 = -11;
    pub const ERR_DUPLICATE: i32 = -12;
    pub const ERR_ENCODE: i32 = -13;
    pub const ERR_MUTEX_DESTROY: i32 = -14;
    pub const ERR_MUTEX_INIT: i32 = -15;
    pub const ERR_MUTEX_LOCK: i32 = -16;
    pub const ERR_MUTEX_UNLOCK: i32 = -17;
    pub const ERR_NOT_ALLOWED: i32 = -18;
    pub const ERR_NOT_FOUND: i32 = -19;
    pub const ERR_NOT_IMPLEMENTED: i32 = -20;
    pub const ERR_NO_DATA: i32 = -21;
    pub const ERR_NO_MATCH: i32 = -22;
    pub const ERR_NO_MEM: i32 = -23;
    pub const ERR_NO_RESOURCES: i32 = -24;
    pub const ERR_NULL_PTR: i32 = -25;
    pub const ERR_OPEN: i32 = -26;
    pub const ERR_OUT_OF_BOUNDS: i32 = -27;
    pub const ERR_READ: i32 = -28;
    pub const ERR_REMOTE_ERR: i32 = -29;
    pub const ERR_THREAD_CREATE: i32 = -30;
    pub const ERR_THREAD_JOIN: i32 = -31;
    pub const ERR_TIMEOUT: i32 = -32;
    pub const ERR_TOO_LARGE: i32 = -33;
    pub const ERR_TOO_SMALL: i32 = -34;
    pub const ERR_UNSUPPORTED: i32 = -35;
    pub const ERR_WINSOCK: i32 = -36;
    pub const ERR_WRITE: i32 = -37;
    pub const ERR_PARTIAL: i32 = -38;
    pub const ERR_BUSY: i32 = -39;
}

use code::*;

/// turn a status code into a printable string.
///
/// never fails, unknown codes decode to `"Unknown error."`
pub fn decode_error(rc: i32) -> &'static str {
    match rc {
        STATUS_PENDING => "PLCTAG_STATUS_PENDING",
        STATUS_OK => "PLCTAG_STATUS_OK",
        ERR_ABORT => "PLCTAG_ERR_ABORT",
        ERR_BAD_CONFIG => "PLCTAG_ERR_BAD_CONFIG",
        ERR_BAD_CONNECTION => "PLCTAG_ERR_BAD_CONNECTION",
        ERR_BAD_DATA => "PLCTAG_ERR_BAD_DATA",
        ERR_BAD_DEVICE => "PLCTAG_ERR_BAD_DEVICE",
        ERR_BAD_GATEWAY => "PLCTAG_ERR_BAD_GATEWAY",
        ERR_BAD_PARAM => "PLCTAG_ERR_BAD_PARAM",
        ERR_BAD_REPLY => "PLCTAG_ERR_BAD_REPLY",
        ERR_BAD_STATUS => "PLCTAG_ERR_BAD_STATUS",
        ERR_CLOSE => "PLCTAG_ERR_CLOSE",
        ERR_CREATE => "PLCTAG_ERR_CREATE",
        ERR_DUPLICATE => "PLCTAG_ERR_DUPLICATE",
        ERR_ENCODE => "PLCTAG_ERR_ENCODE",
        ERR_MUTEX_DESTROY => "PLCTAG_ERR_MUTEX_DESTROY",
        ERR_MUTEX_INIT => "PLCTAG_ERR_MUTEX_INIT",
        ERR_MUTEX_LOCK => "PLCTAG_ERR_MUTEX_LOCK",
        ERR_MUTEX_UNLOCK => "PLCTAG_ERR_MUTEX_UNLOCK",
        ERR_NOT_ALLOWED => "PLCTAG_ERR_NOT_ALLOWED",
        ERR_NOT_FOUND => "PLCTAG_ERR_NOT_FOUND",
        ERR_NOT_IMPLEMENTED => "PLCTAG_ERR_NOT_IMPLEMENTED",
        ERR_NO_DATA => "PLCTAG_ERR_NO_DATA",
        ERR_NO_MATCH => "PLCTAG_ERR_NO_MATCH",
        ERR_NO_MEM => "PLCTAG_ERR_NO_MEM",
        ERR_NO_RESOURCES => "PLCTAG_ERR_NO_RESOURCES",
        ERR_NULL_PTR => "PLCTAG_ERR_NULL_PTR",
        ERR_OPEN => "PLCTAG_ERR_OPEN",
        ERR_OUT_OF_BOUNDS => "PLCTAG_ERR_OUT_OF_BOUNDS",
        ERR_READ => "PLCTAG_ERR_READ",
        ERR_REMOTE_ERR => "PLCTAG_ERR_REMOTE_ERR",
        ERR_THREAD_CREATE => "PLCTAG_ERR_THREAD_CREATE",
        ERR_THREAD_JOIN => "PLCTAG_ERR_THREAD_JOIN",
        ERR_TIMEOUT => "PLCTAG_ERR_TIMEOUT",
        ERR_TOO_LARGE => "PLCTAG_ERR_TOO_LARGE",
        ERR_TOO_SMALL => "PLCTAG_ERR_TOO_SMALL",
        ERR_UNSUPPORTED => "PLCTAG_ERR_UNSUPPORTED",
        ERR_WINSOCK => "PLCTAG_ERR_WINSOCK",
        ERR_WRITE => "PLCTAG_ERR_WRITE",
        ERR_PARTIAL => "PLCTAG_ERR_PARTIAL",
        ERR_BUSY => "PLCTAG_ERR_BUSY",
        _ => "Unknown error.",
    }
}

/// coarse classification of error codes
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Category {
    /// bad or missing attributes
    Configuration,
    /// gateway unreachable, timeouts, socket failures
    Connectivity,
    /// malformed or failed replies
    Protocol,
    /// memory, handle slots, sizes
    Resource,
    /// misuse of the API
    Programming,
    /// mutex and thread primitives
    Concurrency,
    /// anything else, including non-errors
    Other,
}

/// plc tag error code representations
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// STATUS_OK = 0
    Ok,
    /// STATUS_PENDING = 1
    Pending,
    /// other error codes
    Err(i32),
}

impl Status {
    /// create [`Status`] from a status code
    #[inline(always)]
    pub fn new(rc: i32) -> Self {
        match rc {
            STATUS_OK => Status::Ok,
            STATUS_PENDING => Status::Pending,
            _ => Status::Err(rc),
        }
    }

    /// success or not?
    #[inline(always)]
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    /// has error?
    #[inline(always)]
    pub fn is_err(&self) -> bool {
        matches!(self, Status::Err(_))
    }

    /// has pending operations?
    #[inline(always)]
    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Pending)
    }

    /// is timeout error?
    #[inline(always)]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Status::Err(ERR_TIMEOUT))
    }

    /// into [`Result`]
    #[inline(always)]
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// decode status from error code to string
    ///
    /// # Examples
    /// ```rust
    /// use taglink_core::Status;
    ///
    /// let status = Status::Ok;
    /// assert_eq!(status.decode(), "PLCTAG_STATUS_OK");
    /// ```
    #[inline]
    pub fn decode(&self) -> &'static str {
        decode_error((*self).into())
    }

    /// which family of failures this status belongs to
    pub fn category(&self) -> Category {
        let rc = match self {
            Status::Err(rc) => *rc,
            _ => return Category::Other,
        };
        match rc {
            ERR_BAD_CONFIG | ERR_BAD_PARAM | ERR_NO_MATCH | ERR_UNSUPPORTED
            | ERR_NOT_IMPLEMENTED => Category::Configuration,
            ERR_BAD_GATEWAY | ERR_BAD_CONNECTION | ERR_BAD_DEVICE | ERR_TIMEOUT | ERR_WINSOCK
            | ERR_OPEN | ERR_CLOSE => Category::Connectivity,
            ERR_BAD_REPLY | ERR_BAD_STATUS | ERR_BAD_DATA | ERR_REMOTE_ERR | ERR_PARTIAL
            | ERR_READ | ERR_WRITE | ERR_ENCODE | ERR_ABORT => Category::Protocol,
            ERR_NO_MEM | ERR_NO_RESOURCES | ERR_DUPLICATE | ERR_TOO_LARGE | ERR_TOO_SMALL
            | ERR_CREATE => Category::Resource,
            ERR_NULL_PTR | ERR_NOT_FOUND | ERR_OUT_OF_BOUNDS | ERR_NOT_ALLOWED | ERR_NO_DATA
            | ERR_BUSY => Category::Programming,
            ERR_MUTEX_DESTROY | ERR_MUTEX_INIT | ERR_MUTEX_LOCK | ERR_MUTEX_UNLOCK
            | ERR_THREAD_CREATE | ERR_THREAD_JOIN => Category::Concurrency,
            _ => Category::Other,
        }
    }

    #[inline(always)]
    pub(crate) fn err_not_found() -> Self {
        Status::Err(ERR_NOT_FOUND)
    }

    #[inline(always)]
    pub(crate) fn err_out_of_bounds() -> Self {
        Status::Err(ERR_OUT_OF_BOUNDS)
    }
}

impl From<i32> for Status {
    #[inline(always)]
    fn from(rc: i32) -> Status {
        Status::new(rc)
    }
}

impl From<Status> for i32 {
    #[inline(always)]
    fn from(status: Status) -> i32 {
        match status {
            Status::Err(rc) => rc,
            Status::Pending => STATUS_PENDING,
            Status::Ok => STATUS_OK,
        }
    }
}

impl fmt::Display for Status {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.decode())
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rc: i32 = (*self).into();
        write!(f, "STATUS {}: {}", &rc, self.decode())
    }
}

impl std::error::Error for Status {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ok() {
        let status = Status::Ok;
        let msg = status.decode();
        assert_eq!(msg, "PLCTAG_STATUS_OK");
    }

    #[test]
    fn test_status_pending() {
        let status = Status::Pending;
        let msg = status.decode();
        assert_eq!(msg, "PLCTAG_STATUS_PENDING");
        assert!(!status.is_err());
    }

    #[test]
    fn test_decode_is_total() {
        for rc in -64..=64 {
            assert!(!decode_error(rc).is_empty());
        }
        assert_eq!(decode_error(i32::MIN), "Unknown error.");
        assert_eq!(decode_error(ERR_BAD_GATEWAY), "PLCTAG_ERR_BAD_GATEWAY");
        assert_eq!(decode_error(ERR_BUSY), "PLCTAG_ERR_BUSY");
    }

    #[test]
    fn test_code_round_trip() {
        for rc in ERR_BUSY..=STATUS_PENDING {
            let status = Status::new(rc);
            assert_eq!(i32::from(status), rc);
        }
        assert!(Status::new(ERR_TIMEOUT).is_timeout());
    }

    #[test]
    fn test_debug_format() {
        let status = Status::Err(ERR_NOT_FOUND);
        assert_eq!(format!("{:?}", status), "STATUS -19: PLCTAG_ERR_NOT_FOUND");
        assert_eq!(status.to_string(), "PLCTAG_ERR_NOT_FOUND");
    }

    #[test]
    fn test_category() {
        assert_eq!(Status::Err(ERR_BAD_GATEWAY).category(), Category::Connectivity);
        assert_eq!(Status::Err(ERR_BAD_CONFIG).category(), Category::Configuration);
        assert_eq!(Status::Err(ERR_PARTIAL).category(), Category::Protocol);
        assert_eq!(Status::Err(ERR_NO_MEM).category(), Category::Resource);
        assert_eq!(Status::Err(ERR_OUT_OF_BOUNDS).category(), Category::Programming);
        assert_eq!(Status::Err(ERR_MUTEX_LOCK).category(), Category::Concurrency);
        assert_eq!(Status::Ok.category(), Category::Other);
        assert_eq!(Status::Err(-1000).category(), Category::Other);
    }
}
