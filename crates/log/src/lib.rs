// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! # taglink-log
//!  log routing for `taglink`, one component of `taglink`
//!
//! ## Usage
//! `taglink` writes its diagnostics through crate `log` with target `taglink`, gated by the
//! library debug level. Register a callback with [`register_logger`] to receive the same
//! lines as well; the `log` logger of the application is left alone.
//!
//! ### Examples
//! ```rust
//! use taglink_log::*;
//!
//! fn on_message(level: DebugLevel, msg: &str) {
//!     println!("{:?}: {}", level, msg);
//! }
//!
//! register_logger(on_message).unwrap();
//! set_debug_level(DebugLevel::Info); // set debug level
//! // library diagnostics arrive at `on_message`
//! unregister_logger().unwrap();
//! set_debug_level(DebugLevel::None);
//! ```
#![warn(missing_docs)]

pub use taglink_core::{get_debug_level, set_debug_level, DebugLevel};

use taglink_core::{
    code::{ERR_DUPLICATE, ERR_NOT_FOUND},
    debug, Result, Status,
};

/// library log message receiver
pub type Callback = debug::Callback;

/// route library diagnostics to `callback`.
///
/// # Errors
/// `ERR_DUPLICATE` if a callback is registered already.
pub fn register_logger<F>(callback: F) -> Result<()>
where
    F: Fn(DebugLevel, &str) + Send + Sync + 'static,
{
    debug::set_callback(Box::new(callback)).map_err(|_| Status::Err(ERR_DUPLICATE))
}

/// stop routing library diagnostics, `ERR_NOT_FOUND` if nothing is registered
pub fn unregister_logger() -> Result<()> {
    match debug::take_callback() {
        Some(_) => Ok(()),
        None => Err(Status::Err(ERR_NOT_FOUND)),
    }
}
