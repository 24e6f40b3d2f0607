// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! library debug level and diagnostics output

use core::convert::From;
use parking_lot::{const_rwlock, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

static DEBUG_LEVEL: AtomicU8 = AtomicU8::new(DebugLevel::None as u8);
static CALLBACK: RwLock<Option<Callback>> = const_rwlock(None);

/// receiver of library diagnostics, see [`set_callback`]
pub type Callback = Box<dyn Fn(DebugLevel, &str) + Send + Sync + 'static>;

/// provides debugging output when enabled
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u8)]
pub enum DebugLevel {
    /// 0 - disables debugging output
    None,
    /// 1 - only output errors. Generally these are fatal to the functioning of the library
    Error,
    /// 2 - outputs warnings such as error found when checking a malformed tag attribute string or when unexpected problems are reported from the PLC
    Warn,
    /// 3 - outputs diagnostic information about the internal calls within the library
    Info,
    /// 4 - outputs detailed diagnostic information about the code executing within the library
    Detail,
    /// 5 - outputs extremely detailed information, including every accessor call. Will output many lines of output per millisecond. You have been warned!
    Spew,
}

impl DebugLevel {
    /// matching level of crate `log`
    #[inline]
    pub fn as_log_level(self) -> Option<log::Level> {
        match self {
            DebugLevel::None => None,
            DebugLevel::Error => Some(log::Level::Error),
            DebugLevel::Warn => Some(log::Level::Warn),
            DebugLevel::Info => Some(log::Level::Info),
            DebugLevel::Detail => Some(log::Level::Debug),
            DebugLevel::Spew => Some(log::Level::Trace),
        }
    }
}

impl From<u8> for DebugLevel {
    #[inline]
    fn from(val: u8) -> DebugLevel {
        match val {
            0 => DebugLevel::None,
            1 => DebugLevel::Error,
            2 => DebugLevel::Warn,
            3 => DebugLevel::Info,
            4 => DebugLevel::Detail,
            5 => DebugLevel::Spew,
            _ => DebugLevel::None,
        }
    }
}

impl From<DebugLevel> for u8 {
    #[inline]
    fn from(level: DebugLevel) -> u8 {
        level as u8
    }
}

impl From<log::Level> for DebugLevel {
    #[inline]
    fn from(level: log::Level) -> DebugLevel {
        match level {
            log::Level::Error => DebugLevel::Error,
            log::Level::Warn => DebugLevel::Warn,
            log::Level::Info => DebugLevel::Info,
            log::Level::Debug => DebugLevel::Detail,
            log::Level::Trace => DebugLevel::Spew,
        }
    }
}

/// set debug level of the library, process wide
#[inline]
pub fn set_debug_level(level: DebugLevel) {
    DEBUG_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// current debug level of the library
#[inline]
pub fn get_debug_level() -> DebugLevel {
    DEBUG_LEVEL.load(Ordering::Relaxed).into()
}

#[doc(hidden)]
#[inline(always)]
pub fn enabled(level: DebugLevel) -> bool {
    level != DebugLevel::None && level <= get_debug_level()
}

/// install the diagnostics callback; fails and hands `callback` back if one is installed
pub fn set_callback(callback: Callback) -> std::result::Result<(), Callback> {
    let mut slot = CALLBACK.write();
    if slot.is_some() {
        return Err(callback);
    }
    *slot = Some(callback);
    Ok(())
}

/// remove the diagnostics callback, if any
pub fn take_callback() -> Option<Callback> {
    CALLBACK.write().take()
}

#[doc(hidden)]
#[inline]
pub fn has_callback() -> bool {
    CALLBACK.read().is_some()
}

#[doc(hidden)]
pub fn emit(level: DebugLevel, args: fmt::Arguments<'_>) {
    if let Some(ref f) = *CALLBACK.read() {
        f(level, &args.to_string());
    }
}

/// emit a diagnostic line through crate `log` and the installed callback when the library
/// debug level allows it
#[doc(hidden)]
#[macro_export]
macro_rules! diag {
    ($level:ident, $($arg:tt)+) => {
        if $crate::debug::enabled($crate::debug::DebugLevel::$level) {
            if let Some(lvl) = $crate::debug::DebugLevel::$level.as_log_level() {
                $crate::__log::log!(target: "taglink", lvl, $($arg)+);
            }
            if $crate::debug::has_callback() {
                $crate::debug::emit($crate::debug::DebugLevel::$level, format_args!($($arg)+));
            }
        }
    };
}
