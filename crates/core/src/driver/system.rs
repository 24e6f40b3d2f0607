// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! library tags, `make=system&family=library&name=debug`
//!
//! - `debug`: 4 bytes, the library debug level, read/write
//! - `version`: 16 bytes, NUL terminated version string, read only

use super::{ByteOrder, Driver, Opened, Session};
use crate::attr::Attributes;
use crate::debug::{get_debug_level, set_debug_level, DebugLevel};
use crate::status::code::*;
use crate::{Result, Status};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DATA_SIZE: usize = 16;

/// driver of library tags
#[derive(Debug, Default)]
pub struct SystemDriver;

impl Driver for SystemDriver {
    fn open(&self, attrs: &Attributes) -> Result<Opened> {
        let name = attrs.require("name")?.to_ascii_lowercase();
        diag!(Detail, "Creating special tag {}", name);
        let size = match name.as_str() {
            "debug" => 4,
            _ => DATA_SIZE,
        };
        Ok(Opened {
            session: Box::new(SystemSession {
                name,
                pending: None,
            }),
            size,
            byte_order: ByteOrder::Little,
        })
    }
}

enum Request {
    Read,
    Write(Vec<u8>),
}

struct SystemSession {
    name: String,
    pending: Option<Request>,
}

impl SystemSession {
    fn read(&self, buf: &mut [u8]) -> Status {
        match self.name.as_str() {
            "version" => {
                buf.iter_mut().for_each(|b| *b = 0);
                let n = VERSION.len().min(buf.len().saturating_sub(1));
                buf[..n].copy_from_slice(&VERSION.as_bytes()[..n]);
                Status::Ok
            }
            "debug" => {
                let level = u8::from(get_debug_level()) as i32;
                let n = buf.len().min(4);
                buf[..n].copy_from_slice(&level.to_le_bytes()[..n]);
                Status::Ok
            }
            _ => {
                diag!(Warn, "Unknown system tag {}", self.name);
                Status::Err(ERR_UNSUPPORTED)
            }
        }
    }

    fn write(&self, data: &[u8]) -> Status {
        match self.name.as_str() {
            "debug" => {
                let mut raw = [0u8; 4];
                let n = data.len().min(4);
                raw[..n].copy_from_slice(&data[..n]);
                let level = i32::from_le_bytes(raw).clamp(0, DebugLevel::Spew as i32);
                set_debug_level(DebugLevel::from(level as u8));
                Status::Ok
            }
            "version" => Status::Err(ERR_NOT_IMPLEMENTED),
            _ => {
                diag!(Warn, "Unknown system tag {}", self.name);
                Status::Err(ERR_NOT_IMPLEMENTED)
            }
        }
    }
}

impl Session for SystemSession {
    fn poll(&mut self, buf: &mut [u8]) -> Status {
        match self.pending.take() {
            Some(Request::Read) => self.read(buf),
            Some(Request::Write(data)) => self.write(&data),
            None => Status::Ok,
        }
    }

    fn fetch(&mut self) -> Status {
        self.pending = Some(Request::Read);
        Status::Pending
    }

    fn push(&mut self, data: &[u8]) -> Status {
        self.pending = Some(Request::Write(data.to_vec()));
        Status::Pending
    }

    fn cancel(&mut self) -> Status {
        // requests complete on the next poll, nothing is ever in flight
        self.pending = None;
        Status::Ok
    }
}
