// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! boundary to the communication layer.
//!
//! The core does not speak any fieldbus protocol by itself. A [`Driver`] is registered for a
//! protocol name; it validates the attributes of a new tag and opens a [`Session`] which owns
//! the connection state of that tag. All I/O is started by [`Session::fetch`] and
//! [`Session::push`] and driven to completion by [`Session::poll`].

use crate::attr::Attributes;
use crate::{Result, Status};

#[cfg(feature = "sim")]
pub mod sim;
pub mod system;

/// byte order of the data of a tag, fixed per device family
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ByteOrder {
    /// least significant byte first, EIP and most PLC families
    #[default]
    Little,
    /// most significant byte first, e.g. Modbus registers
    Big,
}

/// result of [`Driver::open`]
pub struct Opened {
    /// connection state of the new tag
    pub session: Box<dyn Session>,
    /// size of the tag buffer in bytes
    pub size: usize,
    /// byte order used by typed accessors
    pub byte_order: ByteOrder,
}

/// factory of sessions for a protocol
pub trait Driver: Send + Sync {
    /// validate attributes and open a session.
    ///
    /// Must not block on I/O; the handshake, if any, continues in the background and is
    /// reported by [`Session::poll`].
    fn open(&self, attrs: &Attributes) -> Result<Opened>;
}

/// connection state of one tag.
///
/// The core guarantees that at most one request is outstanding per session.
pub trait Session: Send {
    /// progress of the handshake or of the outstanding request.
    ///
    /// - [`Status::Pending`] while work is outstanding
    /// - when a fetch completes, the fetched bytes are copied into `buf` before returning
    ///   the terminal status
    /// - [`Status::Ok`] when idle and healthy
    fn poll(&mut self, buf: &mut [u8]) -> Status;

    /// start reading the tag data from the device
    fn fetch(&mut self) -> Status;

    /// start writing `data` to the device
    fn push(&mut self, data: &[u8]) -> Status;

    /// cancel the outstanding request, if any
    fn cancel(&mut self) -> Status;

    /// release the connection
    fn close(&mut self) {}
}
