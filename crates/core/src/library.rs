// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! library instance: tag table, drivers and the background ticker.
//!
//! Every operation addresses a tag by its integer handle. Handles of destroyed tags answer
//! `ERR_NOT_FOUND`.
//!
//! # Examples
//! ```rust
//! use taglink_core::Library;
//!
//! let lib = Library::new();
//! let id = lib.create("make=system&family=library&name=version", 100).unwrap();
//! assert!(lib.read(id.get(), 100).is_ok());
//! assert_eq!(lib.size(id.get()).unwrap(), 16);
//! assert!(lib.destroy(id.get()).is_ok());
//! lib.shutdown();
//! ```

use crate::accessor::{self, Primitive};
use crate::attr::Attributes;
use crate::debug::{set_debug_level, DebugLevel};
#[cfg(feature = "sim")]
use crate::driver::sim::SimDriver;
use crate::driver::system::SystemDriver;
use crate::driver::Driver;
use crate::event::{Event, Handler};
use crate::registry::{Registry, MAX_TAG_ENTRIES};
use crate::status::code::*;
use crate::tag::Tag;
use crate::{RawTag, Result, Status, TagId};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

static GLOBAL: Lazy<Library> = Lazy::new(Library::new);

/// library tuning
#[derive(Debug, Clone)]
pub struct Options {
    /// capacity of the tag table, at most 16384
    pub max_tags: usize,
    /// interval of the background ticker
    pub tick_interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_tags: MAX_TAG_ENTRIES,
            tick_interval: Duration::from_millis(2),
        }
    }
}

struct Ticker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Ticker {
    fn stop(self) {
        self.stop.store(true, Ordering::Release);
        // the ticker may release the last reference to the library itself
        if self.handle.thread().id() != thread::current().id() {
            let _ = self.handle.join();
        }
    }
}

struct Shared {
    options: Options,
    registry: Registry,
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
    #[cfg(feature = "sim")]
    sim: Arc<SimDriver>,
    ticker: Mutex<Option<Ticker>>,
}

impl Shared {
    fn stop_ticker(&self) {
        let ticker = self.ticker.lock().take();
        if let Some(ticker) = ticker {
            ticker.stop();
        }
    }

    fn destroy_all(&self) {
        for tag in self.registry.drain() {
            tag.destroy();
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.destroy_all();
        self.stop_ticker();
    }
}

/// tag library, cheap to clone
#[derive(Clone)]
pub struct Library {
    shared: Arc<Shared>,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("options", &self.shared.options)
            .field("tags", &self.shared.registry.len())
            .finish()
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    /// library with default options
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// library with custom options
    pub fn with_options(options: Options) -> Self {
        let mut drivers: HashMap<String, Arc<dyn Driver>> = HashMap::new();
        drivers.insert("system".to_owned(), Arc::new(SystemDriver));
        #[cfg(feature = "sim")]
        let sim = Arc::new(SimDriver::default());
        #[cfg(feature = "sim")]
        drivers.insert("sim".to_owned(), sim.clone());
        Self {
            shared: Arc::new(Shared {
                registry: Registry::new(options.max_tags),
                options,
                drivers: RwLock::new(drivers),
                #[cfg(feature = "sim")]
                sim,
                ticker: Mutex::new(None),
            }),
        }
    }

    /// process wide library, backs [`RawTag::new`] and [`crate::api`]
    #[inline]
    pub fn global() -> &'static Library {
        &GLOBAL
    }

    /// built-in simulated controllers
    #[cfg(feature = "sim")]
    #[inline]
    pub fn sim(&self) -> &SimDriver {
        &self.shared.sim
    }

    /// register a driver for `protocol`, `ERR_DUPLICATE` if the name is taken
    pub fn register_driver(&self, protocol: &str, driver: Arc<dyn Driver>) -> Result<()> {
        let key = protocol.to_ascii_lowercase();
        let mut drivers = self.shared.drivers.write();
        if drivers.contains_key(&key) {
            return Err(Status::Err(ERR_DUPLICATE));
        }
        diag!(Info, "Registered driver for protocol {}", key);
        drivers.insert(key, driver);
        Ok(())
    }

    fn driver(&self, protocol: &str) -> Option<Arc<dyn Driver>> {
        let key = protocol.to_ascii_lowercase();
        self.shared.drivers.read().get(&key).cloned()
    }

    #[inline]
    fn tag(&self, id: i32) -> Result<Arc<Tag>> {
        self.shared.registry.get(id)
    }

    /// create a tag.
    ///
    /// - `timeout = 0`: returns at once, creation continues in the background, poll [`Library::status`]
    /// - `timeout > 0`: waits for creation; on failure or timeout the tag is destroyed and the error returned
    pub fn create(&self, config: &str, timeout: u32) -> Result<TagId> {
        let attrs = Attributes::parse(config)?;
        if let Some(level) = attrs.get_parsed::<u8>("debug")? {
            set_debug_level(DebugLevel::from(level.min(DebugLevel::Spew as u8)));
        }
        let protocol = attrs.protocol().ok_or_else(|| {
            diag!(Warn, "Tag attribute string is missing the protocol!");
            Status::Err(ERR_BAD_CONFIG)
        })?;
        let driver = self.driver(protocol).ok_or_else(|| {
            diag!(Warn, "Unsupported protocol {}", protocol);
            Status::Err(ERR_UNSUPPORTED)
        })?;
        let opened = driver.open(&attrs)?;
        let id = self
            .shared
            .registry
            .insert_with(|id| Tag::new(id, opened, &attrs))?;
        diag!(Info, "Created tag {} for {}", id, config);
        self.ensure_ticker();

        if timeout == 0 {
            return Ok(id);
        }
        let rc = self.tag(id.get())?.wait(Duration::from_millis(timeout as u64));
        if rc.is_err() {
            diag!(Warn, "Creation of tag {} failed: {}", id, rc);
            let _ = self.destroy(id.get());
            return Err(rc);
        }
        Ok(id)
    }

    /// create a tag owned by the returned [`RawTag`]
    #[inline]
    pub fn create_tag(&self, config: &str, timeout: u32) -> Result<RawTag> {
        let id = self.create(config, timeout)?;
        Ok(RawTag::from_parts(id, self.clone()))
    }

    fn ensure_ticker(&self) {
        let mut ticker = self.shared.ticker.lock();
        if ticker.is_some() {
            return;
        }
        let stop = Arc::new(AtomicBool::new(false));
        let weak = Arc::downgrade(&self.shared);
        let interval = self.shared.options.tick_interval;
        let flag = Arc::clone(&stop);
        let res = thread::Builder::new()
            .name("taglink-ticker".to_owned())
            .spawn(move || run_ticker(weak, flag, interval));
        match res {
            Ok(handle) => *ticker = Some(Ticker { stop, handle }),
            Err(e) => {
                diag!(Error, "Unable to start the ticker thread: {}", e);
            }
        }
    }

    /// id of the ticker thread, if running
    pub fn ticker_thread(&self) -> Option<ThreadId> {
        self.shared
            .ticker
            .lock()
            .as_ref()
            .map(|t| t.handle.thread().id())
    }

    /// status of a tag; drives outstanding work, never blocks
    #[inline]
    pub fn status(&self, id: i32) -> Status {
        match self.tag(id) {
            Ok(tag) => tag.tick(),
            Err(e) => e,
        }
    }

    /// read tag data from the device.
    /// - blocking read if timeout > 0
    /// - non-blocking read if timeout = 0
    #[inline]
    pub fn read(&self, id: i32, timeout: u32) -> Status {
        match self.tag(id) {
            Ok(tag) => tag.read(timeout),
            Err(e) => e,
        }
    }

    /// write tag data to the device.
    /// - blocking write if timeout > 0
    /// - non-blocking write if timeout = 0
    #[inline]
    pub fn write(&self, id: i32, timeout: u32) -> Status {
        match self.tag(id) {
            Ok(tag) => tag.write(timeout),
            Err(e) => e,
        }
    }

    /// cancel outstanding work of a tag
    #[inline]
    pub fn abort(&self, id: i32) -> Status {
        match self.tag(id) {
            Ok(tag) => tag.abort(),
            Err(e) => e,
        }
    }

    /// destroy a tag, the handle becomes invalid
    pub fn destroy(&self, id: i32) -> Status {
        match self.shared.registry.remove(id) {
            Some(tag) => {
                tag.destroy();
                Status::Ok
            }
            None => Status::err_not_found(),
        }
    }

    /// take the external lock of a tag, blocking
    #[inline]
    pub fn lock(&self, id: i32) -> Status {
        match self.tag(id) {
            Ok(tag) => tag.lock(),
            Err(e) => e,
        }
    }

    /// release the external lock of a tag
    #[inline]
    pub fn unlock(&self, id: i32) -> Status {
        match self.tag(id) {
            Ok(tag) => tag.unlock(),
            Err(e) => e,
        }
    }

    /// buffer size in bytes
    #[inline]
    pub fn size(&self, id: i32) -> Result<usize> {
        self.tag(id)?.size()
    }

    /// integer attribute: `elem_size`, `elem_count`, `size`, `read_cache_ms`, `debug`
    #[inline]
    pub fn get_int_attribute(&self, id: i32, name: &str) -> Result<i32> {
        self.tag(id)?.get_int_attribute(name)
    }

    /// change an integer attribute: `read_cache_ms`, `debug`
    #[inline]
    pub fn set_int_attribute(&self, id: i32, name: &str, value: i32) -> Result<()> {
        self.tag(id)?.set_int_attribute(name, value)
    }

    /// listen for events of a tag
    #[inline]
    pub fn listen<F>(&self, id: i32, f: F) -> Result<Handler>
    where
        F: Fn(TagId, Event, Status) + Send + Sync + 'static,
    {
        Ok(self.tag(id)?.listen(f))
    }

    /// value at byte offset
    #[inline]
    pub fn get<T: Primitive>(&self, id: i32, offset: usize) -> Result<T> {
        self.tag(id)?.get(offset)
    }

    /// change value at byte offset
    #[inline]
    pub fn set<T: Primitive>(&self, id: i32, offset: usize, value: T) -> Result<()> {
        self.tag(id)?.set(offset, value)
    }

    /// bit at bit offset
    #[inline]
    pub fn get_bit(&self, id: i32, bit_offset: usize) -> Result<bool> {
        self.tag(id)?
            .with_buf(|buf, _| accessor::get_bit(buf, bit_offset))
    }

    /// change bit at bit offset
    #[inline]
    pub fn set_bit(&self, id: i32, bit_offset: usize, value: bool) -> Result<()> {
        self.tag(id)?
            .with_buf_mut(|buf, _| accessor::set_bit(buf, bit_offset, value))
    }

    /// copy `out.len()` bytes at byte offset
    #[inline]
    pub fn get_bytes(&self, id: i32, offset: usize, out: &mut [u8]) -> Result<usize> {
        self.tag(id)?
            .with_buf(|buf, _| accessor::get_bytes(buf, offset, out))
    }

    /// overwrite bytes at byte offset
    #[inline]
    pub fn set_bytes(&self, id: i32, offset: usize, data: &[u8]) -> Result<usize> {
        self.tag(id)?
            .with_buf_mut(|buf, _| accessor::set_bytes(buf, offset, data))
    }

    /// record an accessor failure as the tag status
    pub(crate) fn record(&self, id: i32, status: Status) {
        if let Ok(tag) = self.tag(id) {
            tag.record(status);
        }
    }

    /// number of live tags
    #[inline]
    pub fn len(&self) -> usize {
        self.shared.registry.len()
    }

    /// no live tags
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// destroy every tag and stop the ticker; the library stays usable
    pub fn shutdown(&self) {
        diag!(Info, "Shutting down, {} tags", self.len());
        self.shared.destroy_all();
        self.shared.stop_ticker();
    }
}

fn run_ticker(shared: Weak<Shared>, stop: Arc<AtomicBool>, interval: Duration) {
    diag!(Info, "Ticker thread started");
    while !stop.load(Ordering::Acquire) {
        {
            let shared = match shared.upgrade() {
                Some(v) => v,
                None => break,
            };
            for tag in shared.registry.tags() {
                if tag.is_busy() {
                    tag.tick();
                }
            }
        }
        thread::sleep(interval);
    }
    diag!(Info, "Ticker thread stopped");
}
