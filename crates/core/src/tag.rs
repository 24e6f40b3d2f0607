// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! tag object: operation state machine, data buffer, read cache, external lock and listeners

use crate::accessor;
use crate::attr::{Attributes, MAX_TAG_SIZE};
use crate::debug::{get_debug_level, set_debug_level, DebugLevel};
use crate::driver::{ByteOrder, Opened, Session};
use crate::event::{Emitter, Event, Handler};
use crate::status::code::*;
use crate::{Result, Status};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// interval between polls of a blocking wait
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Tag Identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagId(pub(crate) i32);

impl TagId {
    /// integer handle
    #[inline(always)]
    pub fn get(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TagId> for i32 {
    #[inline(always)]
    fn from(id: TagId) -> i32 {
        id.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum State {
    Creating,
    Ready,
    Reading,
    Writing,
    Failed,
    Destroyed,
}

impl State {
    #[inline]
    fn is_busy(self) -> bool {
        matches!(self, State::Creating | State::Reading | State::Writing)
    }
}

type Events = Vec<(Event, Status)>;

/// clamp into the integer attribute range
#[inline]
fn saturate(value: u128) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

struct Inner {
    state: State,
    status: Status,
    session: Box<dyn Session>,
    buf: Vec<u8>,
    byte_order: ByteOrder,
    elem_size: usize,
    elem_count: usize,
    read_cache: Duration,
    cache_expire: Option<Instant>,
}

impl Inner {
    /// drive the session, returns the current status
    fn advance(&mut self, events: &mut Events) -> Status {
        if !self.state.is_busy() {
            return self.current();
        }
        let Inner { session, buf, .. } = &mut *self;
        let rc = session.poll(buf);
        if rc.is_pending() {
            return Status::Pending;
        }
        self.status = rc;
        match self.state {
            State::Creating => {
                self.state = if rc.is_ok() {
                    State::Ready
                } else {
                    State::Failed
                };
                events.push((Event::Created, rc));
            }
            State::Reading => {
                self.state = State::Ready;
                if rc.is_ok() && !self.read_cache.is_zero() {
                    self.cache_expire = Some(Instant::now() + self.read_cache);
                }
                events.push((Event::ReadCompleted, rc));
            }
            State::Writing => {
                self.state = State::Ready;
                events.push((Event::WriteCompleted, rc));
            }
            _ => {}
        }
        rc
    }

    #[inline]
    fn current(&self) -> Status {
        match self.state {
            State::Destroyed => Status::err_not_found(),
            _ => self.status,
        }
    }

    /// status of a tag that cannot start an operation
    fn refuse(&self) -> Option<Status> {
        match self.state {
            State::Ready => None,
            State::Failed => Some(self.status),
            State::Destroyed => Some(Status::err_not_found()),
            _ => Some(Status::Err(ERR_NOT_ALLOWED)),
        }
    }

    fn start_read(&mut self, events: &mut Events) -> Status {
        self.advance(events);
        if let Some(rc) = self.refuse() {
            return rc;
        }
        if let Some(expire) = self.cache_expire {
            if Instant::now() < expire {
                self.status = Status::Ok;
                return Status::Ok;
            }
            self.cache_expire = None;
        }
        events.push((Event::ReadStarted, Status::Ok));
        let rc = self.session.fetch();
        self.begin(State::Reading, rc, Event::ReadCompleted, events)
    }

    fn start_write(&mut self, events: &mut Events) -> Status {
        self.advance(events);
        if let Some(rc) = self.refuse() {
            return rc;
        }
        events.push((Event::WriteStarted, Status::Ok));
        let Inner { session, buf, .. } = &mut *self;
        let rc = session.push(buf);
        self.begin(State::Writing, rc, Event::WriteCompleted, events)
    }

    fn begin(&mut self, state: State, rc: Status, done: Event, events: &mut Events) -> Status {
        if rc.is_err() {
            self.status = rc;
            events.push((done, rc));
            return rc;
        }
        self.state = state;
        self.status = Status::Pending;
        // synchronous sessions complete on the first poll
        self.advance(events)
    }

    fn cancel(&mut self, events: &mut Events) {
        if !self.state.is_busy() {
            return;
        }
        let rc = self.session.cancel();
        if rc.is_err() {
            diag!(Warn, "Session cancel failed: {}", rc);
        }
        self.state = match self.state {
            State::Creating => State::Failed,
            _ => State::Ready,
        };
        self.status = Status::Err(ERR_ABORT);
        events.push((Event::Aborted, self.status));
    }
}

#[derive(Default)]
struct ExternalLock {
    held: bool,
    destroyed: bool,
}

/// a tag, shared by the registry and in-flight calls
pub(crate) struct Tag {
    id: TagId,
    inner: Mutex<Inner>,
    emitter: Arc<Emitter>,
    ext: Mutex<ExternalLock>,
    ext_cond: Condvar,
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag").field("id", &self.id).finish()
    }
}

impl Tag {
    /// new tag in state `Creating`, owning the session and a zeroed buffer
    pub(crate) fn new(id: TagId, opened: Opened, attrs: &Attributes) -> Result<Self> {
        let Opened {
            session,
            size,
            byte_order,
        } = opened;
        if size == 0 {
            return Err(Status::Err(ERR_TOO_SMALL));
        }
        if size > MAX_TAG_SIZE {
            return Err(Status::Err(ERR_TOO_LARGE));
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(size).map_err(|_| {
            diag!(Error, "Unable to allocate {} bytes for tag data!", size);
            Status::Err(ERR_NO_MEM)
        })?;
        buf.resize(size, 0);

        let elem_count = attrs.get_int("elem_count", 1)?.max(1) as usize;
        let elem_size = match attrs.get_parsed::<usize>("elem_size")? {
            Some(v) => v,
            None => size / elem_count,
        };
        let read_cache_ms = attrs.get_int("read_cache_ms", 0)?;
        if read_cache_ms < 0 {
            diag!(Warn, "read_cache_ms must be positive or zero!");
            return Err(Status::Err(ERR_BAD_CONFIG));
        }

        Ok(Self {
            id,
            inner: Mutex::new(Inner {
                state: State::Creating,
                status: Status::Pending,
                session,
                buf,
                byte_order,
                elem_size,
                elem_count,
                read_cache: Duration::from_millis(read_cache_ms as u64),
                cache_expire: None,
            }),
            emitter: Emitter::new(id),
            ext: Mutex::new(ExternalLock::default()),
            ext_cond: Condvar::new(),
        })
    }

    #[inline(always)]
    pub(crate) fn id(&self) -> TagId {
        self.id
    }

    /// run `f` with the API lock held, then dispatch events
    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner, &mut Events) -> R) -> R {
        let mut events = Events::new();
        let res = {
            let mut inner = self.inner.lock();
            f(&mut inner, &mut events)
        };
        for (event, status) in events {
            self.emitter.emit(event, status);
        }
        res
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> State {
        self.inner.lock().state
    }

    /// an operation is outstanding
    #[inline]
    pub(crate) fn is_busy(&self) -> bool {
        self.inner.lock().state.is_busy()
    }

    /// drive outstanding work, non-blocking
    #[inline]
    pub(crate) fn tick(&self) -> Status {
        self.with_inner(|inner, events| inner.advance(events))
    }

    /// poll until not pending; aborts on timeout
    pub(crate) fn wait(&self, timeout: Duration) -> Status {
        let deadline = Instant::now() + timeout;
        loop {
            let rc = self.tick();
            if !rc.is_pending() {
                return rc;
            }
            if Instant::now() >= deadline {
                diag!(Warn, "tag {}: operation timed out, aborting", self.id);
                self.abort();
                self.with_inner(|inner, _| {
                    if inner.status == Status::Err(ERR_ABORT) {
                        inner.status = Status::Err(ERR_TIMEOUT);
                    }
                });
                return Status::Err(ERR_TIMEOUT);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub(crate) fn read(&self, timeout: u32) -> Status {
        let rc = self.with_inner(|inner, events| inner.start_read(events));
        if !rc.is_pending() || timeout == 0 {
            return rc;
        }
        self.wait(Duration::from_millis(timeout as u64))
    }

    pub(crate) fn write(&self, timeout: u32) -> Status {
        let rc = self.with_inner(|inner, events| inner.start_write(events));
        if !rc.is_pending() || timeout == 0 {
            return rc;
        }
        self.wait(Duration::from_millis(timeout as u64))
    }

    /// cancel outstanding work; the tag reports `ERR_ABORT` unless the work already completed
    pub(crate) fn abort(&self) -> Status {
        self.with_inner(|inner, events| {
            inner.advance(events);
            if inner.state == State::Destroyed {
                return Status::err_not_found();
            }
            inner.cache_expire = None;
            inner.cancel(events);
            Status::Ok
        })
    }

    /// abort outstanding work, close the session and wake external lock waiters
    pub(crate) fn destroy(&self) {
        let destroyed = self.with_inner(|inner, events| {
            if inner.state == State::Destroyed {
                return false;
            }
            inner.cancel(events);
            inner.session.close();
            inner.state = State::Destroyed;
            events.push((Event::Destroyed, Status::Ok));
            true
        });
        if !destroyed {
            return;
        }
        self.emitter.clear();
        let mut ext = self.ext.lock();
        ext.destroyed = true;
        self.ext_cond.notify_all();
        diag!(Info, "tag {} destroyed", self.id);
    }

    /// record an accessor failure as the tag status, ignored while work is outstanding
    pub(crate) fn record(&self, status: Status) {
        let mut inner = self.inner.lock();
        if inner.state == State::Ready {
            inner.status = status;
        }
    }

    pub(crate) fn listen<F>(&self, f: F) -> Handler
    where
        F: Fn(TagId, Event, Status) + Send + Sync + 'static,
    {
        self.emitter.listen(f)
    }

    /// buffer size in bytes, constant over the tag's life
    pub(crate) fn size(&self) -> Result<usize> {
        let inner = self.inner.lock();
        match inner.state {
            State::Destroyed => Err(Status::err_not_found()),
            _ => Ok(inner.buf.len()),
        }
    }

    /// borrow the buffer
    pub(crate) fn with_buf<R>(&self, f: impl FnOnce(&[u8], ByteOrder) -> Result<R>) -> Result<R> {
        let inner = self.inner.lock();
        if inner.state == State::Destroyed {
            return Err(Status::err_not_found());
        }
        f(&inner.buf, inner.byte_order)
    }

    /// borrow the buffer mutably
    pub(crate) fn with_buf_mut<R>(
        &self,
        f: impl FnOnce(&mut [u8], ByteOrder) -> Result<R>,
    ) -> Result<R> {
        let mut inner = self.inner.lock();
        if inner.state == State::Destroyed {
            return Err(Status::err_not_found());
        }
        let order = inner.byte_order;
        f(&mut inner.buf, order)
    }

    #[inline]
    pub(crate) fn get<T: accessor::Primitive>(&self, offset: usize) -> Result<T> {
        self.with_buf(|buf, order| accessor::get(buf, order, offset))
    }

    #[inline]
    pub(crate) fn set<T: accessor::Primitive>(&self, offset: usize, value: T) -> Result<()> {
        self.with_buf_mut(|buf, order| accessor::set(buf, order, offset, value))
    }

    pub(crate) fn get_int_attribute(&self, name: &str) -> Result<i32> {
        let inner = self.inner.lock();
        if inner.state == State::Destroyed {
            return Err(Status::err_not_found());
        }
        let value = match name {
            "elem_size" => saturate(inner.elem_size as u128),
            "elem_count" => saturate(inner.elem_count as u128),
            "size" => saturate(inner.buf.len() as u128),
            "read_cache_ms" => saturate(inner.read_cache.as_millis()),
            "debug" => u8::from(get_debug_level()) as i32,
            _ => {
                diag!(Warn, "Unsupported attribute {}", name);
                return Err(Status::Err(ERR_UNSUPPORTED));
            }
        };
        Ok(value)
    }

    pub(crate) fn set_int_attribute(&self, name: &str, value: i32) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state == State::Destroyed {
            return Err(Status::err_not_found());
        }
        match name {
            "read_cache_ms" => {
                if value < 0 {
                    return Err(Status::err_out_of_bounds());
                }
                inner.read_cache = Duration::from_millis(value as u64);
                inner.cache_expire = None;
            }
            "debug" => {
                if !(0..=DebugLevel::Spew as i32).contains(&value) {
                    return Err(Status::err_out_of_bounds());
                }
                set_debug_level(DebugLevel::from(value as u8));
            }
            _ => {
                diag!(Warn, "Unsupported attribute {}", name);
                return Err(Status::Err(ERR_UNSUPPORTED));
            }
        }
        Ok(())
    }

    /// take the external lock, blocking while another caller holds it
    pub(crate) fn lock(&self) -> Status {
        let mut ext = self.ext.lock();
        loop {
            if ext.destroyed {
                return Status::err_not_found();
            }
            if !ext.held {
                ext.held = true;
                return Status::Ok;
            }
            self.ext_cond.wait(&mut ext);
        }
    }

    pub(crate) fn unlock(&self) -> Status {
        let mut ext = self.ext.lock();
        if ext.destroyed {
            return Status::err_not_found();
        }
        if !ext.held {
            return Status::Err(ERR_MUTEX_UNLOCK);
        }
        ext.held = false;
        self.ext_cond.notify_one();
        Status::Ok
    }
}
