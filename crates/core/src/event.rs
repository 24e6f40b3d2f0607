// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! tag events.
//!
//! Listeners are invoked on the thread that drives the tag (a caller of `status`/`read`/...
//! or the background ticker), never while the tag is locked, so a listener may call back
//! into the tag.

use crate::{Status, TagId};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// event type
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Event {
    /// start reading
    ReadStarted,
    /// connect/read/write aborted
    Aborted,
    /// tag destroyed
    Destroyed,
    /// reading completed
    ReadCompleted,
    /// start writing
    WriteStarted,
    /// write completed
    WriteCompleted,
    /// tag creation completed, successfully or not
    Created,
    /// other
    Other(i32),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Event::*;
        match self {
            ReadStarted => write!(f, "ReadStarted"),
            Aborted => write!(f, "Aborted"),
            Destroyed => write!(f, "Destroyed"),
            ReadCompleted => write!(f, "ReadCompleted"),
            WriteStarted => write!(f, "WriteStarted"),
            WriteCompleted => write!(f, "WriteCompleted"),
            Created => write!(f, "Created"),
            Other(v) => write!(f, "Other({})", v),
        }
    }
}

impl From<i32> for Event {
    fn from(evt: i32) -> Self {
        use Event::*;
        match evt {
            1 => ReadStarted,
            2 => Aborted,
            3 => Destroyed,
            4 => ReadCompleted,
            5 => WriteStarted,
            6 => WriteCompleted,
            7 => Created,
            v => Other(v),
        }
    }
}

impl From<Event> for i32 {
    fn from(evt: Event) -> i32 {
        use Event::*;
        match evt {
            ReadStarted => 1,
            Aborted => 2,
            Destroyed => 3,
            ReadCompleted => 4,
            WriteStarted => 5,
            WriteCompleted => 6,
            Created => 7,
            Other(v) => v,
        }
    }
}

type Callback = Arc<dyn Fn(TagId, Event, Status) + Send + Sync + 'static>;

/// listeners of one tag
pub(crate) struct Emitter {
    id: TagId,
    gen: AtomicUsize,
    listeners: Mutex<Vec<(usize, Callback)>>,
}

impl Emitter {
    pub(crate) fn new(id: TagId) -> Arc<Self> {
        Arc::new(Self {
            id,
            gen: AtomicUsize::new(0),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn listen<F>(self: &Arc<Self>, f: F) -> Handler
    where
        F: Fn(TagId, Event, Status) + Send + Sync + 'static,
    {
        let key = self.gen.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().push((key, Arc::new(f)));
        Handler {
            key,
            emitter: Arc::downgrade(self),
        }
    }

    /// invoke listeners in registration order
    pub(crate) fn emit(&self, event: Event, status: Status) {
        let snapshot: Vec<Callback> = {
            let listeners = self.listeners.lock();
            if listeners.is_empty() {
                return;
            }
            listeners.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        diag!(Spew, "tag {}: event {} with {}", self.id, event, status);
        for cb in snapshot {
            cb(self.id, event, status);
        }
    }

    pub(crate) fn clear(&self) {
        self.listeners.lock().clear();
    }

    fn remove(&self, key: usize) {
        self.listeners.lock().retain(|(k, _)| *k != key);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// event listener registration, removes the listener when dropped.
///
/// # Examples
/// ```rust
/// use taglink_core::{event::Event, RawTag};
///
/// let tag = RawTag::new("make=system&family=library&name=version", 100).unwrap();
/// let handler = tag.listen(|id, evt, status| {
///     println!("tag {}: {}, status: {}", id, evt, status);
/// });
/// assert!(tag.read(100).is_ok());
///
/// //remove listener
/// handler.off();
/// ```
#[must_use = "the listener is removed when the handler drops"]
pub struct Handler {
    key: usize,
    emitter: Weak<Emitter>,
}

impl Handler {
    /// handler of a tag that is gone
    #[inline]
    pub(crate) fn detached() -> Self {
        Self {
            key: 0,
            emitter: Weak::new(),
        }
    }

    /// remove the listener
    #[inline]
    pub fn off(self) {
        drop(self)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("key", &self.key).finish()
    }
}

impl Drop for Handler {
    #[inline]
    fn drop(&mut self) {
        if let Some(emitter) = self.emitter.upgrade() {
            emitter.remove(self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    #[derive(Default)]
    struct Holder {
        count: AtomicUsize,
        event: AtomicI32,
    }

    #[test]
    fn test_multiple() {
        let holder = Arc::new(Holder::default());
        let emitter = Emitter::new(TagId(1));

        let holder1 = Arc::clone(&holder);
        let handler1 = emitter.listen(move |_, e, _| {
            if e == Event::ReadCompleted {
                holder1.event.store(e.into(), Ordering::SeqCst);
            }
        });
        let holder2 = Arc::clone(&holder);
        let handler2 = emitter.listen(move |_, _, _| {
            holder2.count.fetch_add(1, Ordering::SeqCst);
        });

        emitter.emit(Event::ReadCompleted, Status::Ok);
        assert_eq!(holder.count.load(Ordering::SeqCst), 1);
        assert_eq!(
            Event::from(holder.event.load(Ordering::SeqCst)),
            Event::ReadCompleted
        );

        emitter.emit(Event::WriteCompleted, Status::Ok);
        assert_eq!(holder.count.load(Ordering::SeqCst), 2);

        handler1.off();
        assert_eq!(emitter.len(), 1);
        emitter.emit(Event::ReadCompleted, Status::Ok);
        assert_eq!(holder.count.load(Ordering::SeqCst), 3);

        drop(handler2);
        emitter.emit(Event::ReadCompleted, Status::Ok);
        assert_eq!(holder.count.load(Ordering::SeqCst), 3);
        assert_eq!(emitter.len(), 0);
    }

    #[test]
    fn test_handler_outlives_emitter() {
        let emitter = Emitter::new(TagId(2));
        let handler = emitter.listen(|_, _, _| {});
        drop(emitter);
        drop(handler);
    }

    #[test]
    fn test_event_codes() {
        for code in 1..=7 {
            assert_eq!(i32::from(Event::from(code)), code);
        }
        assert_eq!(Event::from(42), Event::Other(42));
    }
}
