// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::{Result, TagRef};
use parking_lot::Mutex;
use taglink_core::{code::ERR_NOT_FOUND, event::Event, RawTag, Status, TagId};
#[cfg(feature = "value")]
use taglink_core::{Decode, Encode};
use tokio::sync::oneshot;

/// get ref of [`RawTag`]
pub trait AsRaw {
    /// get ref of [`RawTag`]
    fn as_raw(&self) -> &RawTag;
}

/// async tag
#[async_trait]
pub trait AsyncTag: AsRaw {
    /// get tag id
    #[inline(always)]
    fn id(&self) -> TagId {
        self.as_raw().id()
    }

    /// tag status, never blocks
    #[inline(always)]
    fn status(&self) -> Status {
        self.as_raw().status()
    }

    /// get tag size in bytes
    #[inline(always)]
    fn size(&self) -> Result<u32> {
        Ok(self.as_raw().size()?)
    }

    /// element count of this tag
    #[inline(always)]
    fn elem_count(&self) -> Result<i32> {
        Ok(self.as_raw().elem_count()?)
    }

    /// element size
    #[inline(always)]
    fn elem_size(&self) -> Result<i32> {
        Ok(self.as_raw().elem_size()?)
    }

    /// get value from mem, you should call read() before this operation
    #[cfg(feature = "value")]
    #[inline(always)]
    fn get_value<T: Decode>(&self, byte_offset: u32) -> Result<T> {
        Ok(self.as_raw().get_value(byte_offset)?)
    }

    /// set value in mem, you should call write() later
    #[cfg(feature = "value")]
    #[inline(always)]
    fn set_value<T: Encode>(&self, byte_offset: u32, value: T) -> Result<()> {
        self.as_raw().set_value(byte_offset, value)?;
        Ok(())
    }

    /// perform read from PLC Controller
    #[inline(always)]
    async fn read(&self) -> Result<()> {
        let mut op = Operation::new(self.as_raw(), Interest::Read);
        op.run().await
    }

    /// perform write to PLC Controller
    #[inline(always)]
    async fn write(&self) -> Result<()> {
        let mut op = Operation::new(self.as_raw(), Interest::Write);
        op.run().await
    }

    /// perform read & returns the value
    #[cfg(feature = "value")]
    #[inline(always)]
    async fn read_value<T: Decode>(&self, offset: u32) -> Result<T> {
        self.read().await?;
        Ok(self.as_raw().get_value(offset)?)
    }

    /// set the value and write to PLC Controller
    #[cfg(feature = "value")]
    #[inline(always)]
    async fn write_value<T: Encode + Send>(&self, offset: u32, value: T) -> Result<()> {
        self.as_raw().set_value(offset, value)?;
        self.write().await?;
        Ok(())
    }
}

impl AsRaw for TagRef<'_> {
    #[inline(always)]
    fn as_raw(&self) -> &RawTag {
        self.tag
    }
}

impl AsyncTag for TagRef<'_> {}

/// the completion an [`Operation`] waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interest {
    Create,
    Read,
    Write,
}

impl Interest {
    #[inline]
    fn done(self, evt: Event) -> bool {
        matches!(
            (self, evt),
            (_, Event::Aborted)
                | (Interest::Create, Event::Created)
                | (Interest::Read, Event::ReadCompleted)
                | (Interest::Write, Event::WriteCompleted)
        )
    }
}

/// ensures that pending operation get aborted if not successful
pub(crate) struct Operation<'a> {
    /// should abort or not
    pending: bool,
    tag: &'a RawTag,
    interest: Interest,
}

impl<'a> Operation<'a> {
    #[inline(always)]
    pub(crate) fn new(tag: &'a RawTag, interest: Interest) -> Self {
        Self {
            pending: false,
            tag,
            interest,
        }
    }

    pub(crate) async fn run(&mut self) -> Result<()> {
        let interest = self.interest;
        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let handler = self.tag.listen(move |_, evt, status| {
            let status = match evt {
                Event::Destroyed => Status::Err(ERR_NOT_FOUND),
                evt if interest.done(evt) => status,
                _ => return,
            };
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(status);
            }
        });
        self.pending = true;
        let mut status = match interest {
            Interest::Create => self.tag.status(),
            Interest::Read => self.tag.read(0),
            Interest::Write => self.tag.write(0),
        };
        if status.is_pending() {
            // the sender goes away with the tag
            status = rx.await.unwrap_or(Status::Err(ERR_NOT_FOUND));
            debug_assert!(!status.is_pending());
        }
        self.pending = false;
        drop(handler); //remove listener here
        status.into_result()?;
        Ok(())
    }
}

/// drop ensures that pending operation get aborted if not successful
impl Drop for Operation<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        if self.pending {
            trace!(target: "taglink", "tag {}: {:?} dropped, aborting", self.tag.id(), self.interest);
            let _ = self.tag.abort();
        }
    }
}
