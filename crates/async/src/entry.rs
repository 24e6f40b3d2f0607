// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::op::{Interest, Operation};
use crate::{Result, TagRef};
use taglink_core::{Library, RawTag, Status};
use tokio::sync::Mutex;

/// tag entry, represents a tag in PLC controller
#[derive(Debug)]
pub struct TagEntry {
    tag: RawTag,
    lock: Mutex<()>,
}

impl TagEntry {
    /// create instance of [`TagEntry`] in the process default library,
    /// resolves once the tag is created
    #[inline]
    pub async fn create(options: impl AsRef<str>) -> Result<Self> {
        Self::create_with(Library::global(), options).await
    }

    /// create instance of [`TagEntry`] in `lib`, resolves once the tag is created.
    ///
    /// Dropping the future before it resolves destroys the tag.
    pub async fn create_with(lib: &Library, options: impl AsRef<str>) -> Result<Self> {
        let tag = lib.create_tag(options.as_ref(), 0)?;
        Operation::new(&tag, Interest::Create).run().await?;
        debug!(target: "taglink", "tag {} ready", tag.id());
        Ok(Self {
            tag,
            lock: Mutex::new(()),
        })
    }

    /// exclusive access to the tag, waits while another [`TagRef`] is alive
    #[inline]
    pub async fn get(&self) -> Result<TagRef<'_>> {
        let lock = self.lock.lock().await;
        // fails once the library shut down
        self.tag.size()?;
        Ok(TagRef {
            tag: &self.tag,
            lock,
        })
    }

    /// poll status, never blocks
    #[inline]
    pub fn status(&self) -> Status {
        self.tag.status()
    }

    /// take the inner
    #[inline]
    pub fn into_inner(self) -> RawTag {
        self.tag
    }
}
