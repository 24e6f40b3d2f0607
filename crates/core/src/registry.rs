// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! handle table.
//!
//! Handles are positive 28 bit integers; the slot of a tag is `id % capacity`. Ids increase
//! monotonically and wrap, so a handle is not reused for another tag until the id space
//! wraps.

use crate::status::code::*;
use crate::tag::{Tag, TagId};
use crate::{Result, Status};
use parking_lot::RwLock;
use std::sync::Arc;

/// maximum number of live tags
pub const MAX_TAG_ENTRIES: usize = 16384;
const TAG_ID_MASK: i32 = 0x0FFF_FFFF;

struct Table {
    slots: Vec<Option<Arc<Tag>>>,
    next_id: i32,
    live: usize,
}

pub(crate) struct Registry {
    table: RwLock<Table>,
}

impl Registry {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_TAG_ENTRIES);
        Self {
            table: RwLock::new(Table {
                slots: vec![None; capacity],
                next_id: MAX_TAG_ENTRIES as i32,
                live: 0,
            }),
        }
    }

    /// allocate a handle and store the tag built by `f`
    pub(crate) fn insert_with<F>(&self, f: F) -> Result<TagId>
    where
        F: FnOnce(TagId) -> Result<Tag>,
    {
        let mut table = self.table.write();
        let capacity = table.slots.len();
        if table.live >= capacity {
            diag!(Warn, "Tag table is full, {} tags", capacity);
            return Err(Status::Err(ERR_NO_RESOURCES));
        }
        let mut id = table.next_id;
        let mut found = None;
        for _ in 0..=capacity {
            id = id.wrapping_add(1) & TAG_ID_MASK;
            if id == 0 {
                id = 1;
            }
            let index = id as usize % capacity;
            if table.slots[index].is_none() {
                found = Some(index);
                break;
            }
        }
        let index = found.ok_or(Status::Err(ERR_NO_RESOURCES))?;
        table.next_id = id;
        let tag = f(TagId(id))?;
        table.slots[index] = Some(Arc::new(tag));
        table.live += 1;
        diag!(Detail, "tag {} stored in slot {}", id, index);
        Ok(TagId(id))
    }

    /// live tag by handle
    pub(crate) fn get(&self, id: i32) -> Result<Arc<Tag>> {
        if id <= 0 {
            return Err(Status::err_not_found());
        }
        let table = self.table.read();
        let index = id as usize % table.slots.len();
        match table.slots[index] {
            Some(ref tag) if tag.id().get() == id => Ok(Arc::clone(tag)),
            _ => Err(Status::err_not_found()),
        }
    }

    /// unlink a tag, in-flight callers keep their reference
    pub(crate) fn remove(&self, id: i32) -> Option<Arc<Tag>> {
        if id <= 0 {
            return None;
        }
        let mut table = self.table.write();
        let index = id as usize % table.slots.len();
        match table.slots[index] {
            Some(ref tag) if tag.id().get() == id => {
                table.live -= 1;
                table.slots[index].take()
            }
            _ => None,
        }
    }

    /// snapshot of live tags
    pub(crate) fn tags(&self) -> Vec<Arc<Tag>> {
        let table = self.table.read();
        table.slots.iter().flatten().cloned().collect()
    }

    /// unlink every tag
    pub(crate) fn drain(&self) -> Vec<Arc<Tag>> {
        let mut table = self.table.write();
        table.live = 0;
        table.slots.iter_mut().filter_map(Option::take).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.table.read().live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Attributes;
    use crate::driver::system::SystemDriver;
    use crate::driver::Driver;

    fn make(id: TagId) -> Result<Tag> {
        let attrs = Attributes::parse("make=system&family=library&name=version")?;
        Tag::new(id, SystemDriver.open(&attrs)?, &attrs)
    }

    #[test]
    fn test_ids() {
        let registry = Registry::new(4);
        let a = registry.insert_with(make).unwrap();
        let b = registry.insert_with(make).unwrap();
        assert_eq!(a.get(), MAX_TAG_ENTRIES as i32 + 1);
        assert_eq!(b.get(), a.get() + 1);
        assert_eq!(registry.get(a.get()).unwrap().id(), a);
        assert!(registry.remove(a.get()).is_some());
        assert_eq!(registry.get(a.get()).unwrap_err(), Status::Err(ERR_NOT_FOUND));
        // the freed slot gets a fresh id
        let c = registry.insert_with(make).unwrap();
        assert!(c.get() > b.get());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_full() {
        let registry = Registry::new(2);
        registry.insert_with(make).unwrap();
        registry.insert_with(make).unwrap();
        assert_eq!(
            registry.insert_with(make).unwrap_err(),
            Status::Err(ERR_NO_RESOURCES)
        );
        assert_eq!(registry.drain().len(), 2);
        assert_eq!(registry.len(), 0);
        assert!(registry.insert_with(make).is_ok());
    }

    #[test]
    fn test_failed_build_keeps_slot_free() {
        let registry = Registry::new(1);
        let res = registry.insert_with(|_| Err(Status::Err(ERR_NO_MEM)));
        assert_eq!(res.unwrap_err(), Status::Err(ERR_NO_MEM));
        assert!(registry.insert_with(make).is_ok());
    }

    #[test]
    fn test_wrap() {
        let registry = Registry::new(2);
        registry.table.write().next_id = TAG_ID_MASK;
        let id = registry.insert_with(make).unwrap();
        assert_eq!(id.get(), 1);
        assert_eq!(registry.get(0).unwrap_err(), Status::Err(ERR_NOT_FOUND));
        assert_eq!(registry.get(-5).unwrap_err(), Status::Err(ERR_NOT_FOUND));
    }
}
