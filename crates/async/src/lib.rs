// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

/*!
# taglink-async

tokio based async facade for `taglink`.

Operations are futures over the tag completion events. Dropping a pending future aborts
the operation on the tag.

## How to use

Add `taglink-async` to your Cargo.toml

```toml
[dependencies]
taglink-async= "0.1"
```

## Examples

```rust
use taglink_async::{AsyncTag, TagEntry};
use taglink_core::{driver::sim::Device, Library};

let rt = tokio::runtime::Runtime::new().unwrap();
rt.block_on(async {
   let lib = Library::new();
   lib.sim().attach(Device::new("192.168.1.120")).unwrap();
   let path="protocol=sim&plc=controllogix&path=1,0&gateway=192.168.1.120&name=MyTag1&elem_count=1&elem_size=16";// YOUR TAG DEFINITION

   let tag = TagEntry::create_with(&lib, path).await.unwrap();
   let tag_ref = tag.get().await.unwrap();
   let offset = 0;
   let value:u16 = tag_ref.read_value(offset).await.unwrap();
   println!("tag value: {}", value);

   let value = value + 10;
   tag_ref.write_value(offset, value).await.unwrap();
});
```

## Thread-safety

It's thread-safe to perform operations with `taglink-async`; [`TagEntry::get`] hands out
one [`TagRef`] at a time.

## License

MIT

*/
#![warn(missing_docs)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate async_trait;

mod entry;
mod op;

pub use entry::TagEntry;
pub use op::{AsRaw, AsyncTag};

use std::fmt;
use taglink_core::{RawTag, Status};

/// result for [`taglink-async`]
pub type Result<T> = std::result::Result<T, Error>;

/// errors for [`taglink-async`]
#[derive(Debug)]
pub enum Error {
    /// tag error
    TagError(Status),
    /// other error
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// the tag status, if this is a tag error
    #[inline]
    pub fn status(&self) -> Option<Status> {
        match self {
            Error::TagError(s) => Some(*s),
            Error::Other(_) => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::TagError(e) => Some(e),
            Error::Other(e) => Some(e.as_ref()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TagError(e) => write!(f, "TagError - {}", e),
            Error::Other(e) => write!(f, "{}", e),
        }
    }
}

impl From<Status> for Error {
    fn from(s: Status) -> Self {
        Error::TagError(s)
    }
}

/// exclusive tag ref to ensure thread and operations safety
#[derive(Debug)]
pub struct TagRef<'a> {
    pub(crate) tag: &'a RawTag,
    #[allow(dead_code)]
    pub(crate) lock: tokio::sync::MutexGuard<'a, ()>,
}

impl AsRef<RawTag> for TagRef<'_> {
    #[inline(always)]
    fn as_ref(&self) -> &RawTag {
        self.tag
    }
}
