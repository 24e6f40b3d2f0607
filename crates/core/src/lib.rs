// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

/*!
# taglink-core

tag oriented PLC client core: a handle registry, asynchronous tag lifecycles driven by
polling, typed access to tag buffers and a fixed error taxonomy.

The fieldbus protocol is not part of this crate. Drivers plug in through
[`driver::Driver`]; two are built in:
- `system`: library tags `debug` and `version`
- `sim`: simulated controllers, see [`driver::sim`]

## How to use

Add `taglink-core` to your Cargo.toml

```toml
[dependencies]
taglink-core = "0.1"
```

## Examples

### read/write tag

```rust
use taglink_core::{driver::sim::Device, Library, ValueExt};

let timeout = 100;//ms
let lib = Library::new();
lib.sim().attach(Device::new("192.168.1.120")).unwrap();
let path = "protocol=sim&gateway=192.168.1.120&cpu=controllogix&path=1,0&name=MyTag1&elem_count=1&elem_size=16";
let tag = lib.create_tag(path, timeout).unwrap();

//read tag
let status = tag.read(timeout);
assert!(status.is_ok());
let offset = 0;
let value: u16 = tag.get_value(offset).unwrap();
println!("tag value: {}", value);

let value = value + 10;
tag.set_value(offset, value).unwrap();

//write tag
let status = tag.write(timeout);
assert!(status.is_ok());
println!("write done!");
```

### integer handles

see [`api`].

## Thread-safety

Every operation is thread-safe. Calls on one tag are serialized; a blocking read or write
releases the tag between polls, so `status` and `abort` from other threads proceed.

## License

MIT

*/
#![warn(missing_docs)]

#[macro_use]
pub mod debug;

pub mod accessor;
pub mod api;
pub mod attr;
#[cfg(feature = "builder")]
pub mod builder;
pub mod driver;
pub mod event;
mod library;
mod raw;
mod registry;
mod status;
mod tag;
#[cfg(feature = "value")]
mod value;

#[doc(hidden)]
pub use log as __log;

/// taglink result
pub type Result<T> = std::result::Result<T, Status>;
pub use debug::{get_debug_level, set_debug_level, DebugLevel};
pub use library::{Library, Options};
pub use raw::{RawTag, TagLock};
pub use registry::MAX_TAG_ENTRIES;
pub use status::{code, decode_error, Category, Status};
pub use tag::TagId;

#[cfg(feature = "value")]
pub use value::{Decode, Encode, ValueExt};
