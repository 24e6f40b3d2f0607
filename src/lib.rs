// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

/*!
# taglink

tag oriented PLC client core, with rust style APIs and useful extensions.

This crate bundles the workspace crates behind features:
- `taglink-core`: registry, tag lifecycle, typed access, `sim` and `system` drivers
- `async` (`taglink-async`): tokio futures, re-exported as [`futures`]
- `derive` (`taglink-derive`): `#[derive(Decode, Encode)]`
- `log` (`taglink-log`): route library diagnostics to a callback

## Examples

```rust
use taglink::{driver::sim::Device, Library};

let lib = Library::new();
lib.sim().attach(Device::new("192.168.1.120")).unwrap();
let path = "protocol=sim&gateway=192.168.1.120&cpu=controllogix&path=1,0&name=MyTag1&elem_size=2";
let tag = lib.create_tag(path, 100).unwrap();
tag.set_u16(0, 42).unwrap();
assert!(tag.write(100).is_ok());
```

## License

MIT
*/

#[doc(inline)]
pub use taglink_core::*;
#[cfg(feature = "derive")]
#[doc(inline)]
pub use taglink_derive::{Decode, Encode};
#[cfg(feature = "log")]
#[doc(inline)]
pub use taglink_log::{register_logger, unregister_logger};

#[cfg(feature = "async")]
#[doc(inline)]
pub use taglink_async as futures;
