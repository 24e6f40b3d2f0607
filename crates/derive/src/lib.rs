// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

/*!
# taglink-derive

macros for taglink

## Usage

please use it with `taglink` or `taglink-core`

With this crate, the macros derive `Decode` and `Encode` for you automatically.
Fields are placed by `#[tag(offset = N)]`, a byte offset relative to the offset the value
is read at. Fields without a `tag()` attribute keep their default value.
Custom codecs are plugged in with `decode_fn = "path"` / `encode_fn = "path"`:

- `fn(&RawTag, u32) -> Result<T>` for `decode_fn`
- `fn(&T, &RawTag, u32) -> Result<()>` for `encode_fn`

### Examples

```rust
use taglink_core::{RawTag, ValueExt};
use taglink_derive::{Decode, Encode};

#[derive(Debug, Default, Decode, Encode)]
struct MyUDT {
    #[tag(offset = 0)]
    a: u32,
    #[tag(offset = 4)]
    b: u32,
}


fn main() {
    let tag = RawTag::new("make=system&family=library&name=version", 100).unwrap();
    let res = tag.read(100);
    assert!(res.is_ok());
    let udt: MyUDT = tag.get_value(0).unwrap();
    assert_eq!(udt.a & 0xFF, b'0' as u32);
}

```

## License

MIT

*/

extern crate proc_macro;

mod decode_derive;
mod encode_derive;
mod shared;

use proc_macro::TokenStream;
use syn::DeriveInput;

use syn::parse_macro_input;

/// derive `Decode` from `#[tag(offset = N)]` field attributes
#[proc_macro_derive(Decode, attributes(tag))]
pub fn decode_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    decode_derive::expand_tag_derive(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// derive `Encode` from `#[tag(offset = N)]` field attributes
#[proc_macro_derive(Encode, attributes(tag))]
pub fn encode_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    encode_derive::expand_tag_derive(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
