// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

#![cfg(feature = "sim")]

use taglink_core::{
    builder::*,
    code::*,
    driver::{sim::Device, ByteOrder},
    Library, RawTag, Status,
};

const GATEWAY: &str = "10.2.2.2";

fn tag(lib: &Library, name: &str, elem_size: usize, elem_count: usize) -> RawTag {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = PathBuilder::default()
        .protocol(Protocol::Sim)
        .gateway(GATEWAY)
        .cpu(Cpu::ControlLogix)
        .path("1,0")
        .name(name)
        .element_size(elem_size)
        .element_count(elem_count)
        .build()
        .unwrap();
    lib.create_tag(&path, 100).unwrap()
}

macro_rules! round_trip {
    ($tag: expr, $offset: expr, $get: ident, $set: ident, $value: expr) => {{
        let tag = &$tag;
        tag.$set($offset, $value).unwrap();
        assert!(tag.write(100).is_ok());
        tag.$set($offset, Default::default()).unwrap();
        assert!(tag.read(100).is_ok());
        assert_eq!(tag.$get($offset).unwrap(), $value);
    }};
}

#[test]
fn set_write_read_get_every_type() {
    let lib = Library::new();
    lib.sim().attach(Device::new(GATEWAY)).unwrap();
    let tag = tag(&lib, "Block", 8, 4);
    assert_eq!(tag.size().unwrap(), 32);

    round_trip!(tag, 0, get_u8, set_u8, 0xA5u8);
    round_trip!(tag, 1, get_i8, set_i8, -7i8);
    round_trip!(tag, 3, get_u16, set_u16, 0xBEEFu16);
    round_trip!(tag, 5, get_i16, set_i16, -12345i16);
    round_trip!(tag, 7, get_u32, set_u32, 0xDEAD_BEEFu32);
    round_trip!(tag, 11, get_i32, set_i32, i32::MIN);
    round_trip!(tag, 15, get_u64, set_u64, u64::MAX - 1);
    round_trip!(tag, 24, get_i64, set_i64, -1i64);
    round_trip!(tag, 20, get_f32, set_f32, 3.5f32);
    round_trip!(tag, 24, get_f64, set_f64, -1.0e300f64);
}

#[test]
fn boundary_law() {
    let lib = Library::new();
    lib.sim().attach(Device::new(GATEWAY)).unwrap();
    let tag = tag(&lib, "Bounds", 2, 5);
    let size = tag.size().unwrap();
    assert_eq!(size, 10);

    // offset + width <= size succeeds, anything beyond fails
    for offset in 0..=size {
        assert_eq!(tag.get_u8(offset).is_ok(), offset + 1 <= size);
        assert_eq!(tag.get_u16(offset).is_ok(), offset + 2 <= size);
        assert_eq!(tag.get_u32(offset).is_ok(), offset + 4 <= size);
        assert_eq!(tag.set_f64(offset, 1.0).is_ok(), offset + 8 <= size);
    }
    assert_eq!(tag.get_u64(3).unwrap_err(), Status::Err(ERR_OUT_OF_BOUNDS));
    assert_eq!(tag.get_bit(80).unwrap_err(), Status::Err(ERR_OUT_OF_BOUNDS));
    assert!(tag.get_bit(79).is_ok());
}

#[test]
fn boolean_byte() {
    let lib = Library::new();
    let device = Device::new(GATEWAY);
    lib.sim().attach(device.clone()).unwrap();
    let tag = tag(&lib, "Flag", 1, 1);

    tag.set_bool(0, true).unwrap();
    assert!(tag.write(100).is_ok());
    assert_eq!(device.memory("Flag").unwrap(), vec![1]);

    device.poke("Flag", 0, &[0x80]).unwrap();
    assert!(tag.read(100).is_ok());
    assert!(tag.get_bool(0).unwrap());
    assert!(tag.get_bit(7).unwrap());
    assert!(!tag.get_bit(0).unwrap());

    tag.set_bool(0, false).unwrap();
    assert!(tag.write(100).is_ok());
    assert_eq!(device.memory("Flag").unwrap(), vec![0]);
}

#[test]
fn boolean_byte_255_round_trip() {
    let lib = Library::new();
    let device = Device::new(GATEWAY);
    lib.sim().attach(device.clone()).unwrap();
    let tag = tag(&lib, "Bool", 1, 1);

    for value in [255u8, 0] {
        tag.set_u8(0, value).unwrap();
        assert!(tag.write(100).is_ok());
        assert_eq!(device.memory("Bool").unwrap(), vec![value]);

        // clobber the local copy, the read must restore it
        tag.set_u8(0, !value).unwrap();
        assert!(tag.read(100).is_ok());
        assert_eq!(tag.get_u8(0).unwrap(), value);
        assert_eq!(tag.get_bool(0).unwrap(), value != 0);
    }
}

#[test]
fn device_byte_order() {
    let lib = Library::new();
    let device = Device::builder(GATEWAY)
        .byte_order(ByteOrder::Big)
        .build();
    device.define("Counter", vec![0x12, 0x34, 0x56, 0x78]);
    lib.sim().attach(device.clone()).unwrap();
    let tag = tag(&lib, "Counter", 4, 1);

    assert!(tag.read(100).is_ok());
    assert_eq!(tag.get_u32(0).unwrap(), 0x1234_5678);
    tag.set_u16(2, 0xABCD).unwrap();
    assert!(tag.write(100).is_ok());
    assert_eq!(device.memory("Counter").unwrap(), vec![0x12, 0x34, 0xAB, 0xCD]);
}

#[test]
fn device_smaller_than_tag() {
    let lib = Library::new();
    let device = Device::new(GATEWAY);
    device.define("Short", vec![1, 2]);
    lib.sim().attach(device).unwrap();
    let tag = tag(&lib, "Short", 4, 1);

    assert_eq!(tag.read(100), Status::Err(ERR_PARTIAL));
    assert_eq!(tag.write(100), Status::Err(ERR_TOO_LARGE));
    assert_eq!(tag.status(), Status::Err(ERR_TOO_LARGE));
}

#[test]
fn accessors_never_touch_the_device() {
    let lib = Library::new();
    let device = Device::new(GATEWAY);
    lib.sim().attach(device.clone()).unwrap();
    let tag = tag(&lib, "Local", 4, 1);
    device.set_offline(true);

    tag.set_i32(0, 99).unwrap();
    assert_eq!(tag.get_i32(0).unwrap(), 99);
    assert_eq!(device.served(), 0);
    assert_eq!(device.memory("Local").unwrap(), vec![0; 4]);
}
