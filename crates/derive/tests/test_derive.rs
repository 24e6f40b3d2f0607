// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use taglink_core::{driver::sim::Device, Library, RawTag, Result};
use taglink_derive::{Decode, Encode};

#[derive(Debug, Default, PartialEq, Decode, Encode)]
struct Motor {
    #[tag(offset = 0)]
    speed: u16,
    #[tag(offset = 2)]
    running: bool,
    #[tag(offset = 4)]
    torque: f32,
    #[tag(offset = 8, decode_fn = "decode_name", encode_fn = "encode_name")]
    name: String,
    // local only
    polls: usize,
}

fn decode_name(tag: &RawTag, offset: u32) -> Result<String> {
    let raw: [u8; 4] = tag.get_value(offset)?;
    let len = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    Ok(String::from_utf8_lossy(&raw[..len]).into_owned())
}

fn encode_name(name: &String, tag: &RawTag, offset: u32) -> Result<()> {
    let mut raw = [0u8; 4];
    let n = name.len().min(raw.len());
    raw[..n].copy_from_slice(&name.as_bytes()[..n]);
    tag.set_value(offset, raw)
}

#[derive(Debug, Default, Decode, Encode)]
struct Line {
    #[tag(offset = 0)]
    id: u32,
    #[tag(offset = 4)]
    motor: Motor,
}

fn setup(name: &str, size: usize) -> anyhow::Result<(Library, Device, RawTag)> {
    let lib = Library::new();
    let device = Device::new("10.4.4.4");
    lib.sim().attach(device.clone())?;
    let path = format!(
        "protocol=sim&gateway=10.4.4.4&cpu=controllogix&path=1,0&name={}&elem_size={}",
        name, size
    );
    let tag = lib.create_tag(&path, 100)?;
    Ok((lib, device, tag))
}

#[test]
fn test_derive_round_trip() -> anyhow::Result<()> {
    let (_lib, device, tag) = setup("Motor1", 12)?;
    let motor = Motor {
        speed: 1500,
        running: true,
        torque: 2.5,
        name: "M1".into(),
        polls: 3,
    };
    tag.set_value(0, &motor)?;
    assert!(tag.write(100).is_ok());

    let mem = device.memory("Motor1").unwrap();
    assert_eq!(&mem[0..2], &1500u16.to_le_bytes());
    assert_eq!(mem[2], 1);
    assert_eq!(&mem[4..8], &2.5f32.to_le_bytes());
    assert_eq!(&mem[8..12], b"M1\0\0");

    assert!(tag.read(100).is_ok());
    let back: Motor = tag.get_value(0)?;
    assert_eq!(
        back,
        Motor {
            polls: 0,
            ..motor
        }
    );
    Ok(())
}

#[test]
fn test_nested_offsets() -> anyhow::Result<()> {
    let (_lib, device, tag) = setup("Line1", 16)?;
    device.poke("Line1", 0, &7u32.to_le_bytes())?;
    device.poke("Line1", 4, &42u16.to_le_bytes())?;
    device.poke("Line1", 12, b"AB\0\0")?;
    assert!(tag.read(100).is_ok());

    let line: Line = tag.get_value(0)?;
    assert_eq!(line.id, 7);
    assert_eq!(line.motor.speed, 42);
    assert_eq!(line.motor.name, "AB");
    Ok(())
}

#[test]
fn test_out_of_bounds_field() -> anyhow::Result<()> {
    let (_lib, _device, tag) = setup("Short", 6)?;
    assert!(tag.get_value::<Motor>(0).is_err());
    Ok(())
}
