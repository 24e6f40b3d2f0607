// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use taglink::{driver::sim::Device, Decode, Encode, Library, ValueExt};

// define your UDT
#[derive(Default, Debug, Decode, Encode)]
struct MyUDT {
    #[tag(offset = 0)]
    v1: u16,
    #[tag(offset = 2)]
    v2: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let timeout = 100; //ms
    let lib = Library::new();
    lib.sim().attach(Device::new("192.168.1.120"))?;
    // YOUR TAG DEFINITION
    let path = "protocol=sim&plc=controllogix&path=1,0&gateway=192.168.1.120&name=MyTag2&elem_count=2&elem_size=2";
    let tag = lib.create_tag(path, timeout)?;

    //read tag
    tag.read(timeout).into_result()?;
    let offset = 0;
    let mut value: MyUDT = tag.get_value(offset)?;
    println!("tag value: {:?}", value);

    value.v1 += 10;
    tag.set_value(offset, value)?;

    //write tag
    tag.write(timeout).into_result()?;
    println!("write done!");
    Ok(())
}
