// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use std::process;
use taglink::{driver::sim::Device, Library, RawTag, Status, ValueExt};

fn check(status: Status) {
    if status.is_err() {
        let code: i32 = status.into();
        eprintln!("{} {}", code, status);
        process::exit(1);
    }
}

fn main() {
    env_logger::init();
    let timeout = 100; //ms
    Library::global()
        .sim()
        .attach(Device::new("192.168.1.120"))
        .unwrap_or_else(|e| check(e));
    let path = "protocol=sim&plc=controllogix&path=1,0&gateway=192.168.1.120&name=MyTag1&elem_count=1&elem_size=16"; // YOUR TAG DEFINITION
    let tag = match RawTag::new(path, timeout) {
        Ok(tag) => tag,
        Err(e) => {
            check(e);
            return;
        }
    };
    //read tag
    check(tag.read(timeout));
    let offset = 0;
    let value: u16 = tag.get_value(offset).unwrap_or_else(|e| {
        check(e);
        0
    });
    println!("tag value: {}", value);
    let value = value + 10;
    if let Err(e) = tag.set_value(offset, value) {
        check(e);
    }
    //write tag
    check(tag.write(timeout));
    println!("write done!");
    // tag will be destroyed when out of scope or manually call drop()
    drop(tag);
}
