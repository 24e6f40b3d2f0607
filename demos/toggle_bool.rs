// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! toggle a boolean tag through the integer handle api

use std::process;
use taglink::{api, driver::sim::Device, Library};

const TAG_PATH: &str =
    "protocol=sim&gateway=10.206.1.39&plc=controllogix&path=1,0&name=MyBool&elem_size=1&elem_count=1";
const DATA_TIMEOUT: i32 = 100;

fn check(rc: i32) -> i32 {
    if rc < 0 {
        eprintln!("{} {}", rc, api::decode_error(rc));
        process::exit(1);
    }
    rc
}

fn main() {
    env_logger::init();
    if api::check_lib_version(0, 1, 0) != api::STATUS_OK {
        eprintln!("Required compatible library version 0.1.0 not available!");
        process::exit(1);
    }
    if let Err(e) = Library::global().sim().attach(Device::new("10.206.1.39")) {
        check(e.into());
    }

    let tag = check(api::create(TAG_PATH, DATA_TIMEOUT));
    check(api::status(tag));

    check(api::read(tag, DATA_TIMEOUT));
    let before = api::get_uint8(tag, 0);
    println!("bool status {}", if before != 0 { "true" } else { "false" });

    // any non-zero byte is true; the controller stores a set BOOL as 255
    check(api::set_uint8(tag, 0, if before != 0 { 0 } else { 255 }));
    check(api::write(tag, DATA_TIMEOUT));

    check(api::read(tag, DATA_TIMEOUT));
    let after = api::get_uint8(tag, 0);
    println!("bool status {}", if after != 0 { "true" } else { "false" });

    check(api::destroy(tag));
}
