// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use std::time::Duration;
use taglink::{
    driver::sim::Device,
    futures::{AsyncTag, TagEntry},
    Library,
};
use tokio::runtime::Runtime;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let device = Device::builder("192.168.1.120")
        .connect_delay(Duration::from_millis(50))
        .latency(Duration::from_millis(10))
        .build();
    Library::global().sim().attach(device)?;

    let rt = Runtime::new()?;
    rt.block_on(async move {
        let path="protocol=sim&plc=controllogix&path=1,0&gateway=192.168.1.120&name=MyTag1&elem_count=1&elem_size=16"; // YOUR TAG DEFINITION
        let entry = TagEntry::create(path).await?;
        let tag = entry.get().await?;
        let offset = 0;
        let value: u16 = 100;
        //write tag
        tag.write_value(offset, value).await?;
        // read tag
        let value: u16 = tag.read_value(offset).await?;
        assert_eq!(value, 100);
        println!("tag value: {}", value);
        Ok(())
    })
}
