// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::sync::Arc;
use taglink::{
    driver::sim::Device,
    futures::{AsyncTag, TagEntry},
    Library,
};

fn bench_read(c: &mut Criterion) {
    c.bench_function("async read", |b| {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let lib = Library::new();
        lib.sim().attach(Device::new("192.168.0.83")).unwrap();
        let entry = rt.block_on(async {
            let path="protocol=sim&plc=controllogix&path=1,0&gateway=192.168.0.83&name=Car_Pos&elem_size=4&elem_count=1";
            let tag = TagEntry::create_with(&lib, path).await.unwrap();
            Arc::new(tag)
        });
        b.to_async(rt).iter_batched(
            || entry.clone(),
            |entry| async move {
                let tag = entry.get().await.unwrap();
                let _value: i32 = tag.read_value(0).await.unwrap();
            },
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(benches, bench_read);
criterion_main!(benches);
