// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::{sync::Arc, time::Duration};
use taglink::{
    driver::sim::Device,
    futures::{AsyncTag, TagEntry},
    Library,
};
use tokio::task;

fn bench_read(c: &mut Criterion) {
    c.bench_function("async batch-20 read", |b| {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let lib = Library::new();
        let device = Device::builder("192.168.0.83")
            .latency(Duration::from_micros(200))
            .build();
        lib.sim().attach(device).unwrap();
        let tags = rt.block_on(async {
            let mut tags = vec![];
            for i in 0..20 {
                let options = format!("protocol=sim&plc=controllogix&path=1,0&gateway=192.168.0.83&name=Car_Pos_{}&elem_size=4", i);
                let tag = TagEntry::create_with(&lib, options).await.unwrap();
                tags.push(Arc::new(tag));
            }
            tags
        });

        b.to_async(rt).iter_batched(
            || tags.clone(),
            |tags| async move {
                let tasks = tags.into_iter().map(|entry| {
                    task::spawn(async move {
                        let tag = entry.get().await.unwrap();
                        let _value: i32 = tag.read_value(0).await.unwrap();
                    })
                });
                futures::future::join_all(tasks).await;
            },
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(benches, bench_read);
criterion_main!(benches);
