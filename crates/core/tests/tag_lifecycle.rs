// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

#![cfg(feature = "sim")]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
    time::{Duration, Instant},
};
use taglink_core::{code::*, driver::sim::Device, event::Event, Library, Status};

const GATEWAY: &str = "10.1.1.1";

fn setup(device: Device) -> Library {
    let _ = env_logger::builder().is_test(true).try_init();
    let lib = Library::new();
    lib.sim().attach(device).unwrap();
    lib
}

fn path(name: &str) -> String {
    format!(
        "protocol=sim&gateway={}&cpu=controllogix&path=1,0&name={}&elem_size=4&elem_count=2",
        GATEWAY, name
    )
}

#[test]
fn create_terminates_with_handle_or_error() -> anyhow::Result<()> {
    let device = Device::builder(GATEWAY)
        .connect_delay(Duration::from_millis(20))
        .build();
    let lib = setup(device.clone());

    let id = lib.create(&path("Ok"), 1000)?;
    assert!(id.get() > 0);
    assert!(lib.status(id.get()).is_ok());

    device.set_offline(true);
    let start = Instant::now();
    let res = lib.create(&path("Offline"), 50);
    assert_eq!(res.unwrap_err(), Status::Err(ERR_TIMEOUT));
    assert!(start.elapsed() < Duration::from_millis(1000));
    // the timed out tag is gone
    assert_eq!(lib.len(), 1);
    Ok(())
}

#[test]
fn create_then_status_completes() -> anyhow::Result<()> {
    let device = Device::builder(GATEWAY)
        .connect_delay(Duration::from_millis(30))
        .build();
    let lib = setup(device);
    let id = lib.create(&path("Async"), 0)?;
    assert!(lib.status(id.get()).is_pending());

    let start = Instant::now();
    let mut status = lib.status(id.get());
    while status.is_pending() && start.elapsed() < Duration::from_millis(5000) {
        thread::sleep(Duration::from_millis(1));
        status = lib.status(id.get());
    }
    assert!(status.is_ok(), "{}", status);
    Ok(())
}

#[test]
fn bad_gateway_is_reported_at_create() {
    let lib = setup(Device::new(GATEWAY));
    let res = lib.create(
        "protocol=sim&gateway=10.9.9.9&path=1,0&cpu=controllogix&name=X&elem_size=4",
        100,
    );
    assert_eq!(res.unwrap_err(), Status::Err(ERR_BAD_GATEWAY));
    let res = lib.create("protocol=sim&gateway=&name=X&elem_size=4", 100);
    assert_eq!(res.unwrap_err(), Status::Err(ERR_BAD_GATEWAY));
    assert!(lib.is_empty());
}

#[test]
fn use_after_destroy_is_not_found() -> anyhow::Result<()> {
    let lib = setup(Device::new(GATEWAY));
    let id = lib.create(&path("Gone"), 100)?.get();
    assert!(lib.destroy(id).is_ok());

    assert_eq!(lib.status(id), Status::Err(ERR_NOT_FOUND));
    assert_eq!(lib.read(id, 100), Status::Err(ERR_NOT_FOUND));
    assert_eq!(lib.write(id, 0), Status::Err(ERR_NOT_FOUND));
    assert_eq!(lib.abort(id), Status::Err(ERR_NOT_FOUND));
    assert_eq!(lib.lock(id), Status::Err(ERR_NOT_FOUND));
    assert_eq!(lib.unlock(id), Status::Err(ERR_NOT_FOUND));
    assert_eq!(lib.size(id).unwrap_err(), Status::Err(ERR_NOT_FOUND));
    assert_eq!(lib.get::<u8>(id, 0).unwrap_err(), Status::Err(ERR_NOT_FOUND));
    assert_eq!(lib.destroy(id), Status::Err(ERR_NOT_FOUND));

    // a new tag never gets the old handle
    let next = lib.create(&path("Next"), 100)?.get();
    assert_ne!(next, id);
    Ok(())
}

#[test]
fn one_operation_at_a_time() -> anyhow::Result<()> {
    let device = Device::builder(GATEWAY)
        .latency(Duration::from_millis(200))
        .build();
    let lib = setup(device);
    let id = lib.create(&path("Busy"), 100)?.get();

    assert!(lib.read(id, 0).is_pending());
    assert_eq!(lib.read(id, 0), Status::Err(ERR_NOT_ALLOWED));
    assert_eq!(lib.write(id, 0), Status::Err(ERR_NOT_ALLOWED));
    assert!(lib.status(id).is_pending());

    assert!(lib.abort(id).is_ok());
    assert_eq!(lib.status(id), Status::Err(ERR_ABORT));

    assert!(lib.write(id, 0).is_pending());
    assert_eq!(lib.read(id, 0), Status::Err(ERR_NOT_ALLOWED));
    assert!(lib.abort(id).is_ok());
    Ok(())
}

#[test]
fn read_timeout_aborts() -> anyhow::Result<()> {
    let device = Device::new(GATEWAY);
    let lib = setup(device.clone());
    let id = lib.create(&path("Slow"), 100)?.get();
    device.set_latency(Duration::from_secs(60));

    let start = Instant::now();
    assert_eq!(lib.read(id, 20), Status::Err(ERR_TIMEOUT));
    assert!(start.elapsed() < Duration::from_secs(5));
    // the tag is usable again
    device.set_latency(Duration::ZERO);
    assert!(lib.read(id, 100).is_ok());
    Ok(())
}

#[test]
fn abort_on_idle_tag_is_ok() -> anyhow::Result<()> {
    let lib = setup(Device::new(GATEWAY));
    let id = lib.create(&path("Idle"), 100)?.get();
    assert!(lib.abort(id).is_ok());
    assert!(lib.status(id).is_ok());
    Ok(())
}

#[test]
fn device_faults_surface_as_status() -> anyhow::Result<()> {
    let device = Device::new(GATEWAY);
    let lib = setup(device.clone());
    let id = lib.create(&path("Faulty"), 100)?.get();

    device.inject_fault(Status::Err(ERR_BAD_CONNECTION));
    assert_eq!(lib.read(id, 100), Status::Err(ERR_BAD_CONNECTION));
    assert_eq!(lib.status(id), Status::Err(ERR_BAD_CONNECTION));
    // no silent retries, the next read succeeds on its own
    assert!(lib.read(id, 100).is_ok());

    device.limit_reply(Some(3));
    assert_eq!(lib.read(id, 100), Status::Err(ERR_PARTIAL));
    Ok(())
}

#[test]
fn read_cache_skips_io() -> anyhow::Result<()> {
    let device = Device::new(GATEWAY);
    let lib = setup(device.clone());
    let id = lib
        .create(&format!("{}&read_cache_ms=60000", path("Cached")), 100)?
        .get();

    assert!(lib.read(id, 100).is_ok());
    let served = device.served();
    assert!(lib.read(id, 100).is_ok());
    assert_eq!(device.served(), served);

    lib.set_int_attribute(id, "read_cache_ms", 0)?;
    assert!(lib.read(id, 100).is_ok());
    assert_eq!(device.served(), served + 1);
    Ok(())
}

#[test]
fn events_follow_operations() -> anyhow::Result<()> {
    let lib = setup(Device::new(GATEWAY));
    let id = lib.create(&path("Events"), 100)?.get();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let seen2 = Arc::clone(&seen);
    let handler = lib.listen(id, move |_, evt, status| {
        seen2.lock().push((evt, status));
    })?;

    assert!(lib.read(id, 100).is_ok());
    assert!(lib.write(id, 100).is_ok());
    drop(handler);
    assert!(lib.read(id, 100).is_ok());

    let seen = seen.lock().clone();
    assert_eq!(
        seen,
        vec![
            (Event::ReadStarted, Status::Ok),
            (Event::ReadCompleted, Status::Ok),
            (Event::WriteStarted, Status::Ok),
            (Event::WriteCompleted, Status::Ok),
        ]
    );
    Ok(())
}

#[test]
fn external_lock_serializes_threads() -> anyhow::Result<()> {
    let lib = setup(Device::new(GATEWAY));
    let id = lib.create(&path("Shared"), 100)?.get();
    let inside = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(4));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let lib = lib.clone();
            let inside = Arc::clone(&inside);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..20 {
                    assert!(lib.lock(id).is_ok());
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    let v: u32 = lib.get(id, 0).unwrap();
                    lib.set(id, 0, v + 1).unwrap();
                    inside.fetch_sub(1, Ordering::SeqCst);
                    assert!(lib.unlock(id).is_ok());
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    assert_eq!(lib.get::<u32>(id, 0)?, 80);
    assert_eq!(lib.unlock(id), Status::Err(ERR_MUTEX_UNLOCK));
    Ok(())
}

#[test]
fn status_from_another_thread_during_blocking_read() -> anyhow::Result<()> {
    let device = Device::builder(GATEWAY)
        .latency(Duration::from_millis(100))
        .build();
    let lib = setup(device);
    let id = lib.create(&path("Blocking"), 100)?.get();

    let reader = {
        let lib = lib.clone();
        thread::spawn(move || lib.read(id, 2000))
    };
    thread::sleep(Duration::from_millis(20));
    let start = Instant::now();
    assert!(lib.status(id).is_pending());
    assert!(start.elapsed() < Duration::from_millis(50));
    assert!(lib.abort(id).is_ok());
    assert_eq!(reader.join().unwrap(), Status::Err(ERR_ABORT));
    Ok(())
}
