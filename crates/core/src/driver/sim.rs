// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! simulated controller.
//!
//! A [`Device`] holds tag memory in process and answers requests after a configurable
//! latency. Devices are attached to the [`SimDriver`] of a [`Library`](crate::Library) by
//! gateway address; tags reach them with `protocol=sim&gateway=<address>`.
//!
//! # Examples
//! ```rust
//! use taglink_core::{driver::sim::Device, Library};
//! use std::time::Duration;
//!
//! let lib = Library::new();
//! let device = Device::builder("10.0.0.1")
//!     .latency(Duration::from_millis(5))
//!     .build();
//! lib.sim().attach(device.clone()).unwrap();
//!
//! let tag = lib
//!     .create_tag("protocol=sim&gateway=10.0.0.1&cpu=controllogix&path=1,0&name=Counter&elem_size=4", 1000)
//!     .unwrap();
//! tag.set_i32(0, 42).unwrap();
//! assert!(tag.write(1000).is_ok());
//! assert_eq!(device.memory("Counter").unwrap(), vec![42, 0, 0, 0]);
//! ```

use super::{ByteOrder, Driver, Opened, Session};
use crate::attr::Attributes;
use crate::builder::Cpu;
use crate::status::code::*;
use crate::{Result, Status};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// registry of simulated devices, keyed by gateway
#[derive(Default)]
pub struct SimDriver {
    devices: RwLock<HashMap<String, Device>>,
}

impl SimDriver {
    /// attach a device; `ERR_DUPLICATE` if its gateway is taken
    pub fn attach(&self, device: Device) -> Result<()> {
        let mut devices = self.devices.write();
        let key = device.gateway().to_owned();
        if devices.contains_key(&key) {
            return Err(Status::Err(ERR_DUPLICATE));
        }
        diag!(Info, "Attached simulated device at {}", key);
        devices.insert(key, device);
        Ok(())
    }

    /// detach a device, existing sessions keep talking to it
    pub fn detach(&self, gateway: &str) -> Option<Device> {
        self.devices.write().remove(gateway)
    }

    /// device attached at `gateway`
    pub fn device(&self, gateway: &str) -> Option<Device> {
        self.devices.read().get(gateway).cloned()
    }

    fn resolve(&self, gateway: &str) -> Result<Device> {
        let (host, port) = match gateway.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (gateway, None),
        };
        if host.is_empty() {
            return Err(Status::Err(ERR_BAD_GATEWAY));
        }
        if let Some(port) = port {
            if port.parse::<u16>().is_err() {
                diag!(Warn, "Bad port in gateway {}", gateway);
                return Err(Status::Err(ERR_BAD_GATEWAY));
            }
        }
        self.device(gateway)
            .or_else(|| self.device(host))
            .ok_or_else(|| {
                diag!(Warn, "No device answers at gateway {}", gateway);
                Status::Err(ERR_BAD_GATEWAY)
            })
    }
}

fn check_path(path: &str, cpu: Option<Cpu>) -> Result<()> {
    if cpu == Some(Cpu::Micro800) {
        diag!(Warn, "A path must not be given for micro800!");
        return Err(Status::Err(ERR_BAD_CONFIG));
    }
    let valid = path
        .split(',')
        .all(|seg| !seg.trim().is_empty() && seg.trim().parse::<u16>().is_ok());
    if !valid {
        diag!(Warn, "Bad routing path {}", path);
        return Err(Status::Err(ERR_BAD_CONFIG));
    }
    Ok(())
}

impl Driver for SimDriver {
    fn open(&self, attrs: &Attributes) -> Result<Opened> {
        let gateway = attrs.get_str("gateway").ok_or_else(|| {
            diag!(Warn, "Gateway attribute is missing!");
            Status::Err(ERR_BAD_GATEWAY)
        })?;
        let cpu = match attrs.get_str("cpu").or_else(|| attrs.get_str("plc")) {
            Some(v) => Some(v.parse::<Cpu>().map_err(|_| {
                diag!(Warn, "Unknown cpu family {}", v);
                Status::Err(ERR_BAD_CONFIG)
            })?),
            None => None,
        };
        if let Some(path) = attrs.get_str("path") {
            check_path(path, cpu)?;
        }
        let name = attrs.require("name")?;
        let size = attrs.buffer_size()?;
        let device = self.resolve(gateway)?;
        device.provision(name, size);

        let inner = &device.inner;
        let session = SimSession {
            ready_at: Instant::now() + inner.connect_delay,
            name: name.to_owned(),
            request: None,
            device: device.clone(),
        };
        Ok(Opened {
            session: Box::new(session),
            size,
            byte_order: inner.byte_order,
        })
    }
}

/// builder of [`Device`]
#[derive(Debug)]
pub struct DeviceBuilder {
    gateway: String,
    byte_order: ByteOrder,
    connect_delay: Duration,
    latency: Duration,
}

impl DeviceBuilder {
    /// byte order of tag data, little endian by default
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// time needed to set up a session
    pub fn connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// time needed to answer a request
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// build the device
    pub fn build(self) -> Device {
        Device {
            inner: Arc::new(DeviceInner {
                gateway: self.gateway,
                byte_order: self.byte_order,
                connect_delay: self.connect_delay,
                latency: Mutex::new(self.latency),
                memory: Mutex::new(HashMap::new()),
                faults: Mutex::new(VecDeque::new()),
                offline: AtomicBool::new(false),
                reply_limit: Mutex::new(None),
                served: AtomicU64::new(0),
            }),
        }
    }
}

/// simulated controller
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

struct DeviceInner {
    gateway: String,
    byte_order: ByteOrder,
    connect_delay: Duration,
    latency: Mutex<Duration>,
    memory: Mutex<HashMap<String, Vec<u8>>>,
    faults: Mutex<VecDeque<Status>>,
    offline: AtomicBool,
    reply_limit: Mutex<Option<usize>>,
    served: AtomicU64,
}

impl Device {
    /// device answering immediately at `gateway`
    pub fn new(gateway: impl Into<String>) -> Self {
        Self::builder(gateway).build()
    }

    /// configure a device
    pub fn builder(gateway: impl Into<String>) -> DeviceBuilder {
        DeviceBuilder {
            gateway: gateway.into(),
            byte_order: ByteOrder::Little,
            connect_delay: Duration::ZERO,
            latency: Duration::ZERO,
        }
    }

    /// gateway address of the device
    #[inline]
    pub fn gateway(&self) -> &str {
        &self.inner.gateway
    }

    /// change request latency, affects requests started afterwards
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock() = latency;
    }

    /// an offline device never answers
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::Release);
    }

    /// the next completed request fails with `status`
    pub fn inject_fault(&self, status: Status) {
        self.inner.faults.lock().push_back(status);
    }

    /// answer reads with at most `limit` bytes
    pub fn limit_reply(&self, limit: Option<usize>) {
        *self.inner.reply_limit.lock() = limit;
    }

    /// define tag memory, replacing existing data
    pub fn define(&self, name: impl Into<String>, data: Vec<u8>) {
        self.inner.memory.lock().insert(name.into(), data);
    }

    /// copy of tag memory
    pub fn memory(&self, name: &str) -> Option<Vec<u8>> {
        self.inner.memory.lock().get(name).cloned()
    }

    /// change tag memory as another actor on the device would
    pub fn poke(&self, name: &str, offset: usize, bytes: &[u8]) -> Result<()> {
        let mut memory = self.inner.memory.lock();
        let data = memory.get_mut(name).ok_or_else(Status::err_not_found)?;
        let end = offset
            .checked_add(bytes.len())
            .filter(|end| *end <= data.len())
            .ok_or_else(Status::err_out_of_bounds)?;
        data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// number of requests answered so far
    pub fn served(&self) -> u64 {
        self.inner.served.load(Ordering::Acquire)
    }

    fn provision(&self, name: &str, size: usize) {
        self.inner
            .memory
            .lock()
            .entry(name.to_owned())
            .or_insert_with(|| vec![0; size]);
    }

    fn is_offline(&self) -> bool {
        self.inner.offline.load(Ordering::Acquire)
    }
}

enum Kind {
    Read,
    Write(Vec<u8>),
}

struct Request {
    due: Instant,
    kind: Kind,
}

struct SimSession {
    device: Device,
    name: String,
    ready_at: Instant,
    request: Option<Request>,
}

impl SimSession {
    fn start(&mut self, kind: Kind) -> Status {
        let latency = *self.device.inner.latency.lock();
        self.request = Some(Request {
            due: Instant::now() + latency,
            kind,
        });
        Status::Pending
    }

    fn complete(&self, kind: Kind, buf: &mut [u8]) -> Status {
        let inner = &self.device.inner;
        inner.served.fetch_add(1, Ordering::AcqRel);
        if let Some(fault) = inner.faults.lock().pop_front() {
            diag!(Info, "Device {} fails request with {}", inner.gateway, fault);
            return fault;
        }
        let mut memory = inner.memory.lock();
        let data = match memory.get_mut(&self.name) {
            Some(data) => data,
            None => return Status::Err(ERR_NOT_FOUND),
        };
        match kind {
            Kind::Read => {
                let limit = inner.reply_limit.lock().unwrap_or(usize::MAX);
                let n = data.len().min(buf.len()).min(limit);
                buf[..n].copy_from_slice(&data[..n]);
                if n < buf.len() {
                    diag!(Warn, "Short reply, got {} of {} bytes", n, buf.len());
                    Status::Err(ERR_PARTIAL)
                } else {
                    Status::Ok
                }
            }
            Kind::Write(payload) => {
                if payload.len() > data.len() {
                    return Status::Err(ERR_TOO_LARGE);
                }
                data[..payload.len()].copy_from_slice(&payload);
                Status::Ok
            }
        }
    }
}

impl Session for SimSession {
    fn poll(&mut self, buf: &mut [u8]) -> Status {
        if self.device.is_offline() {
            return Status::Pending;
        }
        let now = Instant::now();
        if now < self.ready_at {
            return Status::Pending;
        }
        match self.request {
            None => Status::Ok,
            Some(ref req) if now < req.due => Status::Pending,
            Some(_) => match self.request.take() {
                Some(req) => self.complete(req.kind, buf),
                None => Status::Ok,
            },
        }
    }

    fn fetch(&mut self) -> Status {
        self.start(Kind::Read)
    }

    fn push(&mut self, data: &[u8]) -> Status {
        self.start(Kind::Write(data.to_vec()))
    }

    fn cancel(&mut self) -> Status {
        self.request = None;
        Status::Ok
    }

    fn close(&mut self) {
        self.request = None;
        diag!(Detail, "Closed session to {} for {}", self.device.gateway(), self.name);
    }
}
