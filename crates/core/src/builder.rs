// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! builders for tag path

pub use crate::debug::DebugLevel;
use core::fmt;
use std::str::FromStr;

type Result<T> = std::result::Result<T, Error>;

/// tag builder error
#[derive(Debug, PartialEq, Eq)]
pub struct Error(&'static str);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Error {}

/// builder to build tag full path
///
/// # Examples
/// ```rust,no_run
/// use taglink_core::builder::*;
/// use taglink_core::RawTag;
///
/// let timeout = 100;
/// let path = PathBuilder::default()
///     .protocol(Protocol::Sim)
///     .gateway("192.168.1.120")
///     .cpu(Cpu::ControlLogix)
///     .name("MyTag1")
///     .element_size(16)
///     .element_count(1)
///     .path("1,0")
///     .read_cache_ms(0)
///     .build()
///     .unwrap();
/// let tag = RawTag::new(path, timeout).unwrap();
/// let status = tag.status();
/// assert!(status.is_ok());
/// ```
#[derive(Default, Debug)]
pub struct PathBuilder {
    protocol: Option<Protocol>,
    debug: Option<DebugLevel>,
    elem_count: Option<usize>,
    elem_size: Option<usize>,
    read_cache_ms: Option<usize>,
    cpu: Option<Cpu>,
    name: Option<String>,
    path: Option<String>,
    gateway: Option<String>,
}

impl PathBuilder {
    /// generic attribute.
    /// defining the current debugging level of the library.
    #[inline]
    pub fn debug(&mut self, level: DebugLevel) -> &mut Self {
        self.debug = Some(level);
        self
    }

    /// generic attribute.
    /// Required. Determines the driver used to talk to the device.
    #[inline]
    pub fn protocol(&mut self, protocol: Protocol) -> &mut Self {
        self.protocol = Some(protocol);
        self
    }

    /// generic attribute.
    /// Optional. All tags are treated as arrays. Tags that are not arrays are considered to have a length of one element. Defaults to one (1)
    #[inline]
    pub fn element_count(&mut self, count: usize) -> &mut Self {
        self.elem_count = Some(count);
        self
    }

    /// generic attribute.
    /// Required for device tags. The size of a single element of the tag in bytes.
    #[inline]
    pub fn element_size(&mut self, size: usize) -> &mut Self {
        self.elem_size = Some(size);
        self
    }

    /// generic attribute:
    /// Optional. An integer number of milliseconds to cache read data.
    /// Example read_cache_ms=100 will result in read operations no more often than once every 100 milliseconds.
    #[inline]
    pub fn read_cache_ms(&mut self, millis: usize) -> &mut Self {
        self.read_cache_ms = Some(millis);
        self
    }

    /// Determines the CPU family of the target. Required for EIP.
    #[inline]
    pub fn cpu(&mut self, cpu: Cpu) -> &mut Self {
        self.cpu = Some(cpu);
        self
    }

    /// IP address or host name of the device or of the gateway to the device, with an optional port,
    /// e.g. `10.1.2.3:44818`.
    #[inline]
    pub fn gateway(&mut self, gateway: impl AsRef<str>) -> &mut Self {
        self.gateway = Some(gateway.as_ref().to_owned());
        self
    }

    /// symbolic name of the tag on the device.
    /// For system tags, the name of the library tag, `debug` or `version`.
    #[inline]
    pub fn name(&mut self, name: impl AsRef<str>) -> &mut Self {
        self.name = Some(name.as_ref().to_owned());
        self
    }

    /// routing path to the target CPU, i.e. `1,0`.
    /// Required for ControlLogix over EIP, must not be set for Micro800.
    /// For Modbus it is the unit id, a number in range [0-255].
    #[inline]
    pub fn path(&mut self, path: impl AsRef<str>) -> &mut Self {
        self.path = Some(path.as_ref().to_owned());
        self
    }

    /// check required attributes or conflict attributes
    fn check(&self) -> Result<()> {
        let protocol = self.protocol.ok_or(Error("protocol required"))?;
        if self.name.is_none() {
            return Err(Error("name required"));
        }
        if protocol == Protocol::System {
            return Ok(());
        }
        if self.gateway.is_none() {
            return Err(Error("gateway required"));
        }
        if self.elem_size.is_none() {
            return Err(Error("element size required"));
        }
        match protocol {
            Protocol::EIP => {
                let cpu = self.cpu.ok_or(Error("cpu required"))?;
                if cpu == Cpu::ControlLogix && self.path.is_none() {
                    return Err(Error("path required for controllogix"));
                }
            }
            Protocol::ModBus => match self.path {
                Some(ref path) => {
                    let _: u8 = path
                        .parse()
                        .or(Err(Error("path is a number in range [0-255]")))?;
                }
                None => return Err(Error("path required")),
            },
            _ => {}
        }
        if self.cpu == Some(Cpu::Micro800) && self.path.is_some() {
            return Err(Error("path must not provided for micro800"));
        }
        Ok(())
    }

    /// build full tag path
    pub fn build(&self) -> Result<String> {
        self.check()?;
        let mut path_buf = vec![];
        if let Some(protocol) = self.protocol {
            path_buf.push(format!("protocol={}", protocol));
        }
        if let Some(cpu) = self.cpu {
            path_buf.push(format!("cpu={}", cpu));
        }
        if let Some(ref gateway) = self.gateway {
            path_buf.push(format!("gateway={}", gateway));
        }
        if let Some(ref path) = self.path {
            path_buf.push(format!("path={}", path));
        }
        if let Some(ref name) = self.name {
            path_buf.push(format!("name={}", name));
        }
        if let Some(elem_count) = self.elem_count {
            path_buf.push(format!("elem_count={}", elem_count));
        }
        if let Some(elem_size) = self.elem_size {
            path_buf.push(format!("elem_size={}", elem_size));
        }
        if let Some(read_cache_ms) = self.read_cache_ms {
            path_buf.push(format!("read_cache_ms={}", read_cache_ms));
        }
        if let Some(debug) = self.debug {
            let level = debug as u8;
            path_buf.push(format!("debug={}", level));
        }
        Ok(path_buf.join("&"))
    }
}

/// protocol families known to the builder
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Protocol {
    /// EIP protocol, needs a registered driver
    EIP,
    /// Modbus protocol, needs a registered driver
    ModBus,
    /// built-in simulated controller
    Sim,
    /// built-in library tags
    System,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::EIP => write!(f, "ab-eip"),
            Protocol::ModBus => write!(f, "modbus-tcp"),
            Protocol::Sim => write!(f, "sim"),
            Protocol::System => write!(f, "system"),
        }
    }
}

/// CPU family of the target
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Cpu {
    /// Control Logix-class PLC
    ControlLogix,
    /// PLC/5 PLC
    PLC5,
    /// SLC 500 PLC
    SLC500,
    /// Control Logix-class PLC using the PLC/5 protocol
    LogixPCCC,
    /// Micro800-class PLC
    Micro800,
    /// Micrologix PLC
    MicroLogix,
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cpu::ControlLogix => write!(f, "controllogix"),
            Cpu::PLC5 => write!(f, "plc5"),
            Cpu::SLC500 => write!(f, "slc500"),
            Cpu::LogixPCCC => write!(f, "logixpccc"),
            Cpu::Micro800 => write!(f, "micro800"),
            Cpu::MicroLogix => write!(f, "micrologix"),
        }
    }
}

impl FromStr for Cpu {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let cpu = match s.to_ascii_lowercase().as_str() {
            "controllogix" | "contrologix" | "compactlogix" | "clgx" | "lgx" => Cpu::ControlLogix,
            "plc5" | "plc" => Cpu::PLC5,
            "slc500" | "slc" => Cpu::SLC500,
            "logixpccc" | "lgxpccc" => Cpu::LogixPCCC,
            "micro800" | "micro8xx" => Cpu::Micro800,
            "micrologix" | "mlgx" => Cpu::MicroLogix,
            _ => return Err(Error("unknown cpu family")),
        };
        Ok(cpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_eip_builder() {
        let path = PathBuilder::default()
            .protocol(Protocol::EIP)
            .gateway("192.168.1.120")
            .cpu(Cpu::ControlLogix)
            .name("MyTag1")
            .element_size(16)
            .element_count(1)
            .path("1,0")
            .read_cache_ms(0)
            .build()
            .unwrap();
        assert_eq!(path, "protocol=ab-eip&cpu=controllogix&gateway=192.168.1.120&path=1,0&name=MyTag1&elem_count=1&elem_size=16&read_cache_ms=0");
    }

    #[test]
    fn test_modbus_builder() {
        let path = PathBuilder::default()
            .protocol(Protocol::ModBus)
            .gateway("192.168.1.120:502")
            .path("0")
            .name("hr42")
            .element_size(2)
            .element_count(1)
            .build()
            .unwrap();
        assert_eq!(
            path,
            "protocol=modbus-tcp&gateway=192.168.1.120:502&path=0&name=hr42&elem_count=1&elem_size=2"
        );
    }

    #[test]
    fn test_system_builder() {
        let path = PathBuilder::default()
            .protocol(Protocol::System)
            .name("debug")
            .debug(DebugLevel::Warn)
            .build()
            .unwrap();
        assert_eq!(path, "protocol=system&name=debug&debug=2");
    }

    #[test]
    fn test_check() {
        let res = PathBuilder::default().name("a").build();
        assert_eq!(res.unwrap_err(), Error("protocol required"));

        let res = PathBuilder::default()
            .protocol(Protocol::Sim)
            .gateway("10.0.0.1")
            .name("a")
            .build();
        assert_eq!(res.unwrap_err(), Error("element size required"));

        let res = PathBuilder::default()
            .protocol(Protocol::Sim)
            .gateway("10.0.0.1")
            .cpu(Cpu::Micro800)
            .path("1,0")
            .name("a")
            .element_size(1)
            .build();
        assert_eq!(res.unwrap_err(), Error("path must not provided for micro800"));

        let res = PathBuilder::default()
            .protocol(Protocol::ModBus)
            .gateway("10.0.0.1")
            .path("300")
            .name("hr1")
            .element_size(2)
            .build();
        assert_eq!(res.unwrap_err(), Error("path is a number in range [0-255]"));
    }

    #[test]
    fn test_cpu_from_str() {
        assert_eq!("ControlLogix".parse::<Cpu>().unwrap(), Cpu::ControlLogix);
        assert_eq!("lgx".parse::<Cpu>().unwrap(), Cpu::ControlLogix);
        assert_eq!("micro800".parse::<Cpu>().unwrap(), Cpu::Micro800);
        assert!("s7-1200".parse::<Cpu>().is_err());
    }
}
