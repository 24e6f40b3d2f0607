// taglink
//
// tag oriented PLC client core, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

//! tag attribute string, e.g. `protocol=sim&gateway=10.0.0.1&name=MyTag1&elem_size=4`

use crate::status::code::*;
use crate::{Result, Status};
use std::fmt;
use std::str::FromStr;

/// upper bound of a tag buffer
pub const MAX_TAG_SIZE: usize = 16 * 1024 * 1024;

/// parsed tag attributes, keys keep their original order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    /// parse `&` separated `key=value` pairs.
    ///
    /// - empty input: `ERR_BAD_PARAM`
    /// - a pair without `=` or with an empty key: `ERR_BAD_CONFIG`
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            diag!(Warn, "Tag attribute string is empty!");
            return Err(Status::Err(ERR_BAD_PARAM));
        }
        let mut attrs = Attributes::default();
        for part in s.split('&') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = match part.split_once('=') {
                Some(kv) => kv,
                None => {
                    diag!(Warn, "Attribute `{}` is missing a value!", part);
                    return Err(Status::Err(ERR_BAD_CONFIG));
                }
            };
            let key = key.trim();
            if key.is_empty() {
                diag!(Warn, "Attribute `{}` is missing a key!", part);
                return Err(Status::Err(ERR_BAD_CONFIG));
            }
            attrs.set(key, value.trim());
        }
        Ok(attrs)
    }

    /// set or replace a value
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = key.as_ref();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_owned(), value)),
        }
    }

    /// raw value
    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// non-empty value
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// required non-empty value, `ERR_BAD_CONFIG` if missing
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get_str(key).ok_or_else(|| {
            diag!(Warn, "Required attribute `{}` is missing!", key);
            Status::Err(ERR_BAD_CONFIG)
        })
    }

    /// parse a value, `ERR_BAD_CONFIG` if it does not parse
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get_str(key) {
            Some(v) => v.parse().map(Some).map_err(|_| {
                diag!(Warn, "Attribute `{}` has a bad value `{}`!", key, v);
                Status::Err(ERR_BAD_CONFIG)
            }),
            None => Ok(None),
        }
    }

    /// integer value with default
    #[inline]
    pub fn get_int(&self, key: &str, default_value: i64) -> Result<i64> {
        Ok(self.get_parsed(key)?.unwrap_or(default_value))
    }

    /// driver selector: `protocol`, falling back to `make`
    #[inline]
    pub fn protocol(&self) -> Option<&str> {
        self.get_str("protocol").or_else(|| self.get_str("make"))
    }

    /// element size in bytes, required
    pub fn elem_size(&self) -> Result<usize> {
        match self.get_parsed::<i64>("elem_size")? {
            Some(v) if v > 0 => Ok(v as usize),
            Some(_) => Err(Status::Err(ERR_TOO_SMALL)),
            None => {
                diag!(Warn, "Required attribute `elem_size` is missing!");
                Err(Status::Err(ERR_BAD_CONFIG))
            }
        }
    }

    /// element count, defaults to one
    pub fn elem_count(&self) -> Result<usize> {
        match self.get_parsed::<i64>("elem_count")? {
            Some(v) if v > 0 => Ok(v as usize),
            Some(_) => Err(Status::Err(ERR_TOO_SMALL)),
            None => Ok(1),
        }
    }

    /// `elem_size * elem_count`, bounded by [`MAX_TAG_SIZE`]
    pub fn buffer_size(&self) -> Result<usize> {
        let size = self
            .elem_size()?
            .checked_mul(self.elem_count()?)
            .ok_or(Status::Err(ERR_TOO_LARGE))?;
        if size > MAX_TAG_SIZE {
            diag!(Warn, "Tag size {} exceeds the limit of {} bytes!", size, MAX_TAG_SIZE);
            return Err(Status::Err(ERR_TOO_LARGE));
        }
        Ok(size)
    }

    /// iterate over pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromStr for Attributes {
    type Err = Status;
    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        Attributes::parse(s)
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let attrs: Attributes =
            "protocol=sim& gateway = 10.0.0.1 &path=1,0&cpu=controllogix&elem_size=4&elem_count=10&name=MyTag1&debug=1"
                .parse()
                .unwrap();
        assert_eq!(attrs.protocol(), Some("sim"));
        assert_eq!(attrs.get("gateway"), Some("10.0.0.1"));
        assert_eq!(attrs.get("path"), Some("1,0"));
        assert_eq!(attrs.buffer_size().unwrap(), 40);
        assert_eq!(attrs.get_int("debug", 0).unwrap(), 1);
        assert_eq!(attrs.get_int("read_cache_ms", 7).unwrap(), 7);
    }

    #[test]
    fn test_last_key_wins() {
        let attrs = Attributes::parse("name=a&name=b&&").unwrap();
        assert_eq!(attrs.get("name"), Some("b"));
        assert_eq!(attrs.to_string(), "name=b");
    }

    #[test]
    fn test_make_fallback() {
        let attrs = Attributes::parse("make=system&family=library&name=debug").unwrap();
        assert_eq!(attrs.protocol(), Some("system"));
    }

    #[test]
    fn test_bad_strings() {
        assert_eq!(Attributes::parse("").unwrap_err(), Status::Err(ERR_BAD_PARAM));
        assert_eq!(Attributes::parse("   ").unwrap_err(), Status::Err(ERR_BAD_PARAM));
        assert_eq!(
            Attributes::parse("protocol").unwrap_err(),
            Status::Err(ERR_BAD_CONFIG)
        );
        assert_eq!(
            Attributes::parse("=sim").unwrap_err(),
            Status::Err(ERR_BAD_CONFIG)
        );
        let attrs = Attributes::parse("elem_size=abc").unwrap();
        assert_eq!(attrs.elem_size().unwrap_err(), Status::Err(ERR_BAD_CONFIG));
    }

    #[test]
    fn test_sizes() {
        let attrs = Attributes::parse("elem_count=3").unwrap();
        assert_eq!(attrs.buffer_size().unwrap_err(), Status::Err(ERR_BAD_CONFIG));

        let attrs = Attributes::parse("elem_size=0").unwrap();
        assert_eq!(attrs.buffer_size().unwrap_err(), Status::Err(ERR_TOO_SMALL));

        let attrs = Attributes::parse("elem_size=1024&elem_count=1000000").unwrap();
        assert_eq!(attrs.buffer_size().unwrap_err(), Status::Err(ERR_TOO_LARGE));

        let attrs = Attributes::parse("elem_size=2").unwrap();
        assert_eq!(attrs.buffer_size().unwrap(), 2);
    }
}
