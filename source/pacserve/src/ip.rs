//! IPv4 primitives: addresses, CIDR prefix lengths, and networks.
//!
//! Everything here is plain value-type arithmetic on a `u32` in
//! network byte order. No I/O, no allocation beyond `String` formatting.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpError {
    #[error("invalid ip format: {0:?}")]
    InvalidFormat(String),
    #[error("invalid cidr prefix length: {0}")]
    InvalidPrefixLen(i64),
}

/// An IPv4 address, stored as a big-endian 32-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ipv4(pub u32);

impl Ipv4 {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn octets(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl FromStr for Ipv4 {
    type Err = IpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 {
            return Err(IpError::InvalidFormat(s.to_string()));
        }
        let mut value: u32 = 0;
        for part in parts {
            let octet: u32 = part
                .parse()
                .map_err(|_| IpError::InvalidFormat(s.to_string()))?;
            if octet > 255 {
                return Err(IpError::InvalidFormat(s.to_string()));
            }
            value = (value << 8) | octet;
        }
        Ok(Ipv4(value))
    }
}

impl fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

/// A CIDR prefix length in `[0, 32]`, together with its derived netmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrefixLen {
    value: u8,
    mask: u32,
}

impl PrefixLen {
    pub fn new(value: i64) -> Result<Self, IpError> {
        if !(0..=32).contains(&value) {
            return Err(IpError::InvalidPrefixLen(value));
        }
        let value = value as u8;
        let mask = prefix_to_mask(value);
        Ok(Self { value, mask })
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }
}

fn prefix_to_mask(len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        u32::MAX << (32 - len)
    }
}

/// An IPv4 network: a normalised (network-address, prefix-length) pair.
///
/// The constructor always masks the address through the netmask, so two
/// `IpNet` values with the same fields represent the same network no
/// matter how the caller arrived at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IpNet {
    network: Ipv4,
    prefix: PrefixLen,
}

impl IpNet {
    pub fn new(addr: Ipv4, prefix: PrefixLen) -> Self {
        Self {
            network: Ipv4(addr.0 & prefix.mask()),
            prefix,
        }
    }

    pub fn from_parts(ip_str: &str, prefix_len: i64) -> Result<Self, IpError> {
        let addr: Ipv4 = ip_str.parse()?;
        let prefix = PrefixLen::new(prefix_len)?;
        Ok(Self::new(addr, prefix))
    }

    pub const ROOT_PREFIX: u8 = 0;

    pub fn root() -> Self {
        Self::new(Ipv4(0), PrefixLen::new(0).expect("0 is a valid prefix"))
    }

    pub fn network_address(&self) -> Ipv4 {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix.value()
    }

    pub fn is_root(&self) -> bool {
        self.prefix.value() == Self::ROOT_PREFIX
    }

    fn includes(&self, addr: Ipv4) -> bool {
        addr.0 & self.prefix.mask() == self.network.0
    }

    /// `self` is a subnet of `other` (identity counts: a network is a
    /// subnet of itself).
    pub fn is_subnet_of(&self, other: &IpNet) -> bool {
        other.includes(self.network) && self.prefix.value() >= other.prefix.value()
    }

    pub fn is_identical(&self, other: &IpNet) -> bool {
        self.network == other.network && self.prefix.value() == other.prefix.value()
    }
}

impl fmt::Display for IpNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix.value())
    }
}
