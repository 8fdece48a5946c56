//! Address families and per-family containers
//!
//! Every stage of a run is evaluated once per family. [`DualStack`] keeps the
//! two halves side by side so the families can never leak into each other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// IP address family (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Both families, in processing order
    pub const ALL: [IpFamily; 2] = [IpFamily::V4, IpFamily::V6];

    /// Family of a concrete address
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// DNS record type holding addresses of this family
    pub fn record_type(self) -> &'static str {
        match self {
            IpFamily::V4 => "A",
            IpFamily::V6 => "AAAA",
        }
    }

    /// The unspecified address of this family (`0.0.0.0` or `::`)
    ///
    /// Binding a socket to it pins the connection to the family.
    pub fn unspecified(self) -> IpAddr {
        match self {
            IpFamily::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpFamily::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }

    /// Whether `ip` belongs to this family
    pub fn matches(self, ip: &IpAddr) -> bool {
        IpFamily::of(ip) == self
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => f.write_str("IPv4"),
            IpFamily::V6 => f.write_str("IPv6"),
        }
    }
}

/// One value per address family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DualStack<T> {
    pub v4: T,
    pub v6: T,
}

impl<T> DualStack<T> {
    /// Create from both halves
    pub fn new(v4: T, v6: T) -> Self {
        Self { v4, v6 }
    }

    /// Borrow the value for `family`
    pub fn get(&self, family: IpFamily) -> &T {
        match family {
            IpFamily::V4 => &self.v4,
            IpFamily::V6 => &self.v6,
        }
    }

    /// Mutably borrow the value for `family`
    pub fn get_mut(&mut self, family: IpFamily) -> &mut T {
        match family {
            IpFamily::V4 => &mut self.v4,
            IpFamily::V6 => &mut self.v6,
        }
    }

    /// Apply `f` to each half, passing the family along
    pub fn map<U>(self, mut f: impl FnMut(IpFamily, T) -> U) -> DualStack<U> {
        DualStack {
            v4: f(IpFamily::V4, self.v4),
            v6: f(IpFamily::V6, self.v6),
        }
    }

    /// Iterate `(family, value)` pairs in processing order
    pub fn iter(&self) -> impl Iterator<Item = (IpFamily, &T)> {
        [(IpFamily::V4, &self.v4), (IpFamily::V6, &self.v6)].into_iter()
    }
}
