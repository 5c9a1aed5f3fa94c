//! Contact point parsing
//!
//! Accepted forms: `host`, `host:port`, `[ipv6]`, `[ipv6]:port` and a bare
//! IPv6 literal such as `::1`.

use crate::{Error, Result};
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

/// A host to bootstrap from, with an optional explicit port
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactPoint {
    host: String,
    port: Option<u16>,
}

impl ContactPoint {
    /// Contact point for `host` with an optional port
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a contact point string
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the string is empty, brackets are
    /// unbalanced, the port is not a number in `1..=65535`, or a host with
    /// several colons is not an IPv6 literal.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Config("empty contact point".into()));
        }

        if let Some(rest) = s.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| invalid(s, "missing closing bracket"))?;
            host.parse::<Ipv6Addr>()
                .map_err(|_| invalid(s, "bracketed host is not an IPv6 address"))?;
            let port = match after {
                "" => None,
                _ => {
                    let port = after
                        .strip_prefix(':')
                        .ok_or_else(|| invalid(s, "unexpected text after closing bracket"))?;
                    Some(parse_port(s, port)?)
                }
            };
            return Ok(Self::new(host, port));
        }

        match s.matches(':').count() {
            0 => Ok(Self::new(s, None)),
            1 => {
                let (host, port) = s.split_once(':').unwrap_or((s, ""));
                if host.is_empty() {
                    return Err(invalid(s, "missing host"));
                }
                Ok(Self::new(host, Some(parse_port(s, port)?)))
            }
            _ => {
                s.parse::<Ipv6Addr>()
                    .map_err(|_| invalid(s, "use [host]:port for IPv6 addresses"))?;
                Ok(Self::new(s, None))
            }
        }
    }

    /// Host name or IP literal (IPv6 without brackets)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, if one was given
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Explicit port, or `default_port`
    pub fn port_or(&self, default_port: u16) -> u16 {
        self.port.unwrap_or(default_port)
    }
}

impl FromStr for ContactPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ContactPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bracket = self.host.contains(':');
        match (bracket, self.port) {
            (true, Some(port)) => write!(f, "[{}]:{}", self.host, port),
            (true, None) => write!(f, "[{}]", self.host),
            (false, Some(port)) => write!(f, "{}:{}", self.host, port),
            (false, None) => f.write_str(&self.host),
        }
    }
}

/// Parse a comma-separated list of contact points, skipping empty entries
///
/// # Examples
///
/// ```
/// use cql_topology::parse_contact_points;
///
/// let points = parse_contact_points("10.0.0.1, db2:9043,[::1]:9042").unwrap();
/// assert_eq!(points.len(), 3);
/// assert_eq!(points[1].port(), Some(9043));
/// ```
pub fn parse_contact_points(list: &str) -> Result<Vec<ContactPoint>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ContactPoint::parse)
        .collect()
}

fn parse_port(contact_point: &str, port: &str) -> Result<u16> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(invalid(contact_point, &format!("invalid port '{}'", port))),
        Ok(port) => Ok(port),
    }
}

fn invalid(contact_point: &str, reason: &str) -> Error {
    Error::Config(format!("contact point '{}': {}", contact_point, reason))
}
