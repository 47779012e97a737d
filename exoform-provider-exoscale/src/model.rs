//! Strongly typed resource configurations
//!
//! Attribute bags are converted into these types once, after schema
//! validation, so handlers never inspect untyped attributes. Mutually
//! exclusive attribute sets are enums: a rule cannot hold both a CIDR and a
//! peer group, or both a port range and an ICMP type.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use exoform_core::provider::{ErrorKind, ProviderError, ProviderResult};
use exoform_core::resource::{Attributes, Resource};
use exoform_core::schema::validate_cidr;

/// Traffic direction of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ingress,
    Egress,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ingress => "ingress",
            Direction::Egress => "egress",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ingress" => Ok(Direction::Ingress),
            "egress" => Ok(Direction::Egress),
            _ => Err(format!(
                "Invalid rule type '{}', expected ingress or egress",
                s
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IP protocol of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Ah,
    Esp,
    Gre,
}

impl Protocol {
    /// Upper-case name as submitted to the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
            Protocol::Ah => "AH",
            Protocol::Esp => "ESP",
            Protocol::Gre => "GRE",
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            "ICMP" => Ok(Protocol::Icmp),
            "AH" => Ok(Protocol::Ah),
            "ESP" => Ok(Protocol::Esp),
            "GRE" => Ok(Protocol::Gre),
            _ => Err(format!(
                "Invalid protocol '{}', expected one of: TCP, UDP, ICMP, AH, ESP, GRE",
                s
            )),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IPv4 network in CIDR notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Cidr {
    pub addr: Ipv4Addr,
    pub prefix: u8,
}

impl FromStr for Ipv4Cidr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_cidr(s)?;
        let (ip, prefix) = s
            .split_once('/')
            .ok_or_else(|| format!("Invalid CIDR format '{}'", s))?;

        let mut octets = [0u8; 4];
        for (slot, part) in octets.iter_mut().zip(ip.split('.')) {
            *slot = part
                .parse()
                .map_err(|_| format!("Invalid octet '{}' in IP address", part))?;
        }
        let prefix = prefix
            .parse()
            .map_err(|_| format!("Invalid prefix length '{}'", prefix))?;

        Ok(Self {
            addr: Ipv4Addr::from(octets),
            prefix,
        })
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// Reference to a security group, by identifier or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Id(String),
    Name(String),
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRef::Id(id) => write!(f, "id '{}'", id),
            GroupRef::Name(name) => write!(f, "name '{}'", name),
        }
    }
}

/// What the rule matches on the remote side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTarget {
    Cidr(Ipv4Cidr),
    /// Name of a peer security group; a rule carries at most one
    PeerGroup(String),
}

/// Ports or ICMP selector of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Range { start: u16, end: u16 },
    Icmp { icmp_type: u8, icmp_code: u8 },
    None,
}

/// Declared configuration of a security group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupConfig {
    pub name: String,
    pub description: String,
}

impl SecurityGroupConfig {
    pub fn from_resource(resource: &Resource) -> ProviderResult<Self> {
        let name = resource
            .get_string("name")
            .ok_or_else(|| invalid(resource, "Security group name is required"))?;

        Ok(Self {
            name: name.to_string(),
            description: resource
                .get_string("description")
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// Declared configuration of a security group rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupRuleConfig {
    pub direction: Direction,
    pub group: GroupRef,
    pub target: Option<RuleTarget>,
    pub protocol: Protocol,
    pub ports: PortSpec,
}

impl SecurityGroupRuleConfig {
    /// Convert validated attributes (defaults already applied)
    pub fn from_resource(resource: &Resource) -> ProviderResult<Self> {
        let direction = resource
            .get_string("type")
            .ok_or_else(|| invalid(resource, "Rule type is required"))?
            .parse::<Direction>()
            .map_err(|e| invalid(resource, e))?;

        let group = match (
            resource.get_string("security_group_id"),
            resource.get_string("security_group_name"),
        ) {
            (Some(id), None) => GroupRef::Id(id.to_string()),
            (None, Some(name)) => GroupRef::Name(name.to_string()),
            (Some(_), Some(_)) => {
                return Err(invalid(
                    resource,
                    "security_group_id conflicts with security_group_name",
                ));
            }
            (None, None) => {
                return Err(invalid(
                    resource,
                    "One of security_group_id or security_group_name is required",
                ));
            }
        };

        let target = match (
            resource.get_string("cidr"),
            resource.get_string("user_security_group"),
        ) {
            (Some(cidr), None) => Some(RuleTarget::Cidr(
                cidr.parse().map_err(|e| invalid(resource, e))?,
            )),
            (None, Some(peer)) => Some(RuleTarget::PeerGroup(peer.to_string())),
            (Some(_), Some(_)) => {
                return Err(invalid(resource, "cidr conflicts with user_security_group"));
            }
            (None, None) => None,
        };

        let protocol = resource
            .get_string("protocol")
            .unwrap_or(Protocol::Tcp.as_str())
            .parse::<Protocol>()
            .map_err(|e| invalid(resource, e))?;

        let ports = port_spec(resource)?;

        Ok(Self {
            direction,
            group,
            target,
            protocol,
            ports,
        })
    }
}

/// A positive `port` overrides both ends of the range; a lone start or end
/// port describes a single-port range
fn port_spec(resource: &Resource) -> ProviderResult<PortSpec> {
    let port = |key: &str| -> ProviderResult<Option<u16>> {
        resource
            .get_int(key)
            .filter(|n| *n > 0)
            .map(|n| {
                u16::try_from(n)
                    .map_err(|_| invalid(resource, format!("{} {} is not a valid port", key, n)))
            })
            .transpose()
    };
    let icmp = |key: &str| -> ProviderResult<Option<u8>> {
        resource
            .get_int(key)
            .map(|n| {
                u8::try_from(n)
                    .map_err(|_| invalid(resource, format!("{} {} is out of range", key, n)))
            })
            .transpose()
    };

    let single = port("port")?;
    let start = port("start_port")?;
    let end = port("end_port")?;
    let icmp_type = icmp("icmp_type")?;
    let icmp_code = icmp("icmp_code")?;

    let has_ports = single.is_some() || start.is_some() || end.is_some();
    let has_icmp = icmp_type.is_some() || icmp_code.is_some();

    match (has_ports, has_icmp) {
        (true, true) => Err(invalid(
            resource,
            "Port range conflicts with icmp_type/icmp_code",
        )),
        (true, false) => {
            if let Some(p) = single {
                return Ok(PortSpec::Range { start: p, end: p });
            }
            match (start, end) {
                (Some(start), Some(end)) => Ok(PortSpec::Range { start, end }),
                (Some(p), None) | (None, Some(p)) => Ok(PortSpec::Range { start: p, end: p }),
                (None, None) => Ok(PortSpec::None),
            }
        }
        (false, true) => Ok(PortSpec::Icmp {
            icmp_type: icmp_type.unwrap_or(0),
            icmp_code: icmp_code.unwrap_or(0),
        }),
        (false, false) => Ok(PortSpec::None),
    }
}

fn invalid(resource: &Resource, message: impl Into<String>) -> ProviderError {
    ProviderError::new(message)
        .with_kind(ErrorKind::Validation)
        .for_resource(resource.id.clone())
}
