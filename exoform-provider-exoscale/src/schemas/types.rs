//! Exoscale-specific attribute types

use exoform_core::schema::{AttributeType, types};

/// Rule directions accepted for the `type` attribute
pub const DIRECTIONS: &[&str] = &["ingress", "egress"];

/// Protocols accepted by security group rules
pub const PROTOCOLS: &[&str] = &["TCP", "UDP", "ICMP", "AH", "ESP", "GRE"];

/// Rule direction, matched case-insensitively
pub fn direction() -> AttributeType {
    types::string_in_ignore_case(DIRECTIONS)
}

/// Rule protocol, matched case-insensitively
pub fn protocol() -> AttributeType {
    types::string_in_ignore_case(PROTOCOLS)
}

/// TCP/UDP port number (1-65535)
pub fn port_number() -> AttributeType {
    types::int_between(1, 65535)
}

/// ICMP type or code (0-255)
pub fn icmp_number() -> AttributeType {
    types::int_between(0, 255)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exoform_core::resource::Value;

    #[test]
    fn protocol_accepts_any_case() {
        let t = protocol();
        for p in ["tcp", "TCP", "Udp", "icmp", "ah", "ESP", "gre"] {
            assert!(t.validate(&Value::String(p.to_string())).is_ok(), "{}", p);
        }
    }

    #[test]
    fn protocol_rejects_unknown() {
        let t = protocol();
        assert!(t.validate(&Value::String("sctp".to_string())).is_err());
        assert!(t.validate(&Value::String("-1".to_string())).is_err());
    }

    #[test]
    fn direction_rejects_unknown() {
        let t = direction();
        assert!(t.validate(&Value::String("Ingress".to_string())).is_ok());
        assert!(t.validate(&Value::String("inbound".to_string())).is_err());
    }

    #[test]
    fn port_number_bounds() {
        let t = port_number();
        assert!(t.validate(&Value::Int(0)).is_err());
        assert!(t.validate(&Value::Int(1)).is_ok());
        assert!(t.validate(&Value::Int(65535)).is_ok());
        assert!(t.validate(&Value::Int(65536)).is_err());
    }

    #[test]
    fn icmp_number_bounds() {
        let t = icmp_number();
        assert!(t.validate(&Value::Int(0)).is_ok());
        assert!(t.validate(&Value::Int(255)).is_ok());
        assert!(t.validate(&Value::Int(256)).is_err());
        assert!(t.validate(&Value::Int(-1)).is_err());
    }
}
