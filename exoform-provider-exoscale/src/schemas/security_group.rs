//! Security group resource schema definitions

use exoform_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::types as exo_types;
use crate::{SECURITY_GROUP, SECURITY_GROUP_RULE};

/// Returns the schema for Security Group
pub fn security_group_schema() -> ResourceSchema {
    ResourceSchema::new(SECURITY_GROUP)
        .with_description("An Exoscale compute security group")
        .attribute(
            AttributeSchema::new("name", AttributeType::String)
                .required()
                .force_new()
                .with_description("Security group name"),
        )
        .attribute(
            AttributeSchema::new("description", AttributeType::String)
                .force_new()
                .with_description("Free-form description of the security group"),
        )
        .attribute(
            AttributeSchema::new("account", AttributeType::String)
                .read_only()
                .with_description("Account owning the security group (read-only)"),
        )
        .attribute(
            AttributeSchema::new("virtual_machine_count", AttributeType::Int)
                .read_only()
                .with_description("Number of instances attached to the group (read-only)"),
        )
        .attribute(
            AttributeSchema::new(
                "virtual_machine_ids",
                AttributeType::List(Box::new(AttributeType::String)),
            )
            .read_only()
            .with_description("Set of instance IDs attached to the group (read-only)"),
        )
}

/// Returns the schema for Security Group Rule
///
/// Every attribute forces replacement: rules are never updated in place.
pub fn security_group_rule_schema() -> ResourceSchema {
    ResourceSchema::new(SECURITY_GROUP_RULE)
        .with_description("An ingress or egress rule of an Exoscale security group")
        .attribute(
            AttributeSchema::new("type", exo_types::direction())
                .required()
                .force_new()
                .with_description("Rule direction: ingress or egress"),
        )
        .attribute(
            AttributeSchema::new("security_group_id", AttributeType::String)
                .computed()
                .force_new()
                .conflicts_with(&["security_group_name"])
                .with_description("ID of the owning security group"),
        )
        .attribute(
            AttributeSchema::new("security_group_name", AttributeType::String)
                .computed()
                .force_new()
                .conflicts_with(&["security_group_id"])
                .with_description("Name of the owning security group"),
        )
        .attribute(
            AttributeSchema::new("cidr", types::cidr())
                .force_new()
                .conflicts_with(&["user_security_group"])
                .with_description("Network the rule applies to, e.g. 10.0.0.0/8"),
        )
        .attribute(
            AttributeSchema::new("protocol", exo_types::protocol())
                .force_new()
                .with_default("TCP")
                .with_description("One of TCP, UDP, ICMP, AH, ESP, GRE"),
        )
        .attribute(
            AttributeSchema::new("start_port", exo_types::port_number())
                .force_new()
                .conflicts_with(&["icmp_type", "icmp_code"])
                .with_description("Start of the port range"),
        )
        .attribute(
            AttributeSchema::new("end_port", exo_types::port_number())
                .force_new()
                .conflicts_with(&["icmp_type", "icmp_code"])
                .with_description("End of the port range"),
        )
        .attribute(
            AttributeSchema::new("port", exo_types::port_number())
                .force_new()
                .conflicts_with(&["icmp_type", "icmp_code"])
                .with_description("Single port; overrides start_port and end_port"),
        )
        .attribute(
            AttributeSchema::new("icmp_type", exo_types::icmp_number())
                .force_new()
                .conflicts_with(&["start_port", "end_port", "port"])
                .with_description("ICMP type"),
        )
        .attribute(
            AttributeSchema::new("icmp_code", exo_types::icmp_number())
                .force_new()
                .conflicts_with(&["start_port", "end_port", "port"])
                .with_description("ICMP code"),
        )
        .attribute(
            AttributeSchema::new("user_security_group", AttributeType::String)
                .force_new()
                .conflicts_with(&["cidr"])
                .with_description("Name of a peer security group the rule applies to"),
        )
}
