//! Compute API data types
//!
//! Shapes exchanged with the compute API client. Field names on the wire
//! follow the API's all-lowercase convention.

use serde::{Deserialize, Serialize};

/// A security group as returned by the API, including its rules inline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub account: String,
    #[serde(default, rename = "virtualmachinecount")]
    pub virtual_machine_count: i64,
    #[serde(default, rename = "virtualmachineids")]
    pub virtual_machine_ids: Vec<String>,
    #[serde(default, rename = "ingressrule")]
    pub ingress_rules: Vec<SecurityGroupRule>,
    #[serde(default, rename = "egressrule")]
    pub egress_rules: Vec<SecurityGroupRule>,
}

/// A single ingress or egress rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct SecurityGroupRule {
    #[serde(rename = "ruleid")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(default)]
    pub protocol: String,
    #[serde(default, rename = "startport", skip_serializing_if = "Option::is_none")]
    pub start_port: Option<u16>,
    #[serde(default, rename = "endport", skip_serializing_if = "Option::is_none")]
    pub end_port: Option<u16>,
    #[serde(default, rename = "icmptype", skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<u8>,
    #[serde(default, rename = "icmpcode", skip_serializing_if = "Option::is_none")]
    pub icmp_code: Option<u8>,
    #[serde(default, rename = "usersecuritygrouplist")]
    pub user_security_groups: Vec<UserSecurityGroup>,
}

/// A peer security group reference: another group identified by account and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSecurityGroup {
    pub account: String,
    pub group: String,
}

/// Parameters of a create-security-group call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroupProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Parameters of a create-ingress/egress-rule call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct SecurityGroupRuleProfile {
    #[serde(rename = "securitygroupid")]
    pub security_group_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    pub protocol: String,
    #[serde(rename = "startport", skip_serializing_if = "Option::is_none")]
    pub start_port: Option<u16>,
    #[serde(rename = "endport", skip_serializing_if = "Option::is_none")]
    pub end_port: Option<u16>,
    #[serde(rename = "icmptype", skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<u8>,
    #[serde(rename = "icmpcode", skip_serializing_if = "Option::is_none")]
    pub icmp_code: Option<u8>,
    #[serde(
        rename = "usersecuritygrouplist",
        skip_serializing_if = "Vec::is_empty",
        default
    )]
    pub user_security_group_list: Vec<UserSecurityGroup>,
}
