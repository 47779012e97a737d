//! Schema - Define type schemas for resources
//!
//! Providers define schemas for each resource type, so that declared
//! attributes are validated before any handler runs.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::net::Ipv4Addr;

use crate::resource::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Enum matched ignoring ASCII case
    CaseInsensitiveEnum(Vec<String>),
    /// Integer within an inclusive range
    IntRange { min: i64, max: i64 },
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),

            (AttributeType::CaseInsensitiveEnum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v.eq_ignore_ascii_case(s)) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::IntRange { min, max }, Value::Int(n)) => {
                if (*min..=*max).contains(n) {
                    Ok(())
                } else {
                    Err(TypeError::OutOfRange {
                        value: *n,
                        min: *min,
                        max: *max,
                    })
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::CaseInsensitiveEnum(variants) => {
                format!("Enum({})", variants.join(" | "))
            }
            AttributeType::IntRange { min, max } => format!("Int({}..={})", min, max),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Value {value} out of range, expected {min} to {max}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ReadOnly { name: String },

    #[error("Attribute '{name}' conflicts with '{other}'")]
    Conflict { name: String, other: String },

    #[error("Attribute '{name}': {inner}")]
    InvalidAttribute { name: String, inner: Box<TypeError> },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Value is filled in by the provider
    pub computed: bool,
    /// Value is filled in by the provider and may not be declared
    pub read_only: bool,
    /// A change cannot be applied in place; the resource is replaced
    pub force_new: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    /// Attributes that may not be set together with this one
    pub conflicts_with: Vec<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            computed: false,
            read_only: false,
            force_new: false,
            default: None,
            description: None,
            conflicts_with: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.computed = true;
        self.read_only = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn conflicts_with(mut self, names: &[&str]) -> Self {
        self.conflicts_with
            .extend(names.iter().map(|n| n.to_string()));
        self
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Fill in defaults for attributes that were not declared
    pub fn apply_defaults(&self, attributes: &mut HashMap<String, Value>) {
        for (name, schema) in &self.attributes {
            if let Some(default) = &schema.default
                && !attributes.get(name).is_some_and(is_set)
            {
                attributes.insert(name.clone(), default.clone());
            }
        }
    }

    /// True when every declared attribute forces replacement
    pub fn is_replace_only(&self) -> bool {
        self.attributes
            .values()
            .filter(|a| !a.read_only)
            .all(|a| a.force_new)
    }

    /// Validate resource attributes, collecting every violation
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        let mut names: Vec<&String> = self.attributes.keys().collect();
        names.sort();

        // Check required attributes
        for name in &names {
            let schema = &self.attributes[*name];
            if schema.required
                && !attributes.get(*name).is_some_and(is_set)
                && schema.default.is_none()
            {
                errors.push(TypeError::MissingRequired {
                    name: (*name).clone(),
                });
            }
        }

        let mut declared: Vec<(&String, &Value)> =
            attributes.iter().filter(|(_, v)| is_set(v)).collect();
        declared.sort_by(|a, b| a.0.cmp(b.0));

        // Type check each attribute
        for (name, value) in &declared {
            match self.attributes.get(*name) {
                None => errors.push(TypeError::UnknownAttribute {
                    name: (*name).clone(),
                }),
                Some(schema) if schema.read_only => errors.push(TypeError::ReadOnly {
                    name: (*name).clone(),
                }),
                Some(schema) => {
                    if let Err(e) = schema.attr_type.validate(value) {
                        errors.push(TypeError::InvalidAttribute {
                            name: (*name).clone(),
                            inner: Box::new(e),
                        });
                    }
                }
            }
        }

        // Conflicting attributes, each pair reported once
        let mut conflicts = BTreeSet::new();
        for (name, _) in &declared {
            let Some(schema) = self.attributes.get(*name) else {
                continue;
            };
            for other in &schema.conflicts_with {
                if attributes.get(other).is_some_and(is_set) {
                    let pair = if *name < other {
                        ((*name).clone(), other.clone())
                    } else {
                        (other.clone(), (*name).clone())
                    };
                    conflicts.insert(pair);
                }
            }
        }
        errors.extend(
            conflicts
                .into_iter()
                .map(|(name, other)| TypeError::Conflict { name, other }),
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Empty strings are treated as unset, as the host sends zero values for
/// attributes that were never declared
fn is_set(value: &Value) -> bool {
    !matches!(value, Value::String(s) if s.is_empty())
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Integer in an inclusive range
    pub fn int_between(min: i64, max: i64) -> AttributeType {
        AttributeType::IntRange { min, max }
    }

    /// String matched against a fixed set, ignoring case
    pub fn string_in_ignore_case(values: &[&str]) -> AttributeType {
        AttributeType::CaseInsensitiveEnum(values.iter().map(|v| v.to_string()).collect())
    }

    /// IPv4 CIDR network (e.g., "10.0.0.0/16")
    pub fn cidr() -> AttributeType {
        AttributeType::Custom {
            name: "Cidr".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| {
                if let Value::String(s) = value {
                    validate_cidr(s)
                } else {
                    Err("Expected string".to_string())
                }
            },
        }
    }
}

/// Validate an IPv4 network in CIDR notation (e.g., "10.0.0.0/16")
///
/// Octets and prefix are plain decimal without sign or leading zeros, the
/// prefix is at most 32 and no bits below the prefix may be set.
pub fn validate_cidr(cidr: &str) -> Result<(), String> {
    let Some((ip, prefix)) = cidr.split_once('/') else {
        return Err(format!("Invalid CIDR format '{}': expected IP/prefix", cidr));
    };

    // Validate IP address
    let octets: Vec<&str> = ip.split('.').collect();
    if octets.len() != 4 {
        return Err(format!("Invalid IP address '{}': expected 4 octets", ip));
    }

    let mut addr: u32 = 0;
    for octet in &octets {
        let value = parse_decimal(octet)
            .filter(|v| *v <= 255)
            .ok_or_else(|| format!("Invalid octet '{}' in IP address: must be 0-255", octet))?;
        addr = (addr << 8) | value;
    }

    // Validate prefix length
    let prefix = match parse_decimal(prefix) {
        Some(p) if p <= 32 => p,
        Some(p) => return Err(format!("Invalid prefix length '{}': must be 0-32", p)),
        None => return Err(format!("Invalid prefix length '{}': must be a number", prefix)),
    };

    let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
    if addr & !mask != 0 {
        return Err(format!(
            "Invalid network CIDR '{}': host bits are set, expected {}/{}",
            cidr,
            Ipv4Addr::from(addr & mask),
            prefix
        ));
    }

    Ok(())
}

/// Parse plain decimal digits, rejecting signs and leading zeros
fn parse_decimal(s: &str) -> Option<u32> {
    let canonical = !s.is_empty()
        && s.len() <= 3
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'));
    if canonical { s.parse().ok() } else { None }
}
