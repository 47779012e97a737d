//! Exoform Exoscale Provider
//!
//! Security group and security group rule resources backed by the Exoscale
//! compute API. The API client itself is supplied by the caller through the
//! [`ComputeClient`] trait.

pub mod api;
pub mod client;
pub mod config;
pub mod model;
pub mod schemas;

mod security_group;
mod security_group_rule;

#[cfg(test)]
mod testing;

use exoform_core::provider::{
    BoxFuture, ErrorKind, Provider, ProviderError, ProviderResult, ResourceType,
};
use exoform_core::resource::{Resource, State};
use exoform_core::schema::ResourceSchema;

pub use client::{ComputeClient, ComputeError, ComputeResult};
pub use config::ProviderConfig;

/// Resource type name of security groups
pub const SECURITY_GROUP: &str = "security_group";

/// Resource type name of security group rules
pub const SECURITY_GROUP_RULE: &str = "security_group_rule";

/// Security Group resource type
pub struct SecurityGroupType;

impl ResourceType for SecurityGroupType {
    fn name(&self) -> &'static str {
        SECURITY_GROUP
    }

    fn schema(&self) -> ResourceSchema {
        schemas::security_group::security_group_schema()
    }
}

/// Security Group Rule resource type
pub struct SecurityGroupRuleType;

impl ResourceType for SecurityGroupRuleType {
    fn name(&self) -> &'static str {
        SECURITY_GROUP_RULE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::security_group::security_group_rule_schema()
    }
}

/// Exoscale Provider
pub struct ExoscaleProvider<C> {
    client: C,
    config: ProviderConfig,
}

impl<C: ComputeClient> ExoscaleProvider<C> {
    /// Create a provider around a compute client
    pub fn new(client: C, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: ComputeClient + 'static> Provider for ExoscaleProvider<C> {
    fn name(&self) -> &'static str {
        "exoscale"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        vec![Box::new(SecurityGroupType), Box::new(SecurityGroupRuleType)]
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let mut resource = resource.clone();
        Box::pin(async move {
            if let Some(schema) = self.schema(&resource.id.resource_type) {
                schema.apply_defaults(&mut resource.attributes);
            }
            self.validate(&resource)?;

            match resource.id.resource_type.as_str() {
                SECURITY_GROUP => self.create_security_group(resource).await,
                SECURITY_GROUP_RULE => self.create_security_group_rule(resource).await,
                _ => Err(ProviderError::new(format!(
                    "Unknown resource type: {}",
                    resource.id.resource_type
                ))
                .for_resource(resource.id.clone())),
            }
        })
    }

    fn read(&self, state: &State) -> BoxFuture<'_, ProviderResult<State>> {
        let state = state.clone();
        Box::pin(async move {
            match state.id.resource_type.as_str() {
                SECURITY_GROUP => self.read_security_group(state).await,
                SECURITY_GROUP_RULE => self.read_security_group_rule(state).await,
                _ => Err(ProviderError::new(format!(
                    "Unknown resource type: {}",
                    state.id.resource_type
                ))
                .for_resource(state.id.clone())),
            }
        })
    }

    fn delete(&self, state: &State) -> BoxFuture<'_, ProviderResult<()>> {
        let state = state.clone();
        Box::pin(async move {
            match state.id.resource_type.as_str() {
                SECURITY_GROUP => self.delete_security_group(state).await,
                SECURITY_GROUP_RULE => self.delete_security_group_rule(state).await,
                _ => Err(ProviderError::new(format!(
                    "Unknown resource type: {}",
                    state.id.resource_type
                ))
                .for_resource(state.id.clone())),
            }
        })
    }
}

/// Wrap a client error, keeping not-found distinguishable from other failures
pub(crate) fn compute_error(context: impl std::fmt::Display, err: ComputeError) -> ProviderError {
    let kind = if err.is_not_found() {
        ErrorKind::NotFound
    } else {
        ErrorKind::Api
    };
    ProviderError::new(format!("{}: {}", context, err))
        .with_kind(kind)
        .with_cause(err)
}
