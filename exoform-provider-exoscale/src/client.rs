//! Compute client trait and error types

use async_trait::async_trait;
use thiserror::Error;

use crate::api::{
    SecurityGroup, SecurityGroupProfile, SecurityGroupRule, SecurityGroupRuleProfile,
};

/// Errors returned by a compute API client
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputeError {
    /// The requested object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API answered with an error
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },

    /// Network or protocol failure before an API answer was received
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ComputeError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for compute client operations
pub type ComputeResult<T> = Result<T, ComputeError>;

/// Outbound interface to the remote compute API
///
/// The client owns authentication and job polling. `async_job` tells it to
/// return as soon as a job is submitted instead of waiting for completion.
#[async_trait]
pub trait ComputeClient: Send + Sync {
    /// Create a security group and return it as stored by the API
    async fn create_security_group(
        &self,
        profile: &SecurityGroupProfile,
    ) -> ComputeResult<SecurityGroup>;

    /// Fetch a security group, including its rules, by identifier
    async fn get_security_group_by_id(&self, id: &str) -> ComputeResult<SecurityGroup>;

    /// Look up a security group by name
    ///
    /// Returns `None` if no group has that name
    async fn find_security_group_by_name(&self, name: &str)
    -> ComputeResult<Option<SecurityGroup>>;

    /// Delete a security group by name
    async fn delete_security_group(&self, name: &str) -> ComputeResult<()>;

    async fn create_ingress_rule(
        &self,
        profile: &SecurityGroupRuleProfile,
        async_job: bool,
    ) -> ComputeResult<SecurityGroupRule>;

    async fn create_egress_rule(
        &self,
        profile: &SecurityGroupRuleProfile,
        async_job: bool,
    ) -> ComputeResult<SecurityGroupRule>;

    async fn delete_ingress_rule(&self, id: &str, async_job: bool) -> ComputeResult<()>;

    async fn delete_egress_rule(&self, id: &str, async_job: bool) -> ComputeResult<()>;
}
