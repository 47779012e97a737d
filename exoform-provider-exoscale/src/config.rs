//! Provider configuration

use std::collections::HashMap;

use exoform_core::provider::{ProviderError, ProviderResult};
use exoform_core::resource::{Attributes, Value};

/// Configuration shared by every operation of the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Return right after submitting rule jobs instead of waiting for them
    pub async_jobs: bool,
}

impl ProviderConfig {
    /// Attribute name of the async flag in the provider block
    pub const ASYNC: &'static str = "async";

    /// Build from the provider block's attributes
    ///
    /// Unknown attributes are ignored; they belong to the client.
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> ProviderResult<Self> {
        let async_jobs = match attributes.get(Self::ASYNC) {
            None => false,
            Some(value) => attributes.get_bool(Self::ASYNC).ok_or_else(|| {
                ProviderError::configuration(format!(
                    "Provider attribute '{}' must be a boolean, got {:?}",
                    Self::ASYNC,
                    value
                ))
            })?,
        };

        Ok(Self { async_jobs })
    }

    pub fn with_async_jobs(mut self, async_jobs: bool) -> Self {
        self.async_jobs = async_jobs;
        self
    }
}
