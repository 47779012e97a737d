//! Security group handler

use exoform_core::provider::{ProviderError, ProviderResult};
use exoform_core::resource::{Attributes, Resource, State, Value};
use log::{debug, warn};

use crate::api::{SecurityGroup, SecurityGroupProfile};
use crate::client::ComputeClient;
use crate::model::{GroupRef, SecurityGroupConfig};
use crate::{ExoscaleProvider, compute_error};

impl<C: ComputeClient> ExoscaleProvider<C> {
    /// Create a security group
    pub(crate) async fn create_security_group(&self, resource: Resource) -> ProviderResult<State> {
        let config = SecurityGroupConfig::from_resource(&resource)?;
        let profile = SecurityGroupProfile {
            name: config.name,
            description: config.description,
        };

        debug!("Creating security group '{}'", profile.name);
        let group = self
            .client
            .create_security_group(&profile)
            .await
            .map_err(|e| {
                compute_error("Failed to create security group", e)
                    .for_resource(resource.id.clone())
            })?;

        Ok(apply_security_group(
            State::existing(resource.id, resource.attributes),
            &group,
        ))
    }

    /// Refresh a security group by its identifier
    ///
    /// Any fetch error clears the state. The API does not tell a deleted
    /// group apart from other failures reliably, so errors other than a
    /// recognised not-found are logged before the state is dropped.
    pub(crate) async fn read_security_group(&self, state: State) -> ProviderResult<State> {
        let Some(identifier) = state.identifier().map(str::to_string) else {
            return Ok(State::not_found(state.id));
        };

        match self.client.get_security_group_by_id(&identifier).await {
            Ok(group) => Ok(apply_security_group(state, &group)),
            Err(err) if err.is_not_found() => {
                debug!("Security group {} no longer exists", identifier);
                Ok(State::not_found(state.id))
            }
            Err(err) => {
                warn!(
                    "Reading security group {} failed, treating it as deleted: {}",
                    identifier, err
                );
                Ok(State::not_found(state.id))
            }
        }
    }

    /// Delete a security group by name
    pub(crate) async fn delete_security_group(&self, state: State) -> ProviderResult<()> {
        let name = state.get_string("name").ok_or_else(|| {
            ProviderError::new("Security group name is missing from state")
                .for_resource(state.id.clone())
        })?;

        debug!("Deleting security group '{}'", name);
        self.client.delete_security_group(name).await.map_err(|e| {
            compute_error("Failed to delete security group", e).for_resource(state.id.clone())
        })
    }

    /// Fetch a security group by identifier, or look it up by name
    pub(crate) async fn resolve_security_group(
        &self,
        reference: &GroupRef,
    ) -> ProviderResult<SecurityGroup> {
        match reference {
            GroupRef::Id(id) => self
                .client
                .get_security_group_by_id(id)
                .await
                .map_err(|e| {
                    compute_error(format!("Failed to fetch security group {}", reference), e)
                }),
            GroupRef::Name(name) => self
                .client
                .find_security_group_by_name(name)
                .await
                .map_err(|e| {
                    compute_error(format!("Failed to look up security group {}", reference), e)
                })?
                .ok_or_else(|| {
                    ProviderError::not_found(format!("Security group with {} not found", reference))
                }),
        }
    }
}

/// Write the API's view of a security group into local state
fn apply_security_group(mut state: State, group: &SecurityGroup) -> State {
    state.identifier = Some(group.id.clone());
    state.exists = true;
    state.set("name", group.name.clone());
    state.set("description", group.description.clone());
    state.set("account", group.account.clone());
    state.set("virtual_machine_count", group.virtual_machine_count);
    state.set(
        "virtual_machine_ids",
        Value::string_set(group.virtual_machine_ids.iter().cloned()),
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeCompute};
    use crate::{ComputeError, ProviderConfig, SECURITY_GROUP};
    use exoform_core::provider::{ErrorKind, Provider};

    fn provider() -> ExoscaleProvider<FakeCompute> {
        ExoscaleProvider::new(FakeCompute::new(), ProviderConfig::default())
    }

    fn web() -> Resource {
        Resource::new(SECURITY_GROUP, "web")
            .with_attribute("name", "web")
            .with_attribute("description", "web servers")
    }

    #[tokio::test]
    async fn create_mirrors_api_response() {
        let provider = provider();
        let state = provider.create(&web()).await.unwrap();

        let group = provider.client().group_named("web").unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier(), Some(group.id.as_str()));
        assert_eq!(state.get_string("account"), Some(group.account.as_str()));
        assert_eq!(state.get_string("description"), Some("web servers"));
        assert_eq!(state.get_int("virtual_machine_count"), Some(0));
        assert_eq!(
            state.attributes.get("virtual_machine_ids"),
            Some(&Value::List(vec![]))
        );
        assert_eq!(
            provider.client().calls(),
            vec![Call::CreateSecurityGroup("web".to_string())]
        );
    }

    #[tokio::test]
    async fn create_propagates_api_error() {
        let provider = provider();
        provider.client().fail_next(ComputeError::Api {
            code: 500,
            message: "boom".to_string(),
        });

        let err = provider.create(&web()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Api);
        assert!(err.to_string().contains("Failed to create security group"));
    }

    #[tokio::test]
    async fn create_rejects_missing_name_before_api_call() {
        let provider = provider();
        let resource = Resource::new(SECURITY_GROUP, "web").with_attribute("description", "x");

        let err = provider.create(&resource).await.unwrap_err();
        assert!(err.is_validation());
        assert!(provider.client().calls().is_empty());
    }

    #[tokio::test]
    async fn read_refreshes_computed_attributes() {
        let provider = provider();
        let state = provider.create(&web()).await.unwrap();
        provider
            .client()
            .attach_instances("web", &["vm-2", "vm-1", "vm-2"]);

        let state = provider.read(&state).await.unwrap();
        assert!(state.exists);
        assert_eq!(state.get_int("virtual_machine_count"), Some(3));
        assert_eq!(
            state.attributes.get("virtual_machine_ids"),
            Some(&Value::string_set(["vm-1", "vm-2"]))
        );
    }

    #[tokio::test]
    async fn read_after_external_delete_clears_state() {
        let provider = provider();
        let state = provider.create(&web()).await.unwrap();
        provider.client().remove_group("web");

        let state = provider.read(&state).await.unwrap();
        assert!(!state.exists);
        assert_eq!(state.identifier(), None);
    }

    #[tokio::test]
    async fn read_treats_any_api_error_as_absent() {
        let provider = provider();
        let state = provider.create(&web()).await.unwrap();
        provider.client().fail_next(ComputeError::Api {
            code: 431,
            message: "unable to execute API command".to_string(),
        });

        let state = provider.read(&state).await.unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn delete_uses_name() {
        let provider = provider();
        let state = provider.create(&web()).await.unwrap();

        provider.delete(&state).await.unwrap();
        assert!(provider.client().group_named("web").is_none());
        assert_eq!(
            provider.client().calls().last(),
            Some(&Call::DeleteSecurityGroup("web".to_string()))
        );
    }

    #[tokio::test]
    async fn delete_propagates_error() {
        let provider = provider();
        let state = provider.create(&web()).await.unwrap();
        provider.client().remove_group("web");

        let err = provider.delete(&state).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn resolve_by_unknown_name_is_not_found() {
        let provider = provider();
        let err = provider
            .resolve_security_group(&GroupRef::Name("ghost".to_string()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Security group with name 'ghost' not found");
    }
}
