//! Security group rule handler
//!
//! Rules live inside their security group on the API side; reading a rule
//! means fetching the group and scanning its ingress or egress list.

use exoform_core::provider::{ErrorKind, ProviderError, ProviderResult};
use exoform_core::resource::{Attributes, Resource, State, Value};
use log::debug;

use crate::api::{SecurityGroupRule, SecurityGroupRuleProfile, UserSecurityGroup};
use crate::client::ComputeClient;
use crate::model::{Direction, GroupRef, PortSpec, RuleTarget, SecurityGroupRuleConfig};
use crate::{ExoscaleProvider, compute_error};

impl<C: ComputeClient> ExoscaleProvider<C> {
    /// Create an ingress or egress rule
    pub(crate) async fn create_security_group_rule(
        &self,
        resource: Resource,
    ) -> ProviderResult<State> {
        let config = SecurityGroupRuleConfig::from_resource(&resource)?;

        let group = self
            .resolve_security_group(&config.group)
            .await
            .map_err(|e| e.for_resource(resource.id.clone()))?;

        let mut profile = SecurityGroupRuleProfile {
            security_group_id: group.id.clone(),
            protocol: config.protocol.as_str().to_string(),
            ..Default::default()
        };

        match config.ports {
            PortSpec::Range { start, end } => {
                profile.start_port = Some(start);
                profile.end_port = Some(end);
            }
            PortSpec::Icmp {
                icmp_type,
                icmp_code,
            } => {
                profile.icmp_type = Some(icmp_type);
                profile.icmp_code = Some(icmp_code);
            }
            PortSpec::None => {}
        }

        match &config.target {
            Some(RuleTarget::Cidr(cidr)) => profile.cidr = Some(cidr.to_string()),
            Some(RuleTarget::PeerGroup(name)) => {
                // The API takes a list of peers; a rule resource carries one.
                let peer = self
                    .resolve_security_group(&GroupRef::Name(name.clone()))
                    .await
                    .map_err(|e| e.for_resource(resource.id.clone()))?;
                profile.user_security_group_list = vec![UserSecurityGroup {
                    account: peer.account,
                    group: peer.name,
                }];
            }
            None => {}
        }

        let async_job = self.config.async_jobs;
        debug!(
            "Creating {} rule on security group {} (async: {})",
            config.direction, group.id, async_job
        );
        let rule = match config.direction {
            Direction::Ingress => self.client.create_ingress_rule(&profile, async_job).await,
            Direction::Egress => self.client.create_egress_rule(&profile, async_job).await,
        }
        .map_err(|e| {
            compute_error(format!("Failed to create {} rule", config.direction), e)
                .for_resource(resource.id.clone())
        })?;

        let mut state =
            State::existing(resource.id, resource.attributes).with_identifier(rule.id.clone());
        state.set("type", config.direction.as_str());
        state.set("security_group_id", group.id);
        state.set("security_group_name", group.name);
        state.set("protocol", config.protocol.as_str());

        Ok(apply_security_group_rule(state, &rule))
    }

    /// Refresh a rule from its security group
    ///
    /// A state without a group reference has nothing to refresh and is
    /// returned as is. A rule missing from the group's list is gone.
    pub(crate) async fn read_security_group_rule(&self, state: State) -> ProviderResult<State> {
        let Some(group_id) = state.get_string("security_group_id").map(str::to_string) else {
            return Ok(state);
        };
        let direction = stored_direction(&state)?;
        let identifier = state.identifier().map(str::to_string);

        let group = self
            .resolve_security_group(&GroupRef::Id(group_id))
            .await
            .map_err(|e| e.for_resource(state.id.clone()))?;
        debug!("Security group {:?}", group);

        let rules = match direction {
            Direction::Ingress => &group.ingress_rules,
            Direction::Egress => &group.egress_rules,
        };

        match rules
            .iter()
            .find(|rule| Some(rule.id.as_str()) == identifier.as_deref())
        {
            Some(rule) => Ok(apply_security_group_rule(state, rule)),
            None => {
                debug!(
                    "{} rule {:?} not found in security group {}",
                    direction, identifier, group.id
                );
                Ok(State::not_found(state.id))
            }
        }
    }

    /// Delete a rule through the path matching its direction
    pub(crate) async fn delete_security_group_rule(&self, state: State) -> ProviderResult<()> {
        let direction = stored_direction(&state)?;
        let identifier = state.identifier().ok_or_else(|| {
            ProviderError::new("Security group rule has no identifier")
                .for_resource(state.id.clone())
        })?;

        let async_job = self.config.async_jobs;
        debug!("Deleting {} rule {} (async: {})", direction, identifier, async_job);
        let result = match direction {
            Direction::Ingress => self.client.delete_ingress_rule(identifier, async_job).await,
            Direction::Egress => self.client.delete_egress_rule(identifier, async_job).await,
        };
        result.map_err(|e| {
            compute_error(format!("Failed to delete {} rule", direction), e)
                .for_resource(state.id.clone())
        })
    }
}

fn stored_direction(state: &State) -> ProviderResult<Direction> {
    state
        .get_string("type")
        .ok_or_else(|| "Rule type is missing from state".to_string())
        .and_then(|t| t.parse::<Direction>())
        .map_err(|message| {
            ProviderError::new(message)
                .with_kind(ErrorKind::Validation)
                .for_resource(state.id.clone())
        })
}

/// Write the API's view of a rule's network selector into local state
fn apply_security_group_rule(mut state: State, rule: &SecurityGroupRule) -> State {
    let fields = [
        ("cidr", rule.cidr.clone().map(Value::String)),
        ("start_port", rule.start_port.map(|p| Value::Int(p.into()))),
        ("end_port", rule.end_port.map(|p| Value::Int(p.into()))),
        ("icmp_type", rule.icmp_type.map(|t| Value::Int(t.into()))),
        ("icmp_code", rule.icmp_code.map(|c| Value::Int(c.into()))),
    ];

    for (key, value) in fields {
        match value {
            Some(value) => state.set(key, value),
            None => {
                state.attributes.remove(key);
            }
        }
    }
    state
}
