//! In-memory compute client for tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{
    SecurityGroup, SecurityGroupProfile, SecurityGroupRule, SecurityGroupRuleProfile,
};
use crate::client::{ComputeClient, ComputeError, ComputeResult};

/// A client call as observed by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateSecurityGroup(String),
    GetSecurityGroupById(String),
    FindSecurityGroupByName(String),
    DeleteSecurityGroup(String),
    CreateIngressRule { group_id: String, async_job: bool },
    CreateEgressRule { group_id: String, async_job: bool },
    DeleteIngressRule { id: String, async_job: bool },
    DeleteEgressRule { id: String, async_job: bool },
}

#[derive(Default)]
struct Inner {
    groups: Vec<SecurityGroup>,
    calls: Vec<Call>,
    next_id: u32,
    fail_next: Option<ComputeError>,
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn record(&mut self, call: Call) -> ComputeResult<()> {
        self.calls.push(call);
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn group_mut(&mut self, id: &str) -> ComputeResult<&mut SecurityGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| ComputeError::not_found(format!("security group {}", id)))
    }

    fn add_rule(
        &mut self,
        profile: &SecurityGroupRuleProfile,
        ingress: bool,
    ) -> ComputeResult<SecurityGroupRule> {
        let rule = SecurityGroupRule {
            id: self.next_id("rule"),
            cidr: profile.cidr.clone(),
            protocol: profile.protocol.clone(),
            start_port: profile.start_port,
            end_port: profile.end_port,
            icmp_type: profile.icmp_type,
            icmp_code: profile.icmp_code,
            user_security_groups: profile.user_security_group_list.clone(),
        };
        let group = self.group_mut(&profile.security_group_id)?;
        if ingress {
            group.ingress_rules.push(rule.clone());
        } else {
            group.egress_rules.push(rule.clone());
        }
        Ok(rule)
    }

    fn remove_rule(&mut self, id: &str, ingress: bool) -> ComputeResult<()> {
        for group in &mut self.groups {
            let rules = if ingress {
                &mut group.ingress_rules
            } else {
                &mut group.egress_rules
            };
            if let Some(pos) = rules.iter().position(|r| r.id == id) {
                rules.remove(pos);
                return Ok(());
            }
        }
        Err(ComputeError::not_found(format!("rule {}", id)))
    }
}

/// Compute client backed by a list of groups, recording every call
#[derive(Default)]
pub struct FakeCompute {
    inner: Mutex<Inner>,
}

impl FakeCompute {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Seed a group without recording a call
    pub fn add_group(&self, name: &str, account: &str) -> SecurityGroup {
        let mut inner = self.lock();
        let group = SecurityGroup {
            id: inner.next_id("sg"),
            name: name.to_string(),
            account: account.to_string(),
            ..Default::default()
        };
        inner.groups.push(group.clone());
        group
    }

    pub fn group_named(&self, name: &str) -> Option<SecurityGroup> {
        self.lock().groups.iter().find(|g| g.name == name).cloned()
    }

    pub fn remove_group(&self, name: &str) {
        self.lock().groups.retain(|g| g.name != name);
    }

    pub fn clear_rules(&self, name: &str) {
        for group in self.lock().groups.iter_mut().filter(|g| g.name == name) {
            group.ingress_rules.clear();
            group.egress_rules.clear();
        }
    }

    pub fn attach_instances(&self, name: &str, vm_ids: &[&str]) {
        for group in self.lock().groups.iter_mut().filter(|g| g.name == name) {
            group
                .virtual_machine_ids
                .extend(vm_ids.iter().map(|id| id.to_string()));
            group.virtual_machine_count = group.virtual_machine_ids.len() as i64;
        }
    }

    /// Make the next client call fail with the given error
    pub fn fail_next(&self, err: ComputeError) {
        self.lock().fail_next = Some(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl ComputeClient for FakeCompute {
    async fn create_security_group(
        &self,
        profile: &SecurityGroupProfile,
    ) -> ComputeResult<SecurityGroup> {
        let mut inner = self.lock();
        inner.record(Call::CreateSecurityGroup(profile.name.clone()))?;
        let group = SecurityGroup {
            id: inner.next_id("sg"),
            name: profile.name.clone(),
            description: profile.description.clone(),
            account: "acme".to_string(),
            ..Default::default()
        };
        inner.groups.push(group.clone());
        Ok(group)
    }

    async fn get_security_group_by_id(&self, id: &str) -> ComputeResult<SecurityGroup> {
        let mut inner = self.lock();
        inner.record(Call::GetSecurityGroupById(id.to_string()))?;
        inner.group_mut(id).map(|g| g.clone())
    }

    async fn find_security_group_by_name(
        &self,
        name: &str,
    ) -> ComputeResult<Option<SecurityGroup>> {
        let mut inner = self.lock();
        inner.record(Call::FindSecurityGroupByName(name.to_string()))?;
        Ok(inner.groups.iter().find(|g| g.name == name).cloned())
    }

    async fn delete_security_group(&self, name: &str) -> ComputeResult<()> {
        let mut inner = self.lock();
        inner.record(Call::DeleteSecurityGroup(name.to_string()))?;
        let pos = inner
            .groups
            .iter()
            .position(|g| g.name == name)
            .ok_or_else(|| ComputeError::not_found(format!("security group {}", name)))?;
        inner.groups.remove(pos);
        Ok(())
    }

    async fn create_ingress_rule(
        &self,
        profile: &SecurityGroupRuleProfile,
        async_job: bool,
    ) -> ComputeResult<SecurityGroupRule> {
        let mut inner = self.lock();
        inner.record(Call::CreateIngressRule {
            group_id: profile.security_group_id.clone(),
            async_job,
        })?;
        inner.add_rule(profile, true)
    }

    async fn create_egress_rule(
        &self,
        profile: &SecurityGroupRuleProfile,
        async_job: bool,
    ) -> ComputeResult<SecurityGroupRule> {
        let mut inner = self.lock();
        inner.record(Call::CreateEgressRule {
            group_id: profile.security_group_id.clone(),
            async_job,
        })?;
        inner.add_rule(profile, false)
    }

    async fn delete_ingress_rule(&self, id: &str, async_job: bool) -> ComputeResult<()> {
        let mut inner = self.lock();
        inner.record(Call::DeleteIngressRule {
            id: id.to_string(),
            async_job,
        })?;
        inner.remove_rule(id, true)
    }

    async fn delete_egress_rule(&self, id: &str, async_job: bool) -> ComputeResult<()> {
        let mut inner = self.lock();
        inner.record(Call::DeleteEgressRule {
            id: id.to_string(),
            async_job,
        })?;
        inner.remove_rule(id, false)
    }
}
