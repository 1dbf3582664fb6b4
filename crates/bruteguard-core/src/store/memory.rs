use async_trait::async_trait;

use crate::error::CoreResult;
use crate::netlist::{ListKind, SubnetList};

use super::SubnetStore;

/// Process-local store: two independent [`SubnetList`]s.
///
/// Nothing survives a restart; initial entries come from configuration.
#[derive(Debug, Default)]
pub struct MemoryStore {
    deny: SubnetList,
    allow: SubnetList,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list_for(&self, kind: ListKind) -> &SubnetList {
        match kind {
            ListKind::Deny => &self.deny,
            ListKind::Allow => &self.allow,
        }
    }
}

#[async_trait]
impl SubnetStore for MemoryStore {
    async fn add(&self, list: ListKind, subnet: &str) -> CoreResult<()> {
        self.list_for(list).add(subnet)
    }

    async fn remove(&self, list: ListKind, subnet: &str) -> CoreResult<()> {
        self.list_for(list).remove(subnet)
    }

    async fn contains(&self, list: ListKind, address: &str) -> CoreResult<bool> {
        self.list_for(list).contains(address)
    }

    async fn list(&self, list: ListKind) -> CoreResult<Vec<String>> {
        Ok(self.list_for(list).entries())
    }
}
