//! Pluggable storage for the deny and allow lists.
//!
//! The authorizer only talks to [`SubnetStore`]; whether the lists live in
//! process memory ([`MemoryStore`]) or in SQLite ([`SqliteStore`]) is
//! chosen once at startup through [`connect_store`].

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::settings::{ListsConfig, StorageConfig, StorageKind};
use crate::error::{CoreError, CoreResult};
use crate::netlist::{validate_subnet, ListKind};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Backend contract for the two override lists.
///
/// Each list is independent: an operation on [`ListKind::Deny`] never
/// reads or writes the allow list and vice versa.
#[async_trait]
pub trait SubnetStore: Send + Sync {
    /// Adds `subnet` to `list`; [`CoreError::AlreadyExists`] on duplicates.
    async fn add(&self, list: ListKind, subnet: &str) -> CoreResult<()>;

    /// Removes `subnet` from `list`; [`CoreError::NotFound`] if absent.
    async fn remove(&self, list: ListKind, subnet: &str) -> CoreResult<()>;

    /// Whether any subnet in `list` contains `address`.
    async fn contains(&self, list: ListKind, address: &str) -> CoreResult<bool>;

    /// Sorted subnet strings currently in `list`.
    async fn list(&self, list: ListKind) -> CoreResult<Vec<String>>;
}

/// Opens the backend selected by `config`.
///
/// # Errors
///
/// [`CoreError::Backend`] if the SQLite database cannot be opened or its
/// schema cannot be created. Callers treat this as fatal.
pub async fn connect_store(config: &StorageConfig) -> CoreResult<Arc<dyn SubnetStore>> {
    match config.kind {
        StorageKind::Memory => {
            tracing::info!("using in-memory subnet store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageKind::Sqlite => {
            tracing::info!(url = %config.url, "using sqlite subnet store");
            Ok(Arc::new(SqliteStore::connect(&config.url).await?))
        }
    }
}

/// Adds the configured initial entries to `store`.
///
/// Entries already present (persisted by an earlier run) are skipped.
/// Returns the number of entries actually added.
///
/// # Errors
///
/// [`CoreError::InvalidSubnet`] if any entry is not in CIDR notation; the
/// store is left untouched in that case.
pub async fn seed_store(store: &dyn SubnetStore, lists: &ListsConfig) -> CoreResult<usize> {
    let seeds = [(ListKind::Deny, &lists.deny), (ListKind::Allow, &lists.allow)];
    for subnet in seeds.iter().flat_map(|(_, subnets)| subnets.iter()) {
        validate_subnet(subnet)?;
    }

    let mut added = 0;
    for (kind, subnets) in seeds {
        for subnet in subnets {
            match store.add(kind, subnet).await {
                Ok(()) => added += 1,
                Err(CoreError::AlreadyExists(_)) => {
                    tracing::debug!(list = %kind, subnet = %subnet, "seed entry already present");
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seed_adds_configured_entries() {
        let store = MemoryStore::new();
        let lists = ListsConfig {
            deny: vec!["10.0.0.0/8".to_string()],
            allow: vec!["192.168.0.0/16".to_string(), "172.16.0.0/12".to_string()],
        };

        let added = seed_store(&store, &lists).await.unwrap();

        assert_eq!(added, 3);
        assert!(store.contains(ListKind::Deny, "10.1.2.3").await.unwrap());
        assert!(store.contains(ListKind::Allow, "192.168.1.1").await.unwrap());
        assert!(!store.contains(ListKind::Allow, "10.1.2.3").await.unwrap());
    }

    #[tokio::test]
    async fn seed_skips_existing_entries() {
        let store = MemoryStore::new();
        store.add(ListKind::Deny, "10.0.0.0/8").await.unwrap();
        let lists = ListsConfig {
            deny: vec!["10.0.0.0/8".to_string(), "11.0.0.0/8".to_string()],
            allow: Vec::new(),
        };

        assert_eq!(seed_store(&store, &lists).await.unwrap(), 1);
        assert_eq!(store.list(ListKind::Deny).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn seed_rejects_bare_address_before_adding() {
        let store = MemoryStore::new();
        let lists = ListsConfig {
            deny: vec!["10.0.0.0/8".to_string()],
            allow: vec!["127.0.0.1".to_string()],
        };

        let result = seed_store(&store, &lists).await;

        assert!(matches!(result, Err(CoreError::InvalidSubnet(_))));
        assert!(store.list(ListKind::Deny).await.unwrap().is_empty());
        assert!(!store.contains(ListKind::Allow, "8.8.8.8").await.unwrap());
    }

    #[tokio::test]
    async fn connect_memory_store() {
        let config = StorageConfig::default();
        let store = connect_store(&config).await.unwrap();
        store.add(ListKind::Allow, "127.0.0.0/8").await.unwrap();
        assert!(store.contains(ListKind::Allow, "127.0.0.1").await.unwrap());
    }
}
