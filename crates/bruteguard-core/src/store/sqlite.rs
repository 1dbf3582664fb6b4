//! SQLite-backed subnet store.
//!
//! Each list is a single-column table keyed by the subnet string, so
//! uniqueness is enforced by the primary key. Membership tests load the
//! list and run the same fail-fast scan as [`SubnetList`](crate::SubnetList).

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::{CoreError, CoreResult};
use crate::netlist::{find_match, parse_address, ListKind};

use super::SubnetStore;

const MAX_CONNECTIONS: u32 = 5;

pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    /// Connects using an sqlx URL such as `sqlite://bruteguard.db` or
    /// `sqlite::memory:`. The database file is created if missing.
    pub async fn connect(url: &str) -> CoreResult<Self> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        if url.contains(":memory:") {
            // every pooled connection would otherwise get its own empty database
            Self::with_options(opts, 1).await
        } else {
            Self::with_options(opts.journal_mode(SqliteJournalMode::Wal), MAX_CONNECTIONS).await
        }
    }

    async fn with_options(opts: SqliteConnectOptions, max_connections: u32) -> CoreResult<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .inspect_err(|e| tracing::error!("failed to open subnet database: {e}"))?;

        init_db(&db).await?;
        Ok(Self { db })
    }
}

fn table(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Deny => "deny_list",
        ListKind::Allow => "allow_list",
    }
}

async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;
    for kind in [ListKind::Deny, ListKind::Allow] {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                subnet text NOT NULL,
                created_at INTEGER DEFAULT (unixepoch()),
                PRIMARY KEY(subnet)
            )",
            table(kind)
        ))
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[async_trait]
impl SubnetStore for SqliteStore {
    async fn add(&self, list: ListKind, subnet: &str) -> CoreResult<()> {
        sqlx::query(&format!("INSERT INTO {} (subnet) VALUES (?)", table(list)))
            .bind(subnet)
            .execute(&self.db)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    CoreError::AlreadyExists(subnet.to_string())
                }
                other => {
                    tracing::error!(list = %list, "failed to add subnet: {other}");
                    other.into()
                }
            })?;
        Ok(())
    }

    async fn remove(&self, list: ListKind, subnet: &str) -> CoreResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE subnet = ?", table(list)))
            .bind(subnet)
            .execute(&self.db)
            .await
            .inspect_err(|e| tracing::error!(list = %list, "failed to remove subnet: {e}"))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(subnet.to_string()));
        }
        Ok(())
    }

    async fn contains(&self, list: ListKind, address: &str) -> CoreResult<bool> {
        let address = parse_address(address)?;
        let entries: Vec<String> =
            sqlx::query_scalar(&format!("SELECT subnet FROM {}", table(list)))
                .fetch_all(&self.db)
                .await?;
        Ok(find_match(entries.iter().map(String::as_str), address)?.is_some())
    }

    async fn list(&self, list: ListKind) -> CoreResult<Vec<String>> {
        let entries = sqlx::query_scalar(&format!(
            "SELECT subnet FROM {} ORDER BY subnet",
            table(list)
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(entries)
    }
}
