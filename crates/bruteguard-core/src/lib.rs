//! Bruteguard core library: admission control for login attempts.
//!
//! `bruteguard-core` decides, per authentication attempt, whether to allow
//! or deny it. It is independent of any wire protocol so that the HTTP
//! front end (`bruteguard-web`) or any other adapter can share the same
//! decision logic.
//!
//! # Modules
//!
//! - [`limiter`] — Fixed-window counters by login, password and address: [`AttemptLimiter`].
//! - [`netlist`] — CIDR deny/allow lists with exact-string entries: [`SubnetList`].
//! - [`store`] — Pluggable list storage ([`SubnetStore`]), in memory or SQLite.
//! - [`authorizer`] — Deny > allow > limiter precedence: [`Authorizer`].
//! - [`config`] — TOML-based service configuration.
//! - [`error`] — Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod attempt;
pub mod authorizer;
pub mod config;
pub mod error;
pub mod limiter;
pub mod netlist;
pub mod store;

pub use attempt::AuthAttempt;
pub use authorizer::Authorizer;
pub use config::settings::{Config, ListsConfig, StorageConfig, StorageKind};
pub use error::{CoreError, CoreResult};
pub use limiter::{AttemptLimiter, LimitConfig};
pub use netlist::{validate_subnet, ListKind, SubnetList};
pub use store::{connect_store, seed_store, MemoryStore, SqliteStore, SubnetStore};
