//! Service configuration loaded from a TOML file.
//!
//! Every section is optional; an empty file yields the defaults below.
//!
//! ```toml
//! [limits]
//! login = 10
//! password = 100
//! address = 1000
//! reset_interval_secs = 60
//!
//! [storage]
//! kind = "memory"
//! url = "sqlite://bruteguard.db"
//!
//! [lists]
//! deny = ["203.0.113.0/24"]
//! allow = ["10.0.0.0/8"]
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::limiter::LimitConfig;
use crate::netlist::{validate_subnet, ListKind};

/// Top-level service configuration.
///
/// Call [`Config::load`] to read and validate a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub lists: ListsConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Io`] if the file cannot be read.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    /// - [`CoreError::InvalidConfig`] if a limit or the interval is zero, or
    ///   a startup list entry is not in CIDR notation.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> CoreResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.limits.validate()?;
        for (kind, subnets) in [
            (ListKind::Deny, &self.lists.deny),
            (ListKind::Allow, &self.lists.allow),
        ] {
            for subnet in subnets {
                validate_subnet(subnet).map_err(|_| {
                    CoreError::InvalidConfig(format!("{kind} list entry is not a subnet: {subnet}"))
                })?;
            }
        }
        Ok(())
    }
}

/// Which [`SubnetStore`](crate::SubnetStore) backs the override lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "sqlite" => Ok(StorageKind::Sqlite),
            other => Err(CoreError::InvalidConfig(format!(
                "unknown storage kind: {other}"
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kind: StorageKind,
    /// sqlx connection URL, only read for [`StorageKind::Sqlite`].
    #[serde(default = "default_storage_url")]
    pub url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            url: default_storage_url(),
        }
    }
}

fn default_storage_url() -> String {
    "sqlite://bruteguard.db".to_string()
}

/// Subnets added to the override lists at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListsConfig {
    #[serde(default)]
    pub deny: Vec<String>,
    #[serde(default)]
    pub allow: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn default_config_limits() {
        let config = Config::default();

        assert_eq!(config.limits.login, 10);
        assert_eq!(config.limits.password, 100);
        assert_eq!(config.limits.address, 1000);
        assert_eq!(config.limits.reset_interval, Duration::from_secs(60));
    }

    #[test]
    fn default_config_storage() {
        let config = Config::default();

        assert_eq!(config.storage.kind, StorageKind::Memory);
        assert_eq!(config.storage.url, "sqlite://bruteguard.db");
        assert!(config.lists.deny.is_empty());
        assert!(config.lists.allow.is_empty());
    }

    #[test]
    fn load_full_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[limits]
login = 5
password = 50
address = 500
reset_interval_secs = 30

[storage]
kind = "sqlite"
url = "sqlite:///var/lib/bruteguard/lists.db"

[lists]
deny = ["203.0.113.0/24"]
allow = ["10.0.0.0/8", "192.168.0.0/16"]
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.limits.login, 5);
        assert_eq!(config.limits.password, 50);
        assert_eq!(config.limits.address, 500);
        assert_eq!(config.limits.reset_interval, Duration::from_secs(30));
        assert_eq!(config.storage.kind, StorageKind::Sqlite);
        assert_eq!(config.storage.url, "sqlite:///var/lib/bruteguard/lists.db");
        assert_eq!(config.lists.deny, vec!["203.0.113.0/24"]);
        assert_eq!(config.lists.allow.len(), 2);
    }

    #[test]
    fn load_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
[limits]
login = 3
"#,
        )
        .unwrap();

        assert_eq!(config.limits.login, 3);
        assert_eq!(config.limits.password, 100);
        assert_eq!(config.storage.kind, StorageKind::Memory);
    }

    #[test]
    fn load_empty_toml_uses_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_nonexistent_returns_io() {
        let tmp = TempDir::new().unwrap();
        let result = Config::load(&tmp.path().join("nonexistent.toml"));
        assert!(matches!(result.unwrap_err(), CoreError::Io(_)));
    }

    #[test]
    fn load_invalid_toml_returns_config_parse() {
        let result = Config::from_toml("this is not valid [[[toml");
        assert!(matches!(result.unwrap_err(), CoreError::ConfigParse(_)));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let result = Config::from_toml("[limits]\npassword = 0\n");
        assert!(matches!(result.unwrap_err(), CoreError::InvalidConfig(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = Config::from_toml("[limits]\nreset_interval_secs = 0\n");
        assert!(matches!(result.unwrap_err(), CoreError::InvalidConfig(_)));
    }

    #[test]
    fn unknown_storage_kind_is_parse_error() {
        let result = Config::from_toml("[storage]\nkind = \"postgres\"\n");
        assert!(matches!(result.unwrap_err(), CoreError::ConfigParse(_)));
    }

    #[test]
    fn list_entry_without_prefix_is_rejected() {
        let result = Config::from_toml("[lists]\nallow = [\"127.0.0.1\"]\n");
        assert!(matches!(result.unwrap_err(), CoreError::InvalidConfig(_)));

        let result = Config::from_toml("[lists]\ndeny = [\"10.0.0.0/8\", \"bogus\"]\n");
        assert!(matches!(result.unwrap_err(), CoreError::InvalidConfig(_)));
    }

    #[test]
    fn list_entries_in_cidr_are_accepted() {
        let config =
            Config::from_toml("[lists]\ndeny = [\"10.0.0.0/8\"]\nallow = [\"2001:db8::/32\"]\n")
                .unwrap();
        assert_eq!(config.lists.deny, vec!["10.0.0.0/8"]);
        assert_eq!(config.lists.allow, vec!["2001:db8::/32"]);
    }

    #[test]
    fn storage_kind_from_str() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!(" SQLite ".parse::<StorageKind>().unwrap(), StorageKind::Sqlite);
        assert!("redis".parse::<StorageKind>().is_err());
        assert_eq!(StorageKind::Sqlite.to_string(), "sqlite");
    }
}
