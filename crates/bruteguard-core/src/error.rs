//! Error types for `bruteguard-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. The limiter itself never
//! fails; errors come from the subnet lists, their stores and configuration.

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The subnet is already present in the target list.
    #[error("subnet already exists: {0}")]
    AlreadyExists(String),

    /// The subnet is not present in the target list.
    #[error("subnet not found: {0}")]
    NotFound(String),

    /// A membership test was given something that is not an IP address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// An entry does not parse as a CIDR subnet.
    #[error("invalid subnet: {0}")]
    InvalidSubnet(String),

    /// Configuration values violate their constraints.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// The persistence backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        CoreError::Backend(e.to_string())
    }
}

/// Convenience alias used throughout `bruteguard-core`.
pub type CoreResult<T> = Result<T, CoreError>;
