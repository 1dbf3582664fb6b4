//! Service configuration.
//!
//! Limits, storage backend selection and the initial override lists
//! ([`settings::Config`]) are read from a TOML file once at startup.

pub mod settings;
