use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use bruteguard_core::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(flatten)]
    pub service: Config,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// How long shutdown waits for background tasks after the listener drains.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            server: HttpConfig::default(),
            service: Config::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_shutdown_timeout_secs() -> u64 { 3 }
fn default_max_body_bytes() -> usize { 16 * 1024 }

impl ServerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.service.validate()?;
        Ok(config)
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("BRUTEGUARD_CONFIG")
            .map(PathBuf::from)
            .ok();

        let mut config = if let Some(path) = config_path {
            tracing::info!("loading config from {}", path.display());
            let contents = std::fs::read_to_string(&path)?;
            Self::from_toml(&contents)?
        } else {
            ServerConfig::default()
        };

        if let Ok(addr) = std::env::var("BRUTEGUARD_BIND_ADDR") {
            config.bind_addr = addr.parse()?;
        }

        if let Ok(kind) = std::env::var("BRUTEGUARD_STORAGE") {
            config.service.storage.kind = kind.parse()?;
        }
        if let Ok(url) = std::env::var("BRUTEGUARD_DATABASE_URL") {
            config.service.storage.url = url;
        }

        Ok(config)
    }
}
