use std::sync::Arc;

use bruteguard_core::Authorizer;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub authorizer: Authorizer,
}
