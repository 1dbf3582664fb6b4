//! The authentication attempt handed to the authorizer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One authentication request: login, password and source address.
///
/// Attempts carry no identity; two attempts with equal fields are
/// interchangeable. The address is accepted on the wire as either `ip`
/// or `address`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthAttempt {
    pub login: String,
    pub password: String,
    #[serde(rename = "ip", alias = "address")]
    pub address: String,
}

impl AuthAttempt {
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            address: address.into(),
        }
    }
}

// Keep passwords out of logs and panic messages.
impl fmt::Debug for AuthAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthAttempt")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("address", &self.address)
            .finish()
    }
}
