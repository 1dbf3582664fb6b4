//! Allow/deny decision for a single authentication attempt.
//!
//! Precedence is fixed: deny list, then allow list, then the limiter. An
//! address present in both lists is denied; an allow-listed address never
//! touches the limiter's counters.

use std::sync::Arc;

use crate::attempt::AuthAttempt;
use crate::error::CoreResult;
use crate::limiter::AttemptLimiter;
use crate::netlist::ListKind;
use crate::store::SubnetStore;

/// Composes the override lists and the limiter into one decision.
#[derive(Clone)]
pub struct Authorizer {
    limiter: Arc<AttemptLimiter>,
    store: Arc<dyn SubnetStore>,
}

impl Authorizer {
    pub fn new(limiter: Arc<AttemptLimiter>, store: Arc<dyn SubnetStore>) -> Self {
        Self { limiter, store }
    }

    pub fn limiter(&self) -> &Arc<AttemptLimiter> {
        &self.limiter
    }

    /// Returns `true` to allow `attempt`, `false` to deny it.
    ///
    /// # Errors
    ///
    /// Propagates list lookup failures (bad address, corrupt entry, backend
    /// I/O). The limiter is not consulted in that case.
    pub async fn authorize(&self, attempt: &AuthAttempt) -> CoreResult<bool> {
        if self.store.contains(ListKind::Deny, &attempt.address).await? {
            tracing::info!(address = %attempt.address, "attempt denied by deny list");
            return Ok(false);
        }

        if self.store.contains(ListKind::Allow, &attempt.address).await? {
            tracing::info!(address = %attempt.address, "attempt allowed by allow list");
            return Ok(true);
        }

        let allowed = self.limiter.check(attempt);
        tracing::debug!(
            login = %attempt.login,
            address = %attempt.address,
            allowed,
            "limiter decision"
        );
        Ok(allowed)
    }

    /// Clears the limiter counters for the attempt's login, password and
    /// address. The lists are untouched.
    pub fn reset(&self, attempt: &AuthAttempt) {
        self.limiter.reset(attempt);
        tracing::info!(login = %attempt.login, address = %attempt.address, "limiter reset");
    }

    pub async fn add_to_deny_list(&self, subnet: &str) -> CoreResult<()> {
        self.add(ListKind::Deny, subnet).await
    }

    pub async fn remove_from_deny_list(&self, subnet: &str) -> CoreResult<()> {
        self.remove(ListKind::Deny, subnet).await
    }

    pub async fn is_address_denied(&self, address: &str) -> CoreResult<bool> {
        self.store.contains(ListKind::Deny, address).await
    }

    pub async fn add_to_allow_list(&self, subnet: &str) -> CoreResult<()> {
        self.add(ListKind::Allow, subnet).await
    }

    pub async fn remove_from_allow_list(&self, subnet: &str) -> CoreResult<()> {
        self.remove(ListKind::Allow, subnet).await
    }

    pub async fn is_address_allowed(&self, address: &str) -> CoreResult<bool> {
        self.store.contains(ListKind::Allow, address).await
    }

    /// Adds `subnet` to the given list.
    pub async fn add(&self, list: ListKind, subnet: &str) -> CoreResult<()> {
        self.store.add(list, subnet).await?;
        tracing::info!(list = %list, subnet, "subnet added");
        Ok(())
    }

    /// Removes `subnet` from the given list.
    pub async fn remove(&self, list: ListKind, subnet: &str) -> CoreResult<()> {
        self.store.remove(list, subnet).await?;
        tracing::info!(list = %list, subnet, "subnet removed");
        Ok(())
    }

    pub async fn contains(&self, list: ListKind, address: &str) -> CoreResult<bool> {
        self.store.contains(list, address).await
    }

    pub async fn list_entries(&self, list: ListKind) -> CoreResult<Vec<String>> {
        self.store.list(list).await
    }
}
