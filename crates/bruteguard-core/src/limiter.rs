//! Fixed-window attempt limiter.
//!
//! [`AttemptLimiter`] keeps three independent counters (by login, by
//! password, by source address) and admits an attempt only while every
//! dimension is below its configured limit. All counters are cleared
//! wholesale every [`LimitConfig::reset_interval`] by a background task;
//! there is no gradual decay.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::attempt::AuthAttempt;
use crate::error::{CoreError, CoreResult};

/// Per-dimension limits and the flush interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitConfig {
    #[serde(default = "default_login_limit")]
    pub login: u64,
    #[serde(default = "default_password_limit")]
    pub password: u64,
    #[serde(default = "default_address_limit")]
    pub address: u64,
    #[serde(
        rename = "reset_interval_secs",
        default = "default_reset_interval",
        with = "duration_secs"
    )]
    pub reset_interval: Duration,
}

impl LimitConfig {
    /// Builds a validated config.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidConfig`] if any limit or the interval is zero.
    pub fn new(
        login: u64,
        password: u64,
        address: u64,
        reset_interval: Duration,
    ) -> CoreResult<Self> {
        let config = Self {
            login,
            password,
            address,
            reset_interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every limit is positive and the interval is non-zero.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, value) in [
            ("login", self.login),
            ("password", self.password),
            ("address", self.address),
        ] {
            if value == 0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} limit must be positive"
                )));
            }
        }
        if self.reset_interval.is_zero() {
            return Err(CoreError::InvalidConfig(
                "reset interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            login: default_login_limit(),
            password: default_password_limit(),
            address: default_address_limit(),
            reset_interval: default_reset_interval(),
        }
    }
}

fn default_login_limit() -> u64 {
    10
}

fn default_password_limit() -> u64 {
    100
}

fn default_address_limit() -> u64 {
    1000
}

fn default_reset_interval() -> Duration {
    Duration::from_secs(60)
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Which counter rejected an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Login,
    Password,
    Address,
}

impl Dimension {
    fn as_str(self) -> &'static str {
        match self {
            Dimension::Login => "login",
            Dimension::Password => "password",
            Dimension::Address => "address",
        }
    }
}

#[derive(Debug)]
struct Bucket {
    limit: u64,
    counts: HashMap<String, u64>,
}

impl Bucket {
    fn new(limit: u64) -> Self {
        Self {
            limit,
            counts: HashMap::new(),
        }
    }

    /// Increments `key` if it is below the limit. Returns whether it was.
    fn admit(&mut self, key: &str) -> bool {
        match self.counts.get_mut(key) {
            Some(count) if *count >= self.limit => false,
            Some(count) => {
                *count += 1;
                true
            }
            None => {
                self.counts.insert(key.to_owned(), 1);
                true
            }
        }
    }

    fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
struct Counters {
    login: Bucket,
    password: Bucket,
    address: Bucket,
}

impl Counters {
    fn new(limits: &LimitConfig) -> Self {
        Self {
            login: Bucket::new(limits.login),
            password: Bucket::new(limits.password),
            address: Bucket::new(limits.address),
        }
    }

    fn clear(&mut self) {
        self.login.counts = HashMap::new();
        self.password.counts = HashMap::new();
        self.address.counts = HashMap::new();
    }
}

/// Three-dimensional fixed-window counter guarded by a single lock.
///
/// The lock spans a whole [`check`](Self::check), so concurrent callers and
/// the periodic flush never observe counters mid-decision.
#[derive(Debug)]
pub struct AttemptLimiter {
    config: LimitConfig,
    counters: Mutex<Counters>,
}

impl AttemptLimiter {
    /// # Errors
    ///
    /// [`CoreError::InvalidConfig`] if `config` fails [`LimitConfig::validate`].
    pub fn new(config: LimitConfig) -> CoreResult<Self> {
        config.validate()?;
        let counters = Mutex::new(Counters::new(&config));
        Ok(Self { config, counters })
    }

    // The counters hold no invariant a panicking holder could break halfway
    // through a single increment, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits or rejects `attempt`, incrementing counters on the way.
    ///
    /// Dimensions are evaluated login, password, address; the first one at
    /// its limit rejects the attempt and later dimensions are left untouched.
    pub fn check(&self, attempt: &AuthAttempt) -> bool {
        let mut counters = self.lock();
        let rejected = if !counters.login.admit(&attempt.login) {
            Some(Dimension::Login)
        } else if !counters.password.admit(&attempt.password) {
            Some(Dimension::Password)
        } else if !counters.address.admit(&attempt.address) {
            Some(Dimension::Address)
        } else {
            None
        };
        drop(counters);

        match rejected {
            Some(dimension) => {
                tracing::debug!(
                    login = %attempt.login,
                    address = %attempt.address,
                    dimension = dimension.as_str(),
                    "attempt rejected by limiter"
                );
                false
            }
            None => true,
        }
    }

    /// Forgets the login, password and address of `attempt`.
    pub fn reset(&self, attempt: &AuthAttempt) {
        let mut counters = self.lock();
        counters.login.counts.remove(&attempt.login);
        counters.password.counts.remove(&attempt.password);
        counters.address.counts.remove(&attempt.address);
    }

    /// Clears every counter in all three dimensions.
    pub fn flush(&self) {
        self.lock().clear();
        tracing::debug!("limiter counters flushed");
    }

    /// Current `(login, password, address)` counts for `attempt`.
    pub fn counts(&self, attempt: &AuthAttempt) -> (u64, u64, u64) {
        let counters = self.lock();
        (
            counters.login.count(&attempt.login),
            counters.password.count(&attempt.password),
            counters.address.count(&attempt.address),
        )
    }

    /// Starts the periodic flush on the current tokio runtime.
    ///
    /// The first flush happens one interval after the call. The task exits
    /// once `token` is cancelled; a tick that races the cancellation is
    /// dropped.
    pub fn spawn_flusher(self: &Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        let period = self.config.reset_interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(interval = ?period, "limiter flusher started");

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => limiter.flush(),
                }
            }

            tracing::info!("limiter flusher stopped");
        })
    }
}
