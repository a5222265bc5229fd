//! Connection retry policy with configurable backoff.

use crate::error::{CacheError, CacheResult};
use rand::Rng;
use scoring_log::{error, info};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Delay between connection attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Constant delay between attempts.
    Constant(Duration),
    /// `initial` before the first retry, then a delay multiplied after each
    /// attempt plus a random extra of up to `jitter`, capped at `max`.
    ExponentialWithJitter {
        /// Delay before the first retry.
        initial: Duration,
        /// Multiplier (typically 2.0).
        multiplier: f64,
        /// Upper bound of the random extra.
        jitter: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Create constant backoff.
    pub fn constant(delay: Duration) -> Self {
        Self::Constant(delay)
    }

    /// Doubling backoff with up to one second of jitter.
    pub fn exponential_with_jitter(initial: Duration) -> Self {
        Self::ExponentialWithJitter {
            initial,
            multiplier: 2.0,
            jitter: Duration::from_secs(1),
            max: Duration::from_secs(60),
        }
    }

    /// Set maximum delay.
    pub fn with_max(self, max: Duration) -> Self {
        match self {
            Self::ExponentialWithJitter {
                initial,
                multiplier,
                jitter,
                ..
            } => Self::ExponentialWithJitter {
                initial,
                multiplier,
                jitter,
                max,
            },
            other => other,
        }
    }

    /// Calculate delay for a given retry (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::Constant(d) => *d,
            Self::ExponentialWithJitter {
                initial,
                multiplier,
                jitter,
                max,
            } => {
                if attempt == 0 {
                    return (*initial).min(*max);
                }
                let factor = multiplier.powi(attempt as i32);
                let base = initial.as_secs_f64() * factor;
                let extra = jitter.as_secs_f64() * rand::rng().random::<f64>();
                Duration::from_secs_f64((base + extra).min(max.as_secs_f64()))
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::exponential_with_jitter(Duration::from_secs(1))
    }
}

/// How a store (re)establishes its connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Retry at all after the first failure.
    pub enabled: bool,
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay between attempts.
    pub backoff: BackoffStrategy,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 5,
            backoff: BackoffStrategy::default(),
        }
    }
}

impl ReconnectPolicy {
    /// Policy that gives up after the first failure.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Build a policy from the service settings.
    ///
    /// `smart_delay` selects doubling with jitter instead of a constant delay.
    pub fn from_settings(enabled: bool, max_retries: u32, timeout: Duration, smart_delay: bool) -> Self {
        let backoff = if smart_delay {
            BackoffStrategy::exponential_with_jitter(timeout)
        } else {
            BackoffStrategy::constant(timeout)
        };

        Self {
            enabled,
            max_retries,
            backoff,
        }
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        if self.enabled { self.max_retries + 1 } else { 1 }
    }

    /// Run `connect` until it succeeds or the attempt budget is spent.
    pub async fn connect<T, E, F, Fut>(&self, mut connect: F) -> CacheResult<T>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            info!(target: "scoring::cache", "connecting to the store, attempt {}/{}", attempt, max_attempts);

            let err = match connect().await {
                Ok(connection) => return Ok(connection),
                Err(err) => err,
            };

            error!(target: "scoring::cache", "store connection failed: {}", err);

            if attempt >= max_attempts {
                return Err(CacheError::ReconnectExhausted {
                    attempts: attempt,
                    last_error: err.to_string(),
                });
            }

            let delay = self.backoff.delay_for_attempt(attempt - 1);
            error!(
                target: "scoring::cache",
                "waiting for reconnection after {:.2} seconds", delay.as_secs_f64()
            );
            tokio::time::sleep(delay).await;
        }
    }
}
