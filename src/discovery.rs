//! Retrying discovery orchestrator: drives the scanner and factory as
//! one unit of work per attempt under a bounded exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::adapter::{AdapterFactory, QueueHandle};
use crate::config::BoardConfig;
use crate::error::{BoardError, BoardResult};
use crate::registry::HandleRegistry;
use crate::scanner::QueueScanner;
use crate::store::{KeyLookup, StoreClient};

/// Retry timing for the discovery loop.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the second attempt.
    pub starting_delay: Duration,
    /// Cap on the computed delay. `None` means uncapped.
    pub max_delay: Option<Duration>,
    /// Growth factor applied per attempt.
    pub multiplier: f64,
    /// Attempt budget before discovery is declared exhausted.
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            starting_delay: Duration::from_millis(500),
            max_delay: None,
            multiplier: 2.0,
            max_attempts: 10,
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait before the given 1-based attempt, without jitter.
    ///
    /// The first attempt starts immediately; attempt `n + 1` waits
    /// `starting_delay * multiplier^(n - 1)`, capped at `max_delay`.
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt <= 1 {
            return None;
        }
        let exponent = attempt.saturating_sub(2);
        let millis = self.starting_delay.as_millis() as f64 * self.multiplier.powi(exponent as i32);
        let mut delay = Duration::from_millis(millis as u64);
        if let Some(max) = self.max_delay {
            delay = delay.min(max);
        }
        Some(delay)
    }
}

/// Orchestrates scan + build attempts and publishes the result.
///
/// Owns its collaborators explicitly; the shared store client and the
/// registry are created at process start and passed in at construction.
pub struct DiscoveryService {
    scanner: QueueScanner,
    factory: AdapterFactory,
    registry: Arc<HandleRegistry>,
    prefixes: Vec<String>,
    policy: BackoffPolicy,
}

impl DiscoveryService {
    /// Wire up a discovery service over the shared store client.
    pub fn new<S>(store: Arc<S>, registry: Arc<HandleRegistry>, config: &BoardConfig) -> Self
    where
        S: StoreClient + 'static,
    {
        let lookup: Arc<dyn KeyLookup> = store.clone();
        Self {
            scanner: QueueScanner::new(lookup),
            factory: AdapterFactory::new(config.protocol, config.connection.clone(), store),
            registry,
            prefixes: config.prefixes(),
            policy: config.backoff.clone(),
        }
    }

    /// Registry this service publishes to.
    pub fn registry(&self) -> &Arc<HandleRegistry> {
        &self.registry
    }

    /// Run discovery until it succeeds or the attempt budget is spent.
    ///
    /// On success the handle list replaces the registry contents
    /// wholesale and is returned. On exhaustion the registry keeps
    /// whatever it held before and `DiscoveryExhausted` is returned.
    pub async fn discover(&self) -> BoardResult<Vec<QueueHandle>> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            if let Some(delay) = self.policy.delay_before(attempt) {
                debug!(attempt, delay_ms = delay.as_millis() as u64, "waiting before retry");
                tokio::time::sleep(delay).await;
            }

            debug!(attempt, "starting discovery attempt");
            match self.attempt().await {
                Ok(handles) => {
                    self.registry.set_queues(handles.clone());
                    info!(queues = handles.len(), attempts = attempt, "queue discovery succeeded");
                    return Ok(handles);
                }
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    warn!(attempt, error = %err, "discovery attempt failed, retrying");
                    attempt += 1;
                }
                Err(err) => {
                    return Err(BoardError::DiscoveryExhausted {
                        attempts: attempt,
                        last_error: err.to_string(),
                    });
                }
            }
        }
    }

    /// Startup entry point: run one full discovery cycle and report a
    /// terminal failure without propagating it.
    ///
    /// The host process keeps serving with an empty or stale registry
    /// until something re-invokes discovery.
    pub async fn run(&self) {
        match self.discover().await {
            Ok(handles) => {
                info!(queues = handles.len(), "queue discovery complete");
            }
            Err(err) => {
                error!(error = %err, "queue discovery failed; dashboard will show no queues");
            }
        }
    }

    /// One scan + build attempt.
    async fn attempt(&self) -> BoardResult<Vec<QueueHandle>> {
        let entries = self.scanner.scan(&self.prefixes).await?;
        self.factory.build(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_delay_before_the_first_attempt() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_before(1), None);
    }

    #[test]
    fn delays_double_from_the_starting_delay() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_before(2), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_before(3), Some(Duration::from_millis(1000)));
        assert_eq!(policy.delay_before(4), Some(Duration::from_millis(2000)));
        assert_eq!(policy.delay_before(5), Some(Duration::from_millis(4000)));
    }

    #[test]
    fn delays_are_capped_at_the_max_delay() {
        let policy = BackoffPolicy {
            max_delay: Some(Duration::from_millis(1500)),
            ..BackoffPolicy::default()
        };
        assert_eq!(policy.delay_before(3), Some(Duration::from_millis(1000)));
        assert_eq!(policy.delay_before(4), Some(Duration::from_millis(1500)));
        assert_eq!(policy.delay_before(10), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn fractional_multipliers_are_honored() {
        let policy = BackoffPolicy {
            starting_delay: Duration::from_millis(100),
            multiplier: 1.5,
            ..BackoffPolicy::default()
        };
        assert_eq!(policy.delay_before(2), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_before(3), Some(Duration::from_millis(150)));
        assert_eq!(policy.delay_before(4), Some(Duration::from_millis(225)));
    }
}
