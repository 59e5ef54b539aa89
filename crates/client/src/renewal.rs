//! Vault token renewal and its background schedule.
//!
//! Responsibilities:
//! - Perform one renew-self call and classify the outcome (`VaultTokenRenewer`).
//! - Run renewals at a fixed rate on a single background task per client
//!   (`TokenRenewalScheduler`).
//!
//! Does NOT handle:
//! - Deciding when to arm the schedule (see `StaticTokenAuth` in `auth.rs`).
//! - Obtaining the Vault token itself (it comes from settings).
//!
//! Invariants:
//! - `arm()` schedules at most one task per scheduler, even when called concurrently.
//! - The first renewal fires one period after arming, then every period.
//!   Missed ticks are skipped, not bursted.
//! - A tick that finds the previous renewal still in flight is skipped.
//! - Renewal failures are logged and counted, never propagated, and never
//!   disarm the schedule.
//! - `stop()` or drop aborts the schedule and any in-flight renewal.

use async_trait::async_trait;
use cfgserver_config::constants::DEFAULT_VAULT_TOKEN_RENEW_RATE_MS;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::auth::{AuthHeaders, BearerAuth};
use crate::endpoints::{renew_self, renew_self_request, vault_renew_uri};
use crate::metrics::{MetricsCollector, RenewalOutcome};
use crate::redact::redact_token;
use crate::tracing::inject_trace_context;

/// A single token renewal attempt.
#[async_trait]
pub trait TokenRenewer: Send + Sync + 'static {
    async fn renew(&self) -> RenewalOutcome;
}

/// Renews a Vault token through the Config Server's renew-self endpoint.
pub struct VaultTokenRenewer {
    http: Client,
    renew_uri: String,
    token: SecretString,
    ttl_ms: u64,
    bearer: Option<Arc<BearerAuth>>,
    metrics: MetricsCollector,
}

impl fmt::Debug for VaultTokenRenewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultTokenRenewer")
            .field("renew_uri", &self.renew_uri)
            .field("token", &redact_token(self.token.expose_secret()))
            .field("ttl_ms", &self.ttl_ms)
            .field("bearer", &self.bearer.is_some())
            .finish()
    }
}

impl VaultTokenRenewer {
    pub fn new(http: Client, base_uri: &str, token: SecretString, ttl_ms: u64) -> Self {
        Self {
            http,
            renew_uri: vault_renew_uri(base_uri),
            token,
            ttl_ms,
            bearer: None,
            metrics: MetricsCollector::new(),
        }
    }

    /// Attach an OAuth bearer token to every renewal request.
    pub fn with_bearer(mut self, bearer: Arc<BearerAuth>) -> Self {
        self.bearer = Some(bearer);
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn renew_uri(&self) -> &str {
        &self.renew_uri
    }

    /// Perform one renewal. Never fails; the outcome is logged and counted.
    pub async fn renew_once(&self) -> RenewalOutcome {
        let redacted = redact_token(self.token.expose_secret());
        info!(
            uri = %self.renew_uri,
            token = %redacted,
            increment_secs = self.ttl_ms / 1000,
            "Renewing Vault token"
        );

        let mut builder = renew_self_request(&self.http, &self.renew_uri, &self.token, self.ttl_ms);
        if let Some(bearer) = &self.bearer {
            builder = bearer.attach(builder).await;
        }
        let builder = inject_trace_context(builder);

        let outcome = match renew_self(builder).await {
            Ok(StatusCode::OK) => RenewalOutcome::Renewed,
            Ok(status) => {
                warn!(
                    uri = %self.renew_uri,
                    token = %redacted,
                    status = status.as_u16(),
                    "Vault token renewal rejected"
                );
                RenewalOutcome::Rejected(status.as_u16())
            }
            Err(e) => {
                error!(
                    uri = %self.renew_uri,
                    token = %redacted,
                    error = %e,
                    "Vault token renewal failed"
                );
                RenewalOutcome::Failed
            }
        };

        self.metrics.record_renewal(outcome);
        outcome
    }
}

#[async_trait]
impl TokenRenewer for VaultTokenRenewer {
    async fn renew(&self) -> RenewalOutcome {
        self.renew_once().await
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Fixed-rate background renewal, armed at most once.
pub struct TokenRenewalScheduler {
    renewer: Arc<dyn TokenRenewer>,
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl fmt::Debug for TokenRenewalScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRenewalScheduler")
            .field("period", &self.period)
            .field("armed", &self.is_armed())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl TokenRenewalScheduler {
    /// Create an idle scheduler. Nothing runs until [`arm`](Self::arm).
    ///
    /// A zero `period` falls back to the default renew rate.
    pub fn new(renewer: Arc<dyn TokenRenewer>, period: Duration) -> Self {
        let period = if period.is_zero() {
            warn!(
                default_ms = DEFAULT_VAULT_TOKEN_RENEW_RATE_MS,
                "Zero token renew rate, using default"
            );
            Duration::from_millis(DEFAULT_VAULT_TOKEN_RENEW_RATE_MS)
        } else {
            period
        };
        Self {
            renewer,
            period,
            task: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start the schedule if it is not running yet.
    ///
    /// Returns `true` only for the call that actually scheduled the task.
    /// Must be called from within a Tokio runtime; otherwise nothing is
    /// scheduled and an error is logged.
    pub fn arm(&self) -> bool {
        let mut task = self.lock_task();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) || self.is_stopped() {
            return false;
        }

        let Ok(runtime) = Handle::try_current() else {
            error!("Cannot schedule token renewal outside a Tokio runtime");
            return false;
        };

        let renewer = Arc::clone(&self.renewer);
        *task = Some(runtime.spawn(run_schedule(renewer, self.period)));
        info!(
            period_ms = self.period.as_millis() as u64,
            "Scheduled Vault token renewal"
        );
        true
    }

    /// Whether a schedule is running.
    pub fn is_armed(&self) -> bool {
        !self.is_stopped()
            && self
                .lock_task()
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Stop the schedule and abort any in-flight renewal. Later `arm()` calls do nothing.
    pub fn stop(&self) {
        let mut task = self.lock_task();
        self.stopped.store(true, Ordering::Release);
        if let Some(handle) = task.take() {
            handle.abort();
            info!("Stopped Vault token renewal");
        }
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TokenRenewalScheduler {
    fn drop(&mut self) {
        let task = self.task.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }
}

async fn run_schedule(renewer: Arc<dyn TokenRenewer>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let in_flight = Arc::new(tokio::sync::Mutex::new(()));
    // Dropped (and so aborted) together with this future when the schedule stops.
    let mut _current: Option<AbortOnDrop> = None;

    loop {
        ticker.tick().await;

        let Ok(guard) = Arc::clone(&in_flight).try_lock_owned() else {
            debug!("Previous token renewal still in flight, skipping tick");
            continue;
        };

        let renewer = Arc::clone(&renewer);
        _current = Some(AbortOnDrop(tokio::spawn(async move {
            let _guard = guard;
            renewer.renew().await;
        })));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Counts renewals; each takes `delay` of (paused) time.
    struct CountingRenewer {
        calls: AtomicUsize,
        completed: AtomicUsize,
        delay: Duration,
    }

    impl CountingRenewer {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                delay,
            })
        }
    }

    #[async_trait]
    impl TokenRenewer for CountingRenewer {
        async fn renew(&self) -> RenewalOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            RenewalOutcome::Renewed
        }
    }

    async fn advance(duration: Duration) {
        tokio::time::advance(duration).await;
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fire_after_one_period() {
        let renewer = CountingRenewer::new(Duration::ZERO);
        let scheduler = TokenRenewalScheduler::new(renewer.clone(), Duration::from_secs(60));
        assert!(scheduler.arm());

        advance(Duration::from_secs(59)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 0);

        advance(Duration::from_secs(1)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(60)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_is_idempotent() {
        let renewer = CountingRenewer::new(Duration::ZERO);
        let scheduler = TokenRenewalScheduler::new(renewer.clone(), Duration::from_secs(10));
        assert!(scheduler.arm());
        assert!(!scheduler.arm());
        assert!(!scheduler.arm());
        assert!(scheduler.is_armed());

        advance(Duration::from_secs(10)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_uses_default_rate() {
        let renewer = CountingRenewer::new(Duration::ZERO);
        let scheduler = TokenRenewalScheduler::new(renewer.clone(), Duration::ZERO);
        assert_eq!(
            scheduler.period(),
            Duration::from_millis(DEFAULT_VAULT_TOKEN_RENEW_RATE_MS)
        );
        assert!(scheduler.arm());

        advance(scheduler.period()).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 1);
        assert!(scheduler.is_armed());
    }

    #[test]
    fn test_not_armed_once_schedule_task_is_gone() {
        let renewer = CountingRenewer::new(Duration::ZERO);
        let scheduler = TokenRenewalScheduler::new(renewer, Duration::from_secs(10));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        runtime.block_on(async {
            assert!(scheduler.arm());
            assert!(scheduler.is_armed());
        });

        // Shutting the runtime down cancels the schedule task.
        drop(runtime);
        assert!(!scheduler.is_armed());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_arm_schedules_once() {
        let renewer = CountingRenewer::new(Duration::ZERO);
        let scheduler = Arc::new(TokenRenewalScheduler::new(
            renewer,
            Duration::from_secs(3600),
        ));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let scheduler = Arc::clone(&scheduler);
                tokio::spawn(async move { scheduler.arm() })
            })
            .collect();

        let mut armed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                armed += 1;
            }
        }
        assert_eq!(armed, 1);
        assert!(scheduler.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_tick_is_skipped() {
        let renewer = CountingRenewer::new(Duration::from_secs(25));
        let scheduler = TokenRenewalScheduler::new(renewer.clone(), Duration::from_secs(10));
        scheduler.arm();

        // t=10: first renewal starts and runs until t=35.
        advance(Duration::from_secs(10)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 1);

        // t=20 and t=30: still in flight, both ticks skipped.
        advance(Duration::from_secs(10)).await;
        advance(Duration::from_secs(10)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 1);

        // t=36: first renewal finished at t=35.
        advance(Duration::from_secs(6)).await;
        assert_eq!(renewer.completed.load(Ordering::SeqCst), 1);

        // t=40: next tick starts a new renewal.
        advance(Duration::from_secs(4)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_renewals() {
        let renewer = CountingRenewer::new(Duration::from_secs(5));
        let scheduler = TokenRenewalScheduler::new(renewer.clone(), Duration::from_secs(10));
        scheduler.arm();

        advance(Duration::from_secs(10)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 1);

        scheduler.stop();
        assert!(!scheduler.is_armed());
        assert!(!scheduler.arm());

        advance(Duration::from_secs(60)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 1);
        // The in-flight renewal was aborted with the schedule.
        assert_eq!(renewer.completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_schedule() {
        let renewer = CountingRenewer::new(Duration::ZERO);
        let scheduler = TokenRenewalScheduler::new(renewer.clone(), Duration::from_secs(10));
        scheduler.arm();
        drop(scheduler);

        advance(Duration::from_secs(30)).await;
        assert_eq!(renewer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_arm_outside_runtime_does_not_panic() {
        let renewer = CountingRenewer::new(Duration::ZERO);
        let scheduler = TokenRenewalScheduler::new(renewer, Duration::from_secs(10));
        assert!(!scheduler.arm());
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn test_renewer_debug_redacts_token() {
        let renewer = VaultTokenRenewer::new(
            Client::new(),
            "http://localhost:9999/",
            SecretString::new("hvs.0123456789abcdef".into()),
            300_000,
        );
        let debug = format!("{renewer:?}");
        assert!(!debug.contains("0123456789"));
        assert!(debug.contains("hvs.[*]cdef"));
        assert_eq!(
            renewer.renew_uri(),
            "http://localhost:9999/vault/v1/auth/token/renew-self"
        );
    }
}
