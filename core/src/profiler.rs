//! Callback timing instrumentation
//!
//! Each invocation gets an [`InvocationToken`] that carries its own start
//! instant and accumulated network time. Tokens share nothing, so overlapping
//! invocations of different callbacks cannot disturb each other. A sample is
//! published only when a token is finished, and it replaces the previous
//! sample for that callback in one insert.

use std::fmt::Display;
use std::time::{Duration, Instant};

use chrono::Utc;
use devlens_shared::{CallbackId, InvocationOutcome, NetworkTiming, ProfileSample};
use hashbrown::HashMap;

/// In-flight invocation of one callback.
///
/// Dropping a token without finishing it publishes nothing.
#[derive(Debug)]
#[must_use = "finish the token with end() or fail() to publish a sample"]
pub struct InvocationToken {
    callback_id: CallbackId,
    started: Instant,
    network: Duration,
    upload: u64,
    download: u64,
}

impl InvocationToken {
    pub fn callback_id(&self) -> &CallbackId {
        &self.callback_id
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    /// Add one network round trip to this invocation.
    pub fn record_network_round_trip(&mut self, duration: Duration) {
        self.network = self.network.saturating_add(duration);
    }

    /// Record request/response payload sizes.
    pub fn record_payload(&mut self, upload: u64, download: u64) {
        self.upload = self.upload.saturating_add(upload);
        self.download = self.download.saturating_add(download);
    }

    pub fn network_time(&self) -> Duration {
        self.network
    }
}

/// Live timing samples, one per callback id.
#[derive(Debug, Default)]
pub struct CallbackProfiler {
    samples: HashMap<CallbackId, ProfileSample>,
    calls: HashMap<CallbackId, u64>,
}

impl CallbackProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing an invocation now.
    pub fn begin(&self, callback_id: CallbackId) -> InvocationToken {
        self.begin_at(callback_id, Instant::now())
    }

    /// Start timing an invocation at a known instant.
    pub fn begin_at(&self, callback_id: CallbackId, started: Instant) -> InvocationToken {
        InvocationToken {
            callback_id,
            started,
            network: Duration::ZERO,
            upload: 0,
            download: 0,
        }
    }

    /// Finish a successful invocation now.
    pub fn end(&mut self, token: InvocationToken) -> &ProfileSample {
        self.end_at(token, Instant::now())
    }

    pub fn end_at(&mut self, token: InvocationToken, finished: Instant) -> &ProfileSample {
        self.publish(token, finished, InvocationOutcome::Success)
    }

    /// Finish an invocation whose callback declined to update its outputs.
    pub fn end_no_update(&mut self, token: InvocationToken) -> &ProfileSample {
        self.publish(token, Instant::now(), InvocationOutcome::NoUpdate)
    }

    /// Finish a failed invocation, keeping the timing captured so far.
    pub fn fail(&mut self, token: InvocationToken, reason: impl Display) -> &ProfileSample {
        self.fail_at(token, Instant::now(), reason)
    }

    pub fn fail_at(
        &mut self,
        token: InvocationToken,
        failed: Instant,
        reason: impl Display,
    ) -> &ProfileSample {
        self.publish(token, failed, InvocationOutcome::Failed(reason.to_string()))
    }

    /// Overwrite the live sample for a callback directly.
    pub fn set_sample(&mut self, sample: ProfileSample) {
        self.samples.insert(sample.callback_id.clone(), sample);
    }

    pub fn sample(&self, callback_id: &CallbackId) -> Option<&ProfileSample> {
        self.samples.get(callback_id)
    }

    pub fn sample_mut(&mut self, callback_id: &CallbackId) -> Option<&mut ProfileSample> {
        self.samples.get_mut(callback_id)
    }

    pub fn samples(&self) -> impl Iterator<Item = &ProfileSample> {
        self.samples.values()
    }

    /// Number of finished invocations for a callback
    pub fn calls(&self, callback_id: &CallbackId) -> u64 {
        self.calls.get(callback_id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.calls.clear();
    }

    fn publish(
        &mut self,
        token: InvocationToken,
        finished: Instant,
        outcome: InvocationOutcome,
    ) -> &ProfileSample {
        // A clock that went backwards yields zero rather than a panic.
        let wall = finished.saturating_duration_since(token.started);
        let network = token.network.min(wall);
        let compute = wall - network;

        if outcome.is_failure() {
            tracing::debug!(callback = %token.callback_id, "callback failed, partial timing recorded");
        }

        let sample = ProfileSample {
            callback_id: token.callback_id.clone(),
            compute: millis(compute),
            network: NetworkTiming {
                time: millis(network),
                upload: token.upload,
                download: token.download,
            },
            total: millis(wall),
            timestamp: Utc::now(),
            outcome,
        };

        *self.calls.entry(token.callback_id.clone()).or_insert(0) += 1;
        self.samples.insert(token.callback_id.clone(), sample);
        &self.samples[&token.callback_id]
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CallbackId {
        CallbackId::new(s)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_compute_is_total_minus_network() {
        let mut profiler = CallbackProfiler::new();
        let t0 = Instant::now();

        let mut token = profiler.begin_at(id("totals.children"), t0);
        token.record_network_round_trip(ms(30));
        token.record_network_round_trip(ms(10));
        token.record_payload(120, 480);
        let sample = profiler.end_at(token, t0 + ms(100)).clone();

        assert_eq!(sample.total, 100.0);
        assert_eq!(sample.network.time, 40.0);
        assert_eq!(sample.compute, 60.0);
        assert_eq!(sample.network.upload, 120);
        assert_eq!(sample.network.download, 480);
        assert_eq!(sample.outcome, InvocationOutcome::Success);
        assert_eq!(profiler.calls(&id("totals.children")), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut profiler = CallbackProfiler::new();
        let t0 = Instant::now();

        let first = profiler.begin_at(id("a.b"), t0);
        profiler.end_at(first, t0 + ms(50));
        let second = profiler.begin_at(id("a.b"), t0 + ms(60));
        profiler.end_at(second, t0 + ms(70));

        assert_eq!(profiler.len(), 1);
        assert_eq!(profiler.sample(&id("a.b")).unwrap().total, 10.0);
        assert_eq!(profiler.calls(&id("a.b")), 2);
    }

    #[test]
    fn test_overlapping_tokens_are_independent() {
        let mut profiler = CallbackProfiler::new();
        let t0 = Instant::now();

        let mut a = profiler.begin_at(id("a.out"), t0);
        let mut b = profiler.begin_at(id("b.out"), t0 + ms(5));
        a.record_network_round_trip(ms(20));
        b.record_network_round_trip(ms(2));

        profiler.end_at(b, t0 + ms(15));
        profiler.end_at(a, t0 + ms(40));

        let a = profiler.sample(&id("a.out")).unwrap();
        let b = profiler.sample(&id("b.out")).unwrap();
        assert_eq!((a.total, a.network.time, a.compute), (40.0, 20.0, 20.0));
        assert_eq!((b.total, b.network.time, b.compute), (10.0, 2.0, 8.0));
    }

    #[test]
    fn test_failed_invocation_keeps_partial_timing() {
        let mut profiler = CallbackProfiler::new();
        let t0 = Instant::now();

        let mut token = profiler.begin_at(id("a.b"), t0);
        token.record_network_round_trip(ms(5));
        let sample = profiler.fail_at(token, t0 + ms(12), "division by zero").clone();

        assert_eq!(sample.total, 12.0);
        assert_eq!(sample.compute, 7.0);
        assert_eq!(
            sample.outcome,
            InvocationOutcome::Failed("division by zero".to_string())
        );
    }

    #[test]
    fn test_unfinished_token_publishes_nothing() {
        let profiler = CallbackProfiler::new();
        let token = profiler.begin(id("never.done"));
        drop(token);
        assert!(profiler.is_empty());
        assert_eq!(profiler.calls(&id("never.done")), 0);
    }

    #[test]
    fn test_clock_anomalies_saturate() {
        let mut profiler = CallbackProfiler::new();
        let t0 = Instant::now() + ms(1000);

        // Finished before it started.
        let token = profiler.begin_at(id("a.b"), t0);
        let sample = profiler.end_at(token, t0 - ms(10)).clone();
        assert_eq!((sample.total, sample.compute, sample.network.time), (0.0, 0.0, 0.0));

        // Network longer than the whole invocation.
        let mut token = profiler.begin_at(id("a.b"), t0);
        token.record_network_round_trip(ms(500));
        let sample = profiler.end_at(token, t0 + ms(100)).clone();
        assert_eq!((sample.total, sample.network.time, sample.compute), (100.0, 100.0, 0.0));
    }

    #[test]
    fn test_set_sample_and_clear() {
        let mut profiler = CallbackProfiler::new();
        profiler.set_sample(ProfileSample::fixed(id("a.b"), 44.0, 33.0, 77.0));
        assert_eq!(profiler.sample(&id("a.b")).unwrap().compute, 44.0);
        // Pinned samples are not invocations.
        assert_eq!(profiler.calls(&id("a.b")), 0);

        profiler.clear();
        assert!(profiler.is_empty());
    }

    #[test]
    fn test_no_update_outcome() {
        let mut profiler = CallbackProfiler::new();
        let token = profiler.begin(id("a.b"));
        let sample = profiler.end_no_update(token);
        assert_eq!(sample.outcome, InvocationOutcome::NoUpdate);
    }
}
