//! Rate monitor and alert policy
//!
//! Counts delivered through the update emitter accumulate between ticks.
//! Each tick turns the accumulator into an updates-per-second rate, appends
//! a chart sample, and raises or clears alerts.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::alerts::{Alert, AlertBook, AlertKind};
use crate::events::{Subscription, UpdateEmitter};

/// Message for a standing no-updates alert
pub const GAP_MESSAGE: &str = "Message gap detected";

/// Rate monitor settings
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Tick cadence
    pub interval: Duration,
    /// Rates strictly above this raise a high-rate alert
    pub high_rate_threshold: f64,
    /// Alert list capacity
    pub max_alerts: usize,
    /// Chart samples retained
    pub max_samples: usize,
    /// Ticks closer together than this are skipped instead of divided
    pub min_sample_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            high_rate_threshold: 1000.0,
            max_alerts: 3,
            max_samples: 20,
            min_sample_interval: Duration::from_millis(50),
        }
    }
}

/// One point on the rate chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateSample {
    /// Updates per second; zero while paused
    pub rate: f64,
    pub paused: bool,
    /// Local wall-clock time for the chart axis (HH:MM:SS)
    pub time: String,
}

/// Alert change produced by a tick
#[derive(Debug, Clone, PartialEq)]
pub enum AlertAction {
    Raised(Alert),
    Cleared(AlertKind),
    Unchanged,
}

/// Result of a completed monitor tick
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorTick {
    /// Measured rate, before the pause override
    pub rate: f64,
    pub sample: RateSample,
    pub action: AlertAction,
}

/// Convert `count` updates over `elapsed` into updates per second
///
/// Returns `None` when `elapsed` is shorter than `min_elapsed` (or zero), so
/// a degenerate interval never produces a non-finite rate.
pub fn compute_rate(count: u64, elapsed: Duration, min_elapsed: Duration) -> Option<f64> {
    if elapsed.is_zero() || elapsed < min_elapsed {
        return None;
    }
    Some(count as f64 / elapsed.as_secs_f64())
}

/// State shared with the emitter listener
#[derive(Debug, Default)]
struct Shared {
    accumulator: AtomicU64,
    paused: AtomicBool,
}

/// Turns emitted update counts into a rate, chart samples, and alerts
pub struct RateMonitor {
    config: MonitorConfig,
    shared: Arc<Shared>,
    subscription: Option<Subscription>,
    last_tick: Instant,
    samples: VecDeque<RateSample>,
    alerts: AlertBook,
    current_rate: f64,
}

impl RateMonitor {
    pub fn new(config: MonitorConfig, now: Instant) -> Self {
        let samples = VecDeque::with_capacity(config.max_samples);
        let alerts = AlertBook::new(config.max_alerts);
        Self {
            config,
            shared: Arc::new(Shared::default()),
            subscription: None,
            last_tick: now,
            samples,
            alerts,
            current_rate: 0.0,
        }
    }

    /// Start listening to `emitter`; counts emitted while paused are dropped
    pub fn attach(&mut self, emitter: &UpdateEmitter) {
        self.detach();

        let shared = Arc::clone(&self.shared);
        self.subscription = Some(emitter.subscribe(move |count| {
            if !shared.paused.load(Ordering::Acquire) {
                shared.accumulator.fetch_add(count, Ordering::AcqRel);
            }
        }));
    }

    /// Stop listening to the emitter
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    /// Add `count` to the accumulator directly
    pub fn record(&self, count: u64) {
        if !self.is_paused() {
            self.shared.accumulator.fetch_add(count, Ordering::AcqRel);
        }
    }

    pub fn set_paused(&self, paused: bool) {
        self.shared.paused.store(paused, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    /// Restart measurement from `now`, discarding anything accumulated
    pub fn reset(&mut self, now: Instant) {
        self.shared.accumulator.store(0, Ordering::Release);
        self.last_tick = now;
    }

    /// Updates received since the last completed tick
    pub fn pending(&self) -> u64 {
        self.shared.accumulator.load(Ordering::Acquire)
    }

    /// Run one tick
    ///
    /// Returns `None` when the tick came too soon after the previous one;
    /// the accumulator is kept for the next tick in that case.
    pub fn tick(&mut self, now: Instant) -> Option<MonitorTick> {
        let elapsed = now.saturating_duration_since(self.last_tick);
        let count = self.pending();

        let Some(rate) = compute_rate(count, elapsed, self.config.min_sample_interval) else {
            tracing::debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                "Monitor tick too close to previous, skipping sample"
            );
            return None;
        };

        self.shared.accumulator.fetch_sub(count, Ordering::AcqRel);
        self.last_tick = now;

        let paused = self.is_paused();
        self.current_rate = if paused { 0.0 } else { rate };

        let sample = RateSample {
            rate: self.current_rate,
            paused,
            time: Local::now().format("%H:%M:%S").to_string(),
        };
        if self.samples.len() >= self.config.max_samples.max(1) {
            self.samples.pop_front();
        }
        self.samples.push_back(sample.clone());

        let action = self.classify(rate, paused);

        Some(MonitorTick {
            rate,
            sample,
            action,
        })
    }

    fn classify(&mut self, rate: f64, paused: bool) -> AlertAction {
        if rate == 0.0 || paused {
            let alert = self.alerts.raise(AlertKind::NoUpdates, GAP_MESSAGE);
            tracing::warn!(paused, "No updates received");
            AlertAction::Raised(alert)
        } else if rate > self.config.high_rate_threshold {
            let alert = self.alerts.raise(
                AlertKind::HighRate,
                format!("Message rate exceeded: {:.0} msg/s", rate),
            );
            tracing::warn!(
                rate = rate.round(),
                threshold = self.config.high_rate_threshold,
                "Update rate above threshold"
            );
            AlertAction::Raised(alert)
        } else if self.alerts.clear(AlertKind::NoUpdates) {
            tracing::info!(rate = rate.round(), "Updates resumed");
            AlertAction::Cleared(AlertKind::NoUpdates)
        } else {
            AlertAction::Unchanged
        }
    }

    /// Rate reported by the last completed tick (zero while paused)
    pub fn current_rate(&self) -> f64 {
        self.current_rate
    }

    /// Chart samples, oldest first
    pub fn samples(&self) -> &VecDeque<RateSample> {
        &self.samples
    }

    /// Standing alerts, newest first
    pub fn alerts(&self) -> &[Alert] {
        self.alerts.alerts()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}

impl Drop for RateMonitor {
    fn drop(&mut self) {
        self.detach();
    }
}
