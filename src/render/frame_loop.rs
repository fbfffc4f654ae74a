//! Rate-bounded render loop
//!
//! Each scheduling tick either does one frame of work or skips. A frame
//! pulls the next dataset, pushes only the visible slice into the grid, and
//! adds the frame's volume to a counter that is emitted on flush.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use super::latency::LatencyWindow;
use crate::dataset::DatasetCycler;
use crate::events::UpdateEmitter;
use crate::grid::{GridSink, GridState, VisibleRange};

/// Which volume a frame contributes to the emitted update count
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateBasis {
    /// Full dataset length: how much data arrived
    #[default]
    Dataset,
    /// Visible slice length: how much data was rendered
    Visible,
}

/// Render loop settings
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Minimum time between executed frames
    pub frame_interval: Duration,
    /// Slack on the frame interval, so a tick that lands just short of it
    /// still runs; usually half the scheduling tick
    pub frame_tolerance: Duration,
    /// Minimum time between counter flushes in `flush_if_due`
    pub flush_interval: Duration,
    /// Number of frame durations in the latency window
    pub latency_window: usize,
    pub rate_basis: RateBasis,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(66),
            frame_tolerance: Duration::ZERO,
            flush_interval: Duration::from_millis(1000),
            latency_window: super::latency::DEFAULT_LATENCY_WINDOW,
            rate_basis: RateBasis::Dataset,
        }
    }
}

/// Conditions that must hold off frame work without stopping the loop
#[derive(Debug, Clone, Copy, Default)]
pub struct Suppression {
    pub paused: bool,
    pub grid: GridState,
}

impl Suppression {
    pub fn is_active(&self) -> bool {
        self.paused || self.grid.is_busy()
    }
}

/// Result of a single scheduling tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame ran
    Rendered {
        /// Rows handed to the grid
        applied: usize,
        /// Volume added to the update counter
        counted: u64,
    },
    /// A frame ran but the cycler had nothing to give
    Empty,
    /// Too soon after the previous frame
    Throttled,
    /// Paused, or the widget is busy
    Suppressed,
}

/// Frame counters, for snapshots
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_rendered: u64,
    pub frames_empty: u64,
    pub frames_throttled: u64,
    pub frames_suppressed: u64,
    /// Total rows handed to the grid
    pub rows_applied: u64,
}

/// Drives the grid at a bounded frame rate
pub struct RenderLoop {
    config: RenderConfig,
    cycler: DatasetCycler,
    last_frame: Option<Instant>,
    last_flush: Instant,
    /// Volume accumulated since the last flush
    pending: u64,
    latency: LatencyWindow,
    stats: RenderStats,
}

impl RenderLoop {
    /// Create a render loop pulling from `cycler`
    pub fn new(config: RenderConfig, cycler: DatasetCycler, now: Instant) -> Self {
        let latency = LatencyWindow::new(config.latency_window);
        Self {
            config,
            cycler,
            last_frame: None,
            last_flush: now,
            pending: 0,
            latency,
            stats: RenderStats::default(),
        }
    }

    /// Load the first dataset into the grid in full
    pub fn prime<G: GridSink + ?Sized>(&mut self, grid: &mut G) {
        let dataset = self.cycler.advance();
        grid.load(&dataset);
        tracing::info!(rows = dataset.len(), "Grid primed with initial dataset");
    }

    /// Run one scheduling tick
    pub fn tick<G: GridSink + ?Sized>(
        &mut self,
        now: Instant,
        suppression: Suppression,
        range: VisibleRange,
        grid: &mut G,
    ) -> FrameOutcome {
        if let Some(last) = self.last_frame {
            let elapsed = now.saturating_duration_since(last);
            if elapsed + self.config.frame_tolerance < self.config.frame_interval {
                self.stats.frames_throttled += 1;
                return FrameOutcome::Throttled;
            }
        }

        if suppression.is_active() {
            self.stats.frames_suppressed += 1;
            return FrameOutcome::Suppressed;
        }

        self.last_frame = Some(now);

        let dataset = self.cycler.advance();
        if dataset.is_empty() {
            self.stats.frames_empty += 1;
            return FrameOutcome::Empty;
        }

        let started = std::time::Instant::now();
        let visible = range.slice(&dataset);
        grid.apply_update(visible);
        self.latency.record(started.elapsed());

        let counted = match self.config.rate_basis {
            RateBasis::Dataset => dataset.len() as u64,
            RateBasis::Visible => visible.len() as u64,
        };
        self.pending += counted;

        self.stats.frames_rendered += 1;
        self.stats.rows_applied += visible.len() as u64;

        tracing::trace!(
            applied = visible.len(),
            counted,
            start = range.start,
            end = range.end,
            "Frame rendered"
        );

        FrameOutcome::Rendered {
            applied: visible.len(),
            counted,
        }
    }

    /// Emit the accumulated count and reset it
    pub fn flush(&mut self, now: Instant, emitter: &UpdateEmitter) -> u64 {
        let count = std::mem::take(&mut self.pending);
        self.last_flush = now;
        emitter.emit(count);
        count
    }

    /// Flush only if the flush interval has passed since the last flush
    pub fn flush_if_due(&mut self, now: Instant, emitter: &UpdateEmitter) -> Option<u64> {
        if now.saturating_duration_since(self.last_flush) < self.config.flush_interval {
            return None;
        }
        Some(self.flush(now, emitter))
    }

    /// Volume accumulated since the last flush
    pub fn pending(&self) -> u64 {
        self.pending
    }

    /// Moving-average duration of the slice+handoff step
    pub fn average_latency(&self) -> Duration {
        self.latency.average()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}
