//! Dashboard state shared with presentation layers

use serde::Serialize;

use crate::events::PauseSource;
use crate::grid::VisibleRange;
use crate::monitor::{Alert, RateSample};
use crate::render::RenderStats;

/// Pause flags from the two sources that can hold off updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PauseState {
    /// Set by the pause/resume control
    pub user: bool,
    /// Set while a synthetic gap is held
    pub gap: bool,
}

impl PauseState {
    pub fn is_paused(&self) -> bool {
        self.user || self.gap
    }

    /// Set the flag for `source`; returns whether the effective state changed
    pub fn set(&mut self, source: PauseSource, paused: bool) -> bool {
        let before = self.is_paused();
        match source {
            PauseSource::User => self.user = paused,
            PauseSource::Gap => self.gap = paused,
        }
        before != self.is_paused()
    }
}

/// Point-in-time view of everything the dashboard displays
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    /// Updates per second from the last monitor tick (zero while paused)
    pub current_rate: f64,
    pub paused: bool,
    pub pause: PauseState,
    /// Rate chart, oldest first
    pub samples: Vec<RateSample>,
    /// Rate alerts, newest first
    pub alerts: Vec<Alert>,
    /// Moving average from the stream panel, when enabled
    pub stream_average: Option<f64>,
    pub stream_alerts: Vec<Alert>,
    /// Moving-average frame latency in milliseconds
    pub average_latency_ms: f64,
    pub render: RenderStats,
    pub visible: VisibleRange,
}
