//! Dashboard Message Types
//!
//! Commands flow from the grid widget and controls into the dashboard;
//! events flow out to whatever presents the rate chart and alert panel.

use serde::{Deserialize, Serialize};

use crate::monitor::{Alert, AlertKind, RateSample};

/// Messages sent into the running dashboard
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Flip the user pause flag
    TogglePause,
    /// Set the user pause flag explicitly
    SetPaused { paused: bool },
    /// The widget scrolled; first and last displayed row indices
    ViewportChanged { first: usize, last: usize },
    /// A column filter popup opened
    FilterOpened,
    /// The column filter popup closed
    FilterClosed,
    /// A cell editor started
    CellEditStarted,
    /// The cell editor stopped
    CellEditStopped,
    /// Stop the dashboard
    Shutdown,
}

/// What toggled the pause flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseSource {
    /// The user pressed pause/resume
    User,
    /// The synthetic gap timer
    Gap,
}

/// Messages published by the running dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// A new chart sample from the rate monitor
    RateSample(RateSample),
    /// An alert was raised (or refreshed)
    AlertRaised { alert: Alert },
    /// Standing alerts of a kind were cleared
    AlertCleared { kind: AlertKind },
    /// The effective pause state changed
    PauseChanged { paused: bool, source: PauseSource },
    /// New moving average from the stream processor
    StreamAverage { average: f64 },
}

impl DashboardEvent {
    /// Short name used as a log field
    pub fn name(&self) -> &'static str {
        match self {
            DashboardEvent::RateSample(_) => "rate_sample",
            DashboardEvent::AlertRaised { .. } => "alert_raised",
            DashboardEvent::AlertCleared { .. } => "alert_cleared",
            DashboardEvent::PauseChanged { .. } => "pause_changed",
            DashboardEvent::StreamAverage { .. } => "stream_average",
        }
    }
}
