//! Alert types and the bounded, newest-first alert list

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

/// Kind of alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Update rate above the configured threshold
    HighRate,
    /// No updates arrived during the last tick (or updates are paused)
    NoUpdates,
    /// Stream moving average above its upper bound
    AboveBound,
    /// Stream moving average below its lower bound
    BelowBound,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::HighRate => write!(f, "High Rate"),
            AlertKind::NoUpdates => write!(f, "No Messages"),
            AlertKind::AboveBound => write!(f, "High Bound"),
            AlertKind::BelowBound => write!(f, "Low Bound"),
        }
    }
}

/// A raised alert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    /// Creation time in Unix milliseconds, unique within its book
    pub id: u64,
    pub kind: AlertKind,
    pub message: String,
    /// Local wall-clock time for display (HH:MM:SS)
    pub timestamp: String,
}

/// Newest-first list of alerts with a fixed capacity
#[derive(Debug, Clone)]
pub struct AlertBook {
    alerts: Vec<Alert>,
    capacity: usize,
    last_id: u64,
}

impl AlertBook {
    /// Create a book holding at most `capacity` alerts (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            alerts: Vec::with_capacity(capacity + 1),
            capacity,
            last_id: 0,
        }
    }

    /// Raise an alert, replacing any standing alert of the same kind
    pub fn raise(&mut self, kind: AlertKind, message: impl Into<String>) -> Alert {
        self.alerts.retain(|a| a.kind != kind);
        self.push(kind, message)
    }

    /// Prepend an alert without de-duplication
    pub fn push(&mut self, kind: AlertKind, message: impl Into<String>) -> Alert {
        let alert = Alert {
            id: self.next_id(),
            kind,
            message: message.into(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        };

        self.alerts.insert(0, alert.clone());
        self.alerts.truncate(self.capacity);
        alert
    }

    /// Remove every alert of `kind`; returns whether any were removed
    pub fn clear(&mut self, kind: AlertKind) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.kind != kind);
        self.alerts.len() != before
    }

    /// Alerts, newest first
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Number of standing alerts of `kind`
    pub fn count(&self, kind: AlertKind) -> usize {
        self.alerts.iter().filter(|a| a.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Millisecond timestamp, bumped when two alerts land in the same ms
    fn next_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }
}
