//! Rate Monitoring & Alerting
//!
//! - **rate**: Per-tick rate computation, chart samples, alert policy
//! - **alerts**: Alert types and the bounded alert list
//! - **gaps**: Pluggable synthetic pause injection
//!
//! # Alert policy
//!
//! | Condition                  | Effect                         |
//! |----------------------------|--------------------------------|
//! | rate == 0 or paused        | raise `NoUpdates`              |
//! | rate > high-rate threshold | raise `HighRate`               |
//! | otherwise                  | clear `NoUpdates`              |
//!
//! Raising replaces any standing alert of the same kind, so a sustained
//! condition shows one alert carrying the latest value.

pub mod alerts;
pub mod gaps;
pub mod rate;

pub use alerts::{Alert, AlertBook, AlertKind};
pub use gaps::{GapPlan, GapStrategy, GapTimer, GapTransition, NoGaps, RandomGaps};
pub use rate::{
    compute_rate, AlertAction, MonitorConfig, MonitorTick, RateMonitor, RateSample, GAP_MESSAGE,
};
