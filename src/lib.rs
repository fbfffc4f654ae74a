//! # Gridpulse
//!
//! Bounded-rate grid updates with rate measurement and alerting. Streams
//! rotating synthetic datasets into a virtualized grid at a capped frame
//! rate, touching only the rows on screen, while a monitor turns the update
//! volume into a per-second rate chart and a short alert panel.
//!
//! ## Modules
//!
//! - [`dataset`]: Synthetic rows and the dataset cycler
//! - [`grid`]: Grid boundary, column layout and visible-range tracking
//! - [`events`]: Update-count emitter plus dashboard commands and events
//! - [`render`]: Frame-capped render loop
//! - [`monitor`]: Rate monitor, alert policy and synthetic gaps
//! - [`stream`]: Moving-average stream panel with bound alerts
//! - [`dashboard`]: Single-task driver tying it all together
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridpulse::{Command, Config, Dashboard, HeadlessGrid};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dashboard = Dashboard::new(Config::default(), HeadlessGrid::new())?;
//!     let handle = dashboard.spawn();
//!
//!     // Scroll the grid; only rows 100..=149 receive updates
//!     handle.send(Command::ViewportChanged { first: 100, last: 149 })?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!
//!     let snapshot = handle.snapshot();
//!     println!("{:.0} updates/s, {} alerts", snapshot.current_rate, snapshot.alerts.len());
//!
//!     let grid = handle.shutdown().await?;
//!     println!("{} grid transactions", grid.transactions);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod events;
pub mod grid;
pub mod monitor;
pub mod render;
pub mod stream;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError};

pub use dashboard::{Dashboard, DashboardError, DashboardHandle, DashboardResult, DashboardSnapshot};

pub use dataset::{Dataset, DatasetCycler, Location, Row, Strategy};

pub use events::{Command, DashboardEvent, PauseSource, Subscription, UpdateEmitter};

pub use grid::{GridSink, GridState, HeadlessGrid, VisibleRange, VisibleRangeTracker};

pub use monitor::{Alert, AlertKind, MonitorConfig, RateMonitor, RateSample};

pub use render::{FrameOutcome, RateBasis, RenderConfig, RenderLoop};

pub use stream::{StreamConfig, StreamProcessor};
