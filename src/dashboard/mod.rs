//! Dashboard Driver
//!
//! Wires the render loop, rate monitor, gap timer and stream panel to a grid
//! and runs them from one task.
//!
//! ```text
//!   Command ──mpsc──▶ ┌────────────┐ ──apply_update──▶ GridSink
//!                     │ Dashboard  │
//!   frame / monitor / │  (select!) │ ──broadcast──▶ DashboardEvent
//!   gap / stream tick │            │ ──watch──────▶ DashboardSnapshot
//!                     └────────────┘
//! ```

mod error;
mod scheduler;
mod state;

pub use error::{DashboardError, DashboardResult};
pub use scheduler::{Dashboard, DashboardHandle};
pub use state::{DashboardSnapshot, PauseState};
