//! Grid Widget Boundary
//!
//! Everything the dashboard exchanges with the external grid widget:
//!
//! - **columns**: Static column definitions and cell formatting
//! - **viewport**: Visible-range tracking and slicing
//! - **sink**: The `GridSink` trait, widget interaction flags, and a
//!   headless in-memory grid

pub mod columns;
pub mod sink;
pub mod viewport;

pub use columns::{format_risk, CellFormat, ColumnDef, COLUMNS};
pub use sink::{GridSink, GridState, HeadlessGrid};
pub use viewport::{VisibleRange, VisibleRangeTracker};
