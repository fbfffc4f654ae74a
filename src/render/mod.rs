//! Rate-Bounded Rendering
//!
//! - **frame_loop**: The render loop, its throttle and suppression rules,
//!   and the per-flush update counter
//! - **latency**: Rolling window of frame durations
//!
//! # Frame path
//!
//! ```text
//! tick → throttle? → suppressed? → cycler.advance() → visible slice
//!      → GridSink::apply_update → latency window → pending count
//! flush → UpdateEmitter::emit(pending) → pending = 0
//! ```

pub mod frame_loop;
pub mod latency;

pub use frame_loop::{
    FrameOutcome, RateBasis, RenderConfig, RenderLoop, RenderStats, Suppression,
};
pub use latency::{LatencyWindow, DEFAULT_LATENCY_WINDOW};
