//! Dashboard Eventing
//!
//! - **emitter**: Synchronous pub/sub for update counts (render loop →
//!   rate monitor)
//! - **messages**: Inbound commands and outbound dashboard events
//!
//! The emitter is an ordinary value owned by the dashboard and lent to the
//! components that publish or listen; nothing here is process-global.

mod emitter;
mod messages;

pub use emitter::{ListenerId, Subscription, UpdateEmitter};
pub use messages::{Command, DashboardEvent, PauseSource};
