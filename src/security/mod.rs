//! Security features.
//!
//! The in-memory security log, injectable clocks, and the caller-side
//! moderation gate.

mod audit;
mod clock;
mod gate;

pub use audit::SecurityLog;
pub use clock::{Clock, ManualClock, SystemClock};
pub use gate::{ContentGate, GateDecision};
