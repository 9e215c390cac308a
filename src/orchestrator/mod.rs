//! Multi-repository operation orchestrator.
//!
//! Schedules one logical operation per repository concurrently, lets a
//! repository's operation decompose into strictly sequential sub-steps, and
//! renders a continuously updating multi-line view while aggregating
//! per-unit outcomes.

pub mod engine;
pub mod render;
pub mod state;

pub use engine::Orchestrator;
pub use render::fmt_duration;
pub use state::{OpFuture, Step, Unit, UnitStatus, boxed_op};
