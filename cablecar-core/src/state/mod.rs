//! State machine for run execution
//!
//! The phase sequence is explicit, finite and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{Phase, RunState};
