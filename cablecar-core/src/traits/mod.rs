//! Hardware abstraction traits
//!
//! These traits define the interface between the sequencing logic
//! and the device that actually moves, waits and signals.

pub mod device;
pub mod motion;
pub mod signal;

pub use device::{DeviceControl, DeviceFault, TimeUnit};
pub use motion::{Direction, Speed};
pub use signal::{InvalidNote, Note, NoteLength, Pitch, Tempo};
