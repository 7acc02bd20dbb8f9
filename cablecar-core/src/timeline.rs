//! Run event timeline
//!
//! The sequencer reports every phase change and motion to a
//! [`RunObserver`]. Stamped with the time they happened, these events form
//! the timeline ("actuator moved by step N at time T") that the sensor log
//! is later aligned against.

use crate::state::Phase;
use crate::traits::DeviceFault;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound of an encoded [`TimelineEntry`] frame, COBS overhead included
pub const MAX_ENTRY_FRAME_LEN: usize = 32;

/// Something that happened during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunEvent {
    /// A new phase started
    PhaseEntered(Phase),
    /// Step `step` (1-based) finished driving; actuator is `position` units from the origin
    StepDriven { step: u32, position: u32 },
    /// A full dwell finished with the actuator `position` units from the origin
    DwellFinished { position: u32 },
    /// The rewind move finished
    Rewound { distance: u32 },
    /// The device failed; the run stops here
    Faulted { phase: Phase, fault: DeviceFault },
}

/// Receives run events as they happen
pub trait RunObserver {
    fn on_event(&mut self, event: RunEvent);
}

/// Observer that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_event(&mut self, _event: RunEvent) {}
}

impl<F: FnMut(RunEvent)> RunObserver for F {
    fn on_event(&mut self, event: RunEvent) {
        self(event)
    }
}

/// A run event stamped with milliseconds since boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimelineEntry {
    pub at_ms: u64,
    pub event: RunEvent,
}

#[cfg(feature = "serde")]
impl TimelineEntry {
    /// Encode as a zero-terminated COBS frame
    pub fn encode_cobs<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], postcard::Error> {
        postcard::to_slice_cobs(self, buf)
    }

    /// Decode a COBS frame produced by [`TimelineEntry::encode_cobs`]
    ///
    /// The frame is decoded in place.
    pub fn decode_cobs(frame: &mut [u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes_cobs(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "serde")]
    #[test]
    fn test_frame_fits_bound() {
        let worst = [
            TimelineEntry {
                at_ms: u64::MAX,
                event: RunEvent::StepDriven {
                    step: u32::MAX,
                    position: u32::MAX,
                },
            },
            TimelineEntry {
                at_ms: u64::MAX,
                event: RunEvent::Faulted {
                    phase: Phase::ZeroDwell,
                    fault: DeviceFault::UnsupportedMode,
                },
            },
        ];

        for entry in worst {
            let mut buf = [0u8; MAX_ENTRY_FRAME_LEN];
            let frame = entry.encode_cobs(&mut buf).unwrap();
            assert_eq!(frame.last(), Some(&0));

            let mut owned = [0u8; MAX_ENTRY_FRAME_LEN];
            let len = frame.len();
            owned[..len].copy_from_slice(frame);
            assert_eq!(TimelineEntry::decode_cobs(&mut owned[..len]).unwrap(), entry);
        }
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = 0u32;
        {
            let mut observer = |event: RunEvent| {
                if let RunEvent::StepDriven { step, .. } = event {
                    seen = step;
                }
            };
            observer.on_event(RunEvent::StepDriven {
                step: 4,
                position: 8,
            });
        }
        assert_eq!(seen, 4);
    }
}
