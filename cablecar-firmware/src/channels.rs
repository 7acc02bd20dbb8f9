//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use cablecar_core::timeline::TimelineEntry;

/// Channel capacity for timeline entries
const TIMELINE_CHANNEL_SIZE: usize = 16;

/// Timestamped run events waiting to go out over UART
pub static TIMELINE_CHANNEL: TimelineChannel = Channel::new();

pub type TimelineChannel = Channel<CriticalSectionRawMutex, TimelineEntry, TIMELINE_CHANNEL_SIZE>;
