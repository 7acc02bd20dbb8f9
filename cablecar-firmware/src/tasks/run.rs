//! Calibration run task
//!
//! Executes the configured run once. Every run event is stamped with the
//! time since boot, logged, and queued for the timeline UART.

use defmt::*;
use embassy_time::{Instant, Timer};

use cablecar_core::config::SamplerConfig;
use cablecar_core::scheduler::Sequencer;
use cablecar_core::timeline::{RunEvent, TimelineEntry};

use crate::board::BoardDevice;
use crate::channels::TIMELINE_CHANNEL;

#[embassy_executor::task]
pub async fn run_task(mut device: BoardDevice, config: SamplerConfig) {
    info!("Run task started");

    let sequencer = match Sequencer::new(&mut device, config.run, &config.ceiling) {
        Ok(sequencer) => sequencer,
        Err(e) => {
            error!("Run rejected, no hardware command issued: {}", e);
            return;
        }
    };

    let plan = *sequencer.plan();
    info!(
        "{} steps of {}, dwell {} s as {} sub-waits (longest {} ms, ceiling {} s)",
        config.run.step_count,
        config.run.step_distance,
        plan.dwell_s(),
        plan.sub_wait_count(),
        plan.longest_sub_wait_ticks(),
        config.ceiling.max_s()
    );
    info!(
        "Run will spend {} s waiting",
        sequencer.nominal_wait_ticks() / 1000
    );

    let mut observer = |event: RunEvent| {
        let entry = TimelineEntry {
            at_ms: Instant::now().as_millis(),
            event,
        };
        info!("[{} ms] {}", entry.at_ms, event);
        if TIMELINE_CHANNEL.try_send(entry).is_err() {
            warn!("Timeline queue full, entry dropped");
        }
    };

    match sequencer.run(&mut observer).await {
        Ok(summary) => info!(
            "Run complete: {} steps, {} drives, {} waits",
            summary.steps_sampled, summary.drive_commands, summary.wait_commands
        ),
        Err(e) => error!("Run aborted: {}", e),
    }

    // Let the last timeline frames drain before going idle
    Timer::after_millis(100).await;
    info!("Run task finished");
}
