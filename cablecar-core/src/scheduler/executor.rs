//! Run sequencer
//!
//! Drives the device through one calibration run: settle countdown,
//! sampling steps with a full dwell after each, a single rewind to the
//! origin, and a final dwell at the origin.
//!
//! Everything that can be wrong with the configuration is caught when the
//! sequencer is built, before the first hardware command. After that the
//! only failure is a device fault, which ends the run where it happened.

use super::dwell::{round_ticks, DwellPlan, WaitCeiling};
use crate::config::{ConfigurationError, RunConfig, SamplerConfig};
use crate::state::{Event, Phase, RunState};
use crate::timeline::{RunEvent, RunObserver};
use crate::traits::{DeviceControl, DeviceFault, Direction, TimeUnit};

/// Why a run did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunError {
    /// Rejected before any hardware command was issued
    Configuration(ConfigurationError),
    /// The device failed; the run stopped in `phase` after `step` steps
    Device {
        phase: Phase,
        step: u32,
        fault: DeviceFault,
    },
}

impl From<ConfigurationError> for RunError {
    fn from(e: ConfigurationError) -> Self {
        RunError::Configuration(e)
    }
}

/// Counters for a completed run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunSummary {
    /// Dwell plan used for every dwell
    pub plan: DwellPlan,
    /// Steps sampled (equals the configured step count)
    pub steps_sampled: u32,
    /// Drive commands issued, rewind included
    pub drive_commands: u32,
    /// Wait commands issued, settle waits included
    pub wait_commands: u32,
    /// Total ticks spent in wait commands
    pub waited_ticks: u64,
}

/// One-shot executor for a calibration run
pub struct Sequencer<'d, D: DeviceControl> {
    device: &'d mut D,
    run: RunConfig,
    plan: DwellPlan,
    rewind_distance: u32,
    cue_interval_ticks: u32,
    final_wait_ticks: u32,
    state: RunState,
    drive_commands: u32,
    wait_commands: u32,
    waited_ticks: u64,
}

impl<'d, D: DeviceControl> Sequencer<'d, D> {
    /// Validate the run and derive its dwell plan
    ///
    /// No device call is made here.
    pub fn new(
        device: &'d mut D,
        run: RunConfig,
        ceiling: &WaitCeiling,
    ) -> Result<Self, ConfigurationError> {
        let plan = DwellPlan::for_run(&run, ceiling)?;
        let rewind_distance = run.rewind_distance()?;

        // Settle waits were checked against the ceiling, which fits u32 ticks
        let cue_interval_ticks = round_ticks(run.settle.cue_interval_s) as u32;
        let final_wait_ticks = round_ticks(run.settle.final_wait_s) as u32;

        Ok(Self {
            device,
            run,
            plan,
            rewind_distance,
            cue_interval_ticks,
            final_wait_ticks,
            state: RunState::new(run.step_count),
            drive_commands: 0,
            wait_commands: 0,
            waited_ticks: 0,
        })
    }

    /// Get the dwell plan
    pub fn plan(&self) -> &DwellPlan {
        &self.plan
    }

    /// Get the current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Ticks the run will spend waiting, excluding drive time
    pub fn nominal_wait_ticks(&self) -> u64 {
        let settle = u64::from(self.run.settle.cue_count) * u64::from(self.cue_interval_ticks)
            + u64::from(self.final_wait_ticks);
        let dwells = u64::from(self.run.step_count) + 1;
        dwells
            .saturating_mul(self.plan.total_ticks())
            .saturating_add(settle)
    }

    /// Execute the run to completion
    ///
    /// On a device fault the run stops immediately. The status LED is
    /// switched off on a best-effort basis and the fault is returned along
    /// with the phase and step it happened in.
    pub async fn run<O: RunObserver>(mut self, observer: &mut O) -> Result<RunSummary, RunError> {
        match self.execute(observer).await {
            Ok(()) => Ok(RunSummary {
                plan: self.plan,
                steps_sampled: self.state.current_step(),
                drive_commands: self.drive_commands,
                wait_commands: self.wait_commands,
                waited_ticks: self.waited_ticks,
            }),
            Err(fault) => {
                let phase = self.state.phase();
                observer.on_event(RunEvent::Faulted { phase, fault });
                let _ = self.device.set_led(false);
                Err(RunError::Device {
                    phase,
                    step: self.state.current_step(),
                    fault,
                })
            }
        }
    }

    async fn execute<O: RunObserver>(&mut self, observer: &mut O) -> Result<(), DeviceFault> {
        self.device.configure(&self.run.device)?;
        observer.on_event(RunEvent::PhaseEntered(self.state.phase()));

        self.settle().await?;
        self.device.set_led(true)?;
        self.advance(Event::SettleComplete, observer);

        let direction = self.run.sampling_direction;
        let distance = self.run.step_distance;
        while self.state.phase() == Phase::Sampling {
            let step = self.state.current_step() + 1;
            // Cannot overflow: step * distance <= rewind distance
            let position = step * distance;

            self.drive(direction, distance).await?;
            observer.on_event(RunEvent::StepDriven { step, position });

            self.dwell().await?;
            observer.on_event(RunEvent::DwellFinished { position });

            self.advance(Event::StepSampled, observer);
        }

        self.drive(self.run.rewind_direction(), self.rewind_distance)
            .await?;
        observer.on_event(RunEvent::Rewound {
            distance: self.rewind_distance,
        });
        self.advance(Event::RewindComplete, observer);

        self.dwell().await?;
        observer.on_event(RunEvent::DwellFinished { position: 0 });
        self.advance(Event::ZeroDwellComplete, observer);

        self.device.set_led(false)
    }

    /// Countdown beeps, closing tone, final wait
    async fn settle(&mut self) -> Result<(), DeviceFault> {
        let settle = self.run.settle;
        for _ in 0..settle.cue_count {
            self.device.beep().await?;
            self.wait_ticks(self.cue_interval_ticks).await?;
        }
        self.device.tone(settle.tone, settle.tone_length).await?;
        self.wait_ticks(self.final_wait_ticks).await
    }

    /// One full dwell: every sub-wait of the plan, in order
    async fn dwell(&mut self) -> Result<(), DeviceFault> {
        for ticks in self.plan.sub_waits() {
            self.wait_ticks(ticks).await?;
        }
        Ok(())
    }

    async fn drive(&mut self, direction: Direction, distance: u32) -> Result<(), DeviceFault> {
        self.drive_commands += 1;
        self.device.drive(direction, self.run.speed, distance).await
    }

    async fn wait_ticks(&mut self, ticks: u32) -> Result<(), DeviceFault> {
        self.wait_commands += 1;
        self.waited_ticks = self.waited_ticks.saturating_add(u64::from(ticks));
        // One tick is one millisecond
        self.device.wait(ticks, TimeUnit::Milliseconds).await
    }

    fn advance<O: RunObserver>(&mut self, event: Event, observer: &mut O) {
        let previous = self.state.phase();
        self.state = self.state.transition(event);
        if self.state.phase() != previous {
            observer.on_event(RunEvent::PhaseEntered(self.state.phase()));
        }
    }
}

/// Validate `config` and run it on `device`
pub async fn run_calibration<D: DeviceControl, O: RunObserver>(
    device: &mut D,
    config: &SamplerConfig,
    observer: &mut O,
) -> Result<RunSummary, RunError> {
    let sequencer = Sequencer::new(device, config.run, &config.ceiling)?;
    sequencer.run(observer).await
}
