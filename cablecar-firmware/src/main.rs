//! Cablecar - Calibration Sampler Firmware
//!
//! Steps a cable cart through a sampling schedule so that a sensor riding
//! on it records a known, timestamped motion profile. Every motion event
//! is streamed over UART as it happens for later alignment with the
//! sensor log.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cablecar_drivers::buzzer::Buzzer;
use cablecar_drivers::led::StatusLed;
use cablecar_drivers::motor::OpenLoopDrive;
use cablecar_drivers::Device;

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Cablecar firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Timeline output: UART0 TX on GPIO0 (RX on GPIO1 is unused)
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 16]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, _rx) = uart.split();

    // Drive motor: bridge enable on GPIO16 (PWM0 A), IN1 GPIO18, IN2 GPIO19
    let mut motor_pwm_config = PwmConfig::default();
    motor_pwm_config.top = board::MOTOR_PWM_TOP;
    let (motor_pwm, _) = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, motor_pwm_config).split();
    let motor_pwm = unwrap!(motor_pwm);
    let drive = OpenLoopDrive::new(
        motor_pwm,
        Output::new(p.PIN_18, Level::Low),
        Output::new(p.PIN_19, Level::Low),
        board::DRIVE_CALIBRATION,
    );

    // Piezo buzzer on GPIO14 (PWM7 A)
    let buzzer_pwm = Pwm::new_output_a(p.PWM_SLICE7, p.PIN_14, PwmConfig::default());
    let buzzer = Buzzer::new(board::PwmTone::new(buzzer_pwm));

    // Onboard LED (GPIO25)
    let led = StatusLed::new(Output::new(p.PIN_25, Level::Low), false);

    let device = Device::new(drive, buzzer, led, Delay);
    info!("Device initialized");

    spawner.spawn(tasks::timeline_tx_task(tx)).unwrap();
    match config {
        Ok(config) => spawner.spawn(tasks::run_task(device, config)).unwrap(),
        Err(_) => error!("No run started: fix run.toml and reflash"),
    }

    info!("Tasks spawned");
}
