//! Hardware driver implementations
//!
//! Concrete implementations of the cablecar-core device trait on top of
//! `embedded-hal` and `embedded-hal-async`:
//!
//! - Open-loop DC drive motor on an H-bridge
//! - Piezo buzzer
//! - Status LED
//! - [`Device`], composing all of the above with a delay source

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod buzzer;
pub mod device;
pub mod led;
pub mod motor;

#[cfg(test)]
mod mock;

pub use device::Device;
