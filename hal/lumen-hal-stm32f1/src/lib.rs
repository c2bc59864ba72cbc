//! STM32F1-specific I2C bus controller for the Lumen driver stack
//!
//! This crate drives the STM32F1 I2C peripheral at register level, following
//! the transfer sequences of the reference manual (RM0008, EV5..EV8 for
//! transmit and the 1-byte / 2-byte / N-byte receive procedures).
//!
//! - [`I2cController`] - start/stop, address phase, byte and burst transfers
//! - [`BusConfig`] - mode, speed, duty cycle, own addresses
//! - [`timing`] - CR2/CCR/TRISE derivation from the peripheral clock
//!
//! Register access goes through the [`I2cRegisters`] trait so the transfer
//! sequences can run against the real peripheral (`stm32f103c8` feature) or
//! against a simulated one in host tests.
//!
//! # Features
//!
//! - `stm32f103c8` - Enable the PAC-backed register and platform implementation
//! - `defmt` - Enable debug formatting support

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod platform;
pub mod regs;
pub mod timing;

#[cfg(feature = "stm32f103c8")]
pub mod pac;

#[cfg(test)]
mod sim;

pub use config::{AddressingMode, BusConfig, Duty, Instance, Mode, PinMap};
pub use controller::{I2cController, ReadStrategy};
pub use error::{ConfigError, Flag, I2cError};
pub use platform::Platform;
pub use regs::{I2cRegisters, Register};
pub use timing::Timing;

// Re-export shared bus types from lumen-hal
pub use lumen_hal::i2c::{Direction, Header, I2cBus, Role};
