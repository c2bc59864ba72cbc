//! Lumen Hardware Abstraction Layer
//!
//! This crate defines the bus traits shared by the chip-specific bus
//! controller and the device drivers layered on top of it. Drivers compose
//! byte-level transactions through [`i2c::I2cBus`] and never touch
//! peripheral registers themselves.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Device drivers (lumen-display, etc.)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal-stm32f1 (I2C register level) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - Start/stop framing, address phase and data transfer

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod i2c;

pub use i2c::{Direction, Header, I2cBus, Role};
