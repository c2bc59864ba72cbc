//! SSD1306 OLED driver for the Lumen driver stack
//!
//! This crate provides:
//! - [`Ssd1306`] - 128x64 panel driver over any [`I2cBus`](lumen_hal::i2c::I2cBus)
//! - [`Framebuffer`] - shadow copy of the panel's GDDRAM
//! - [`raster`] - line, circle and rectangle rasterisation
//! - [`command`] - SSD1306 opcodes, scroll and addressing types
//!
//! # Architecture
//!
//! The driver keeps a shadow framebuffer in step with the panel. Every
//! drawing call updates the shadow and sends the touched bytes, so the two
//! never disagree after a successful call. [`Ssd1306::ram_write`] edits the
//! shadow alone; [`Ssd1306::ram_update_full`] pushes it to the panel.
//!
//! # Features
//!
//! - `graphics` - [`embedded_graphics_core::draw_target::DrawTarget`] support (default)
//! - `defmt` - Enable debug formatting support

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod raster;
pub mod ssd1306;

#[cfg(feature = "graphics")]
pub mod graphics;

#[cfg(test)]
mod mock;

pub use command::{
    AddrMode, DiagonalDirection, FrameRate, HorizontalDirection, Orientation, Page, Scroll,
    VerticalDirection,
};
pub use config::{DisplayConfig, ALTERNATE_ADDRESS, DEFAULT_ADDRESS};
pub use error::DisplayError;
pub use framebuffer::{Framebuffer, BUFFER_SIZE, HEIGHT, WIDTH};
pub use raster::{Plot, RasterStats};
pub use ssd1306::Ssd1306;
