//! Clock and pin bring-up collaborator
//!
//! The bus controller does not own the RCC, AFIO or GPIO blocks. Whatever
//! does implements [`Platform`] so [`I2cController::init`] can enable the
//! selected instance and read back the clock tree.
//!
//! [`I2cController::init`]: crate::I2cController::init

use crate::config::{Instance, PinMap};

/// Loop count for the supply settle delay before bring-up
pub const SETTLE_CYCLES: u32 = 1000;

/// Loop count the software reset bit is held for
pub const RESET_HOLD_CYCLES: u32 = 100;

/// Chip-level services the bus controller needs during init
pub trait Platform {
    /// Enable the peripheral clock and configure SCL/SDA as open-drain
    /// alternate-function outputs, released high
    fn enable(&mut self, instance: Instance, pins: PinMap);

    /// System clock frequency in Hz
    fn system_clock_hz(&self) -> u32;

    /// APB1 prescaler field (RCC_CFGR.PPRE1, 0..=7)
    fn apb1_prescaler(&self) -> u8;

    /// Busy-wait for roughly `cycles` core cycles
    fn delay_cycles(&mut self, cycles: u32) {
        for _ in 0..cycles {
            core::hint::spin_loop();
        }
    }
}

/// SCL and SDA pin numbers on GPIOB for an instance/pin map
pub const fn port_b_pins(instance: Instance, pins: PinMap) -> (u8, u8) {
    match (instance, pins) {
        (Instance::I2c1, PinMap::Default) => (6, 7),
        (Instance::I2c1, PinMap::Remapped) => (8, 9),
        (Instance::I2c2, _) => (10, 11),
    }
}
