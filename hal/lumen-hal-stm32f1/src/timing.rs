//! SCL timing derivation
//!
//! The peripheral needs three derived values:
//!
//! - CR2.FREQ: APB1 clock in MHz
//! - CCR: SCL divisor `pclk1 / (4 × speed)`, with mode and duty bits
//! - TRISE: maximum SCL rise time in APB1 cycles, plus one
//!
//! The CCR divisor has a protocol minimum of 1 in fast mode with 16/9 duty
//! and 4 in every other configuration.

use crate::config::{BusConfig, Duty};
use crate::error::ConfigError;
use crate::regs::ccr;

/// Lowest APB1 frequency the peripheral accepts, in MHz
pub const MIN_FREQ_MHZ: u32 = 2;

/// Highest APB1 frequency on STM32F1, in MHz
pub const MAX_FREQ_MHZ: u32 = 36;

/// CCR minimum in fast mode with 16/9 duty
pub const MIN_CCR_FAST_DUTY: u16 = 0x01;

/// CCR minimum for every other configuration
pub const MIN_CCR: u16 = 0x04;

/// SCL rise time budget in fast mode at 400 kHz (ns)
pub const RISE_TIME_FAST_NS: u32 = 300;

/// SCL rise time budget otherwise (ns)
pub const RISE_TIME_STANDARD_NS: u32 = 1000;

/// APB1 divisor for a PPRE1 field value (RCC_CFGR bits 10:8)
///
/// Codes 0..=3 leave the clock undivided.
pub const fn apb1_divisor(ppre1: u8) -> u32 {
    match ppre1 & 0x07 {
        4 => 2,
        5 => 4,
        6 => 8,
        7 => 16,
        _ => 1,
    }
}

/// Register values derived from the clock tree and the bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// CR2.FREQ (APB1 MHz)
    pub freq_mhz: u16,
    /// Complete CCR register value (FS | DUTY | divisor)
    pub ccr: u16,
    /// TRISE register value
    pub trise: u16,
}

impl Timing {
    /// Derive the timing registers
    ///
    /// # Arguments
    /// * `config` - bus configuration (speed, fast mode, duty)
    /// * `sysclk_hz` - system clock feeding the AHB/APB1 tree
    /// * `ppre1` - APB1 prescaler field as read from RCC_CFGR
    pub fn compute(config: &BusConfig, sysclk_hz: u32, ppre1: u8) -> Result<Self, ConfigError> {
        if config.speed_hz == 0 || config.speed_hz > crate::config::MAX_SPEED_HZ {
            return Err(ConfigError::SpeedOutOfRange);
        }

        let pclk1 = sysclk_hz / apb1_divisor(ppre1);
        let freq_mhz = pclk1 / 1_000_000;
        if !(MIN_FREQ_MHZ..=MAX_FREQ_MHZ).contains(&freq_mhz) {
            return Err(ConfigError::PeripheralClockOutOfRange);
        }

        let fast_duty = config.fast_mode && config.duty == Duty::Ratio16By9;
        let minimum = if fast_duty { MIN_CCR_FAST_DUTY } else { MIN_CCR };
        let divisor = (pclk1 / (4 * config.speed_hz)).min(ccr::CCR_MASK as u32) as u16;
        let divisor = divisor.max(minimum);

        let mut ccr_value = divisor;
        if config.fast_mode {
            ccr_value |= ccr::FS;
        }
        if config.duty == Duty::Ratio16By9 {
            ccr_value |= ccr::DUTY;
        }

        let rise_ns = if config.speed_hz == 400_000 && config.fast_mode {
            RISE_TIME_FAST_NS
        } else {
            RISE_TIME_STANDARD_NS
        };
        let trise = (rise_ns * freq_mhz) / 1000 + 1;

        Ok(Self {
            freq_mhz: freq_mhz as u16,
            ccr: ccr_value,
            trise: trise as u16,
        })
    }

    /// Clock divisor without the mode bits
    pub const fn divisor(&self) -> u16 {
        self.ccr & ccr::CCR_MASK
    }
}
