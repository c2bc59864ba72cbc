//! Bus configuration
//!
//! A [`BusConfig`] is built once at startup and consumed by
//! [`I2cController::init`](crate::I2cController::init).

use crate::error::ConfigError;
use crate::regs::{cr1, oar1, oar2};

/// Highest SCL frequency the peripheral supports (fast mode)
pub const MAX_SPEED_HZ: u32 = 400_000;

/// Default number of status-register polls before a wait gives up
pub const DEFAULT_POLL_BUDGET: u32 = 100_000;

/// Peripheral instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instance {
    /// I2C1 (PB6/PB7, or PB8/PB9 remapped)
    I2c1,
    /// I2C2 (PB10/PB11)
    I2c2,
}

/// Pin assignment for the selected instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMap {
    /// Reset pin assignment
    #[default]
    Default,
    /// AFIO remap (I2C1 only: SCL=PB8, SDA=PB9)
    Remapped,
}

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Plain I2C
    #[default]
    I2c,
    /// SMBus device
    SmbusDevice,
    /// SMBus host
    SmbusHost,
}

impl Mode {
    /// CR1 SMBUS/SMBTYPE bits for this mode
    pub const fn cr1_bits(self) -> u16 {
        match self {
            Mode::I2c => 0,
            Mode::SmbusDevice => cr1::SMBUS,
            Mode::SmbusHost => cr1::SMBUS | cr1::SMBTYPE,
        }
    }
}

/// Fast-mode duty cycle (t_low / t_high)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duty {
    /// t_low / t_high = 2
    #[default]
    Ratio2,
    /// t_low / t_high = 16/9
    Ratio16By9,
}

/// Own address width when acting as responder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressingMode {
    #[default]
    SevenBit,
    TenBit,
}

/// I2C bus configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Peripheral instance to bring up
    pub instance: Instance,
    /// Pin assignment
    pub pins: PinMap,
    /// I2C or one of the SMBus variants
    pub mode: Mode,
    /// Target SCL frequency in Hz (at most 400 kHz)
    pub speed_hz: u32,
    /// Fast mode (Sm when false)
    pub fast_mode: bool,
    /// Fast-mode duty cycle
    pub duty: Duty,
    /// Allow responders to stretch the clock
    pub clock_stretching: bool,
    /// Own address width
    pub addressing: AddressingMode,
    /// Acknowledge `own_address2` as well
    pub dual_address: bool,
    /// Own address (7 or 10 bits, unshifted)
    pub own_address1: u16,
    /// Second own address (7 bits, unshifted)
    pub own_address2: u8,
    /// Acknowledge the general call address 0x00
    pub general_call: bool,
    /// Packet error checking
    pub pec: bool,
    /// SMBus address resolution protocol
    pub arp: bool,
    /// Status polls per wait before reporting a timeout
    pub poll_budget: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::FAST
    }
}

impl BusConfig {
    /// Standard mode (100 kHz) on I2C1
    pub const STANDARD: Self = Self {
        speed_hz: 100_000,
        fast_mode: false,
        ..Self::FAST
    };

    /// Fast mode (400 kHz) on I2C1
    pub const FAST: Self = Self {
        instance: Instance::I2c1,
        pins: PinMap::Default,
        mode: Mode::I2c,
        speed_hz: 400_000,
        fast_mode: true,
        duty: Duty::Ratio2,
        clock_stretching: true,
        addressing: AddressingMode::SevenBit,
        dual_address: false,
        own_address1: 0x7C,
        own_address2: 0x7A,
        general_call: false,
        pec: false,
        arp: false,
        poll_budget: DEFAULT_POLL_BUDGET,
    };

    /// Check the parts of the configuration that do not depend on clocks
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_hz == 0 || self.speed_hz > MAX_SPEED_HZ {
            return Err(ConfigError::SpeedOutOfRange);
        }
        let own_max = match self.addressing {
            AddressingMode::SevenBit => 0x7F,
            AddressingMode::TenBit => 0x3FF,
        };
        if self.own_address1 > own_max || self.own_address2 > 0x7F {
            return Err(ConfigError::OwnAddressOutOfRange);
        }
        if self.poll_budget == 0 {
            return Err(ConfigError::ZeroPollBudget);
        }
        Ok(())
    }

    /// Whether the instance/pin combination exists on this chip family
    pub fn instance_supported(&self) -> bool {
        !matches!((self.instance, self.pins), (Instance::I2c2, PinMap::Remapped))
    }

    /// CR1 mode and feature bits (PE is set separately, last)
    pub fn cr1_bits(&self) -> u16 {
        let mut bits = self.mode.cr1_bits();
        if self.arp {
            bits |= cr1::ENARP;
        }
        if self.pec {
            bits |= cr1::ENPEC;
        }
        if self.general_call {
            bits |= cr1::ENGC;
        }
        if !self.clock_stretching {
            bits |= cr1::NOSTRETCH;
        }
        bits
    }

    /// OAR1 value
    pub fn oar1_bits(&self) -> u16 {
        match self.addressing {
            AddressingMode::SevenBit => oar1::RESERVED_ONE | ((self.own_address1 & 0x7F) << 1),
            AddressingMode::TenBit => {
                oar1::RESERVED_ONE | oar1::ADDMODE | (self.own_address1 & 0x3FF)
            }
        }
    }

    /// OAR2 value, only when dual addressing is requested
    pub fn oar2_bits(&self) -> Option<u16> {
        self.dual_address
            .then(|| oar2::ENDUAL | ((self.own_address2 as u16 & 0x7F) << 1))
    }
}
