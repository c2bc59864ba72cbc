//! PAC-backed register access and chip bring-up
//!
//! Uses the embassy-stm32 peripheral access crate directly. Field access goes
//! through the raw register values so the bit layout stays the one in
//! [`crate::regs`].

use embassy_stm32::pac;
use embassy_stm32::pac::i2c::regs as i2c_regs;

use crate::config::{Instance, PinMap};
use crate::platform::{port_b_pins, Platform};
use crate::regs::{I2cRegisters, Register};

/// RCC_APB2ENR.AFIOEN
const APB2_AFIOEN: u32 = 1 << 0;
/// RCC_APB2ENR.IOPBEN
const APB2_IOPBEN: u32 = 1 << 3;
/// RCC_APB1ENR.I2C1EN
const APB1_I2C1EN: u32 = 1 << 21;
/// RCC_APB1ENR.I2C2EN
const APB1_I2C2EN: u32 = 1 << 22;
/// AFIO_MAPR.I2C1_REMAP
const MAPR_I2C1_REMAP: u32 = 1 << 1;
/// GPIO CNF/MODE nibble: alternate-function open-drain, 50 MHz
const PIN_AF_OPEN_DRAIN: u32 = 0xF;

/// Register block of one I2C instance
pub struct PacRegisters {
    regs: pac::i2c::I2c,
}

impl PacRegisters {
    pub fn new(instance: Instance) -> Self {
        let regs = match instance {
            Instance::I2c1 => pac::I2C1,
            Instance::I2c2 => pac::I2C2,
        };
        Self { regs }
    }
}

impl I2cRegisters for PacRegisters {
    fn read(&mut self, reg: Register) -> u16 {
        let r = &self.regs;
        let value = match reg {
            Register::Cr1 => r.cr1().read().0,
            Register::Cr2 => r.cr2().read().0,
            Register::Oar1 => r.oar1().read().0,
            Register::Oar2 => r.oar2().read().0,
            Register::Dr => r.dr().read().0,
            Register::Sr1 => r.sr1().read().0,
            Register::Sr2 => r.sr2().read().0,
            Register::Ccr => r.ccr().read().0,
            Register::Trise => r.trise().read().0,
        };
        value as u16
    }

    fn write(&mut self, reg: Register, value: u16) {
        let r = &self.regs;
        let value = value as u32;
        match reg {
            Register::Cr1 => r.cr1().write_value(i2c_regs::Cr1(value)),
            Register::Cr2 => r.cr2().write_value(i2c_regs::Cr2(value)),
            Register::Oar1 => r.oar1().write_value(i2c_regs::Oar1(value)),
            Register::Oar2 => r.oar2().write_value(i2c_regs::Oar2(value)),
            Register::Dr => r.dr().write_value(i2c_regs::Dr(value)),
            Register::Sr1 => r.sr1().write_value(i2c_regs::Sr1(value)),
            // Read-only
            Register::Sr2 => {}
            Register::Ccr => r.ccr().write_value(i2c_regs::Ccr(value)),
            Register::Trise => r.trise().write_value(i2c_regs::Trise(value)),
        }
    }
}

/// RCC/AFIO/GPIOB bring-up for the STM32F103
pub struct PacPlatform {
    sysclk_hz: u32,
}

impl PacPlatform {
    /// `sysclk_hz` is the frequency the clock tree was configured for
    pub fn new(sysclk_hz: u32) -> Self {
        Self { sysclk_hz }
    }
}

impl Platform for PacPlatform {
    fn enable(&mut self, instance: Instance, pins: PinMap) {
        pac::RCC
            .apb2enr()
            .modify(|w| w.0 |= APB2_AFIOEN | APB2_IOPBEN);

        let clock = match instance {
            Instance::I2c1 => APB1_I2C1EN,
            Instance::I2c2 => APB1_I2C2EN,
        };
        pac::RCC.apb1enr().modify(|w| w.0 |= clock);

        if instance == Instance::I2c1 {
            pac::AFIO.mapr().modify(|w| match pins {
                PinMap::Default => w.0 &= !MAPR_I2C1_REMAP,
                PinMap::Remapped => w.0 |= MAPR_I2C1_REMAP,
            });
        }

        let (scl, sda) = port_b_pins(instance, pins);
        for pin in [scl, sda] {
            // CRL holds pins 0..=7, CRH pins 8..=15
            let shift = (pin as u32 % 8) * 4;
            pac::GPIOB.cr(pin as usize / 8).modify(|w| {
                w.0 = (w.0 & !(0xF << shift)) | (PIN_AF_OPEN_DRAIN << shift);
            });
        }
        // Release both lines high
        pac::GPIOB
            .bsrr()
            .write_value(pac::gpio::regs::Bsrr((1 << scl) | (1 << sda)));

        #[cfg(feature = "defmt")]
        defmt::debug!("i2c: {} on PB{}/PB{}", instance, scl, sda);
    }

    fn system_clock_hz(&self) -> u32 {
        self.sysclk_hz
    }

    fn apb1_prescaler(&self) -> u8 {
        ((pac::RCC.cfgr().read().0 >> 8) & 0x7) as u8
    }

    fn delay_cycles(&mut self, cycles: u32) {
        cortex_m::asm::delay(cycles);
    }
}
