//! I2C peripheral register map
//!
//! Bit positions follow RM0008 §26.6. Only the registers and bits the
//! transfer sequences touch are listed.

/// I2C peripheral registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Control register 1
    Cr1,
    /// Control register 2 (peripheral clock frequency)
    Cr2,
    /// Own address register 1
    Oar1,
    /// Own address register 2 (dual addressing)
    Oar2,
    /// Data register
    Dr,
    /// Status register 1
    Sr1,
    /// Status register 2
    Sr2,
    /// Clock control register
    Ccr,
    /// Maximum rise time register
    Trise,
}

/// Raw access to one I2C peripheral's register block
///
/// Reads take `&mut self` because several status bits are cleared by the
/// act of reading (ADDR by SR1 then SR2, STOPF by SR1 then a CR1 write).
pub trait I2cRegisters {
    /// Read a register
    fn read(&mut self, reg: Register) -> u16;

    /// Write a register
    fn write(&mut self, reg: Register, value: u16);

    /// Read-modify-write a register
    fn modify<F>(&mut self, reg: Register, f: F)
    where
        F: FnOnce(u16) -> u16,
    {
        let value = self.read(reg);
        self.write(reg, f(value));
    }
}

impl<T: I2cRegisters + ?Sized> I2cRegisters for &mut T {
    fn read(&mut self, reg: Register) -> u16 {
        T::read(self, reg)
    }

    fn write(&mut self, reg: Register, value: u16) {
        T::write(self, reg, value)
    }
}

/// CR1 bits
pub mod cr1 {
    pub const PE: u16 = 1 << 0;
    pub const SMBUS: u16 = 1 << 1;
    pub const SMBTYPE: u16 = 1 << 3;
    pub const ENARP: u16 = 1 << 4;
    pub const ENPEC: u16 = 1 << 5;
    pub const ENGC: u16 = 1 << 6;
    pub const NOSTRETCH: u16 = 1 << 7;
    pub const START: u16 = 1 << 8;
    pub const STOP: u16 = 1 << 9;
    pub const ACK: u16 = 1 << 10;
    pub const POS: u16 = 1 << 11;
    pub const SWRST: u16 = 1 << 15;
}

/// CR2 fields
pub mod cr2 {
    /// Peripheral clock frequency in MHz
    pub const FREQ_MASK: u16 = 0x003F;
}

/// OAR1 bits
pub mod oar1 {
    /// 10-bit slave address mode
    pub const ADDMODE: u16 = 1 << 15;
    /// Must be kept at 1 by software
    pub const RESERVED_ONE: u16 = 1 << 14;
}

/// OAR2 bits
pub mod oar2 {
    /// Dual addressing enable
    pub const ENDUAL: u16 = 1 << 0;
}

/// SR1 flags
pub mod sr1 {
    /// Start condition generated (EV5)
    pub const SB: u16 = 1 << 0;
    /// Address sent (initiator) / matched (responder)
    pub const ADDR: u16 = 1 << 1;
    /// Byte transfer finished
    pub const BTF: u16 = 1 << 2;
    /// Stop detected (responder)
    pub const STOPF: u16 = 1 << 4;
    /// Data register not empty (receive)
    pub const RXNE: u16 = 1 << 6;
    /// Data register empty (transmit)
    pub const TXE: u16 = 1 << 7;
    /// Acknowledge failure
    pub const AF: u16 = 1 << 10;
}

/// CCR bits
pub mod ccr {
    /// Fast mode select
    pub const FS: u16 = 1 << 15;
    /// Fast mode duty cycle (16/9 when set)
    pub const DUTY: u16 = 1 << 14;
    /// Clock divisor field
    pub const CCR_MASK: u16 = 0x0FFF;
}
