//! I2C bus controller
//!
//! Polled implementation of the RM0008 transfer sequences. Every wait on a
//! status flag is bounded by the configured poll budget and reports
//! [`I2cError::Timeout`] with the flag that never showed up.
//!
//! # Receive sequences (initiator)
//!
//! The peripheral ACKs a byte as it arrives, so the decision to NACK the last
//! byte and the stop request must be made while earlier bytes are still
//! unread. That is why receive length picks one of three procedures:
//!
//! | Length | Procedure |
//! |--------|-----------|
//! | 1      | [`I2cController::read_byte`]: NACK + stop right after ADDR |
//! | 2      | [`ReadStrategy::Pair`]: POS, NACK before BTF, stop, read both |
//! | N > 2  | [`ReadStrategy::Sequential`]: ACK until 3 remain, then BTF tail |

use embedded_hal::i2c::{ErrorType, I2c, Operation};
use lumen_hal::i2c::{Header, I2cBus, Role};

use crate::config::BusConfig;
use crate::error::{Flag, I2cError};
use crate::platform::{Platform, RESET_HOLD_CYCLES, SETTLE_CYCLES};
use crate::regs::{cr1, cr2, sr1, I2cRegisters, Register};
use crate::timing::Timing;

/// Initiator burst-receive procedure, chosen from the buffer length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadStrategy {
    /// Exactly two bytes (EV7_3 with POS)
    Pair,
    /// More than two bytes (EV7 loop, EV7_2 tail)
    Sequential(usize),
}

impl ReadStrategy {
    /// Pick the procedure for `len` bytes; fewer than two is rejected
    pub const fn for_len(len: usize) -> Result<Self, I2cError> {
        match len {
            0 | 1 => Err(I2cError::InvalidLength),
            2 => Ok(ReadStrategy::Pair),
            n => Ok(ReadStrategy::Sequential(n)),
        }
    }
}

/// Polled I2C bus controller
pub struct I2cController<R> {
    regs: R,
    poll_budget: u32,
    /// A start was issued and not yet matched by a stop
    held: bool,
}

impl<R: I2cRegisters> I2cController<R> {
    /// Bring up the peripheral
    ///
    /// Enables the instance through `platform`, resets the peripheral,
    /// programs CR1/OAR1/OAR2/CR2/CCR/TRISE from `config` and the clock
    /// tree, then sets PE.
    pub fn init<P: Platform>(
        mut regs: R,
        platform: &mut P,
        config: &BusConfig,
    ) -> Result<Self, I2cError> {
        if !config.instance_supported() {
            #[cfg(feature = "defmt")]
            defmt::warn!("i2c: {} has no {} pin map", config.instance, config.pins);
            return Err(I2cError::UnsupportedInstance);
        }
        config.validate()?;
        let timing = Timing::compute(
            config,
            platform.system_clock_hz(),
            platform.apb1_prescaler(),
        )?;

        platform.delay_cycles(SETTLE_CYCLES);
        platform.enable(config.instance, config.pins);

        // Software reset
        regs.modify(Register::Cr1, |v| v | cr1::SWRST);
        platform.delay_cycles(RESET_HOLD_CYCLES);
        regs.modify(Register::Cr1, |v| v & !cr1::SWRST);

        regs.modify(Register::Cr1, |v| v | config.cr1_bits());
        regs.write(Register::Oar1, config.oar1_bits());
        if let Some(oar2) = config.oar2_bits() {
            regs.write(Register::Oar2, oar2);
        }

        regs.modify(Register::Cr2, |v| (v & !cr2::FREQ_MASK) | timing.freq_mhz);
        regs.write(Register::Ccr, timing.ccr);
        regs.write(Register::Trise, timing.trise);

        regs.modify(Register::Cr1, |v| v | cr1::PE);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "i2c: {} up, FREQ={} MHz CCR={:#x} TRISE={}",
            config.instance,
            timing.freq_mhz,
            timing.ccr,
            timing.trise
        );

        Ok(Self {
            regs,
            poll_budget: config.poll_budget,
            held: false,
        })
    }

    /// Wrap an already configured register block
    pub fn from_registers(regs: R, poll_budget: u32) -> Self {
        Self {
            regs,
            poll_budget: poll_budget.max(1),
            held: false,
        }
    }

    /// True when every start has been matched by a stop
    pub fn is_idle(&self) -> bool {
        !self.held
    }

    /// Access the register block
    pub fn registers(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Give back the register block
    pub fn release(self) -> R {
        self.regs
    }

    /// Issue a start condition
    ///
    /// Without a preceding stop the hardware generates a repeated start.
    pub fn start(&mut self) {
        self.regs.modify(Register::Cr1, |v| v | cr1::START);
        self.held = true;
    }

    /// Issue a stop condition to release the bus
    pub fn stop(&mut self) {
        self.regs.modify(Register::Cr1, |v| v | cr1::STOP);
        self.held = false;
    }

    /// Send the address phase after a start
    ///
    /// Waits for SB (EV5), writes the header, then waits for ADDR (EV6).
    /// ADDR is left set; the transfer that follows clears it.
    pub fn request(&mut self, header: Header) -> Result<(), I2cError> {
        self.wait_flag(Flag::StartBit)?;
        self.regs.write(Register::Dr, header.raw() as u16);
        self.wait_flag(Flag::AddressSent)?;
        Ok(())
    }

    /// Transmit one byte
    ///
    /// Clears ADDR (EV6), waits TXE (EV8_1), writes DR and waits until the
    /// byte has left (BTF or TXE, EV8_2). The caller issues the stop.
    pub fn write_byte(&mut self, data: u8) -> Result<(), I2cError> {
        self.clear_addr();
        self.wait_flag(Flag::TxEmpty)?;
        self.regs.write(Register::Dr, data as u16);
        self.wait_for(Flag::ByteTransferFinished, |s| {
            s & (sr1::BTF | sr1::TXE) != 0
        })?;
        Ok(())
    }

    /// Transmit a run of bytes
    ///
    /// As initiator the data is streamed and the caller issues the stop.
    /// As responder bytes are sent until the remote initiator NACKs; a
    /// one-byte buffer repeats its byte and a longer buffer repeats its last
    /// byte once exhausted.
    pub fn write_burst(&mut self, role: Role, data: &[u8]) -> Result<(), I2cError> {
        match role {
            Role::Initiator => self.initiator_write(data),
            Role::Responder => self.responder_write(data),
        }
    }

    fn initiator_write(&mut self, data: &[u8]) -> Result<(), I2cError> {
        self.clear_addr();
        if data.is_empty() {
            return Ok(());
        }
        for &byte in data {
            self.wait_flag(Flag::TxEmpty)?;
            self.regs.write(Register::Dr, byte as u16);
        }
        // EV8_2: last byte shifted out and nothing pending
        self.wait_for(Flag::ByteTransferFinished, |s| {
            s & sr1::BTF != 0 && s & sr1::TXE != 0
        })?;
        Ok(())
    }

    fn responder_write(&mut self, data: &[u8]) -> Result<(), I2cError> {
        let last = data.len().checked_sub(1).ok_or(I2cError::InvalidLength)?;

        self.set_ack(true);
        self.wait_flag(Flag::AddressSent)?;
        self.clear_addr();

        let mut index = 0;
        loop {
            if self.regs.read(Register::Sr1) & sr1::AF != 0 {
                break;
            }
            self.regs.write(Register::Dr, data[index.min(last)] as u16);
            index += 1;
            // EV3: byte ACKed (TXE) or the initiator is done (AF)
            self.wait_for(Flag::TxEmpty, |s| s & (sr1::TXE | sr1::AF) != 0)?;
        }

        // EV3_2: clear AF
        self.regs.modify(Register::Sr1, |v| v & !sr1::AF);
        Ok(())
    }

    /// Receive exactly one byte
    ///
    /// NACK is armed and the stop requested right after ADDR is cleared
    /// (EV6_3), before the byte has finished arriving.
    pub fn read_byte(&mut self) -> Result<u8, I2cError> {
        self.set_ack(false);
        self.clear_addr();
        self.stop();
        self.wait_flag(Flag::RxNotEmpty)?;
        Ok(self.read_dr())
    }

    /// Receive into `buf`
    ///
    /// As initiator `buf` must hold at least two bytes and is filled
    /// completely; the sequence issues its own stop. As responder bytes are
    /// stored until the remote initiator stops. Returns the bytes stored.
    pub fn read_burst(&mut self, role: Role, buf: &mut [u8]) -> Result<usize, I2cError> {
        match role {
            Role::Initiator => {
                match ReadStrategy::for_len(buf.len())? {
                    ReadStrategy::Pair => self.read_pair(buf)?,
                    ReadStrategy::Sequential(_) => self.read_sequential(buf)?,
                }
                Ok(buf.len())
            }
            Role::Responder => self.responder_read(buf),
        }
    }

    /// POS is cleared on every exit; on failure ACK goes back to what it was
    fn read_pair(&mut self, buf: &mut [u8]) -> Result<(), I2cError> {
        let ack = self.regs.read(Register::Cr1) & cr1::ACK != 0;
        self.regs.modify(Register::Cr1, |v| v | cr1::POS);

        let result = self.read_pair_positioned(buf);

        self.regs.modify(Register::Cr1, |v| v & !cr1::POS);
        if result.is_err() {
            self.set_ack(ack);
        }
        result
    }

    fn read_pair_positioned(&mut self, buf: &mut [u8]) -> Result<(), I2cError> {
        self.set_ack(true);

        // EV6: clear ADDR, then NACK the second byte
        self.clear_addr();
        self.set_ack(false);

        // EV7_3: data1 in DR, data2 in the shift register
        self.wait_flag(Flag::ByteTransferFinished)?;
        self.stop();
        buf[0] = self.read_dr();
        buf[1] = self.read_dr();
        Ok(())
    }

    fn read_sequential(&mut self, buf: &mut [u8]) -> Result<(), I2cError> {
        let n = buf.len();
        self.set_ack(true);
        self.clear_addr();

        // EV7: ACK each byte until three remain
        for slot in &mut buf[..n - 3] {
            self.wait_flag(Flag::RxNotEmpty)?;
            *slot = self.read_dr();
        }

        // EV7_2: dataN-2 in DR, dataN-1 in the shift register
        self.wait_flag(Flag::ByteTransferFinished)?;
        self.set_ack(false);
        buf[n - 3] = self.read_dr();
        self.stop();

        // dataN-1 in DR, dataN in the shift register, NACKed
        self.wait_flag(Flag::ByteTransferFinished)?;
        buf[n - 2] = self.read_dr();
        buf[n - 1] = self.read_dr();
        Ok(())
    }

    fn responder_read(&mut self, buf: &mut [u8]) -> Result<usize, I2cError> {
        self.set_ack(true);
        // EV1
        self.wait_flag(Flag::AddressSent)?;
        self.clear_addr();

        let mut stored = 0;
        let mut overflow = false;
        let mut idle = 0;
        loop {
            let status = self.regs.read(Register::Sr1);
            if status & sr1::RXNE != 0 {
                // EV2
                let byte = self.read_dr();
                match buf.get_mut(stored) {
                    Some(slot) => {
                        *slot = byte;
                        stored += 1;
                    }
                    None => overflow = true,
                }
                idle = 0;
                continue;
            }
            if status & sr1::STOPF != 0 {
                break;
            }
            idle += 1;
            if idle >= self.poll_budget {
                return Err(self.timeout(Flag::StopDetected));
            }
        }

        // EV4: SR1 was just read, a CR1 write clears STOPF
        let value = self.regs.read(Register::Cr1);
        self.regs.write(Register::Cr1, value);

        if overflow {
            return Err(I2cError::BufferOverflow);
        }
        Ok(stored)
    }

    /// Clear ADDR by reading SR1 then SR2
    fn clear_addr(&mut self) {
        let _ = self.regs.read(Register::Sr1);
        let _ = self.regs.read(Register::Sr2);
    }

    fn set_ack(&mut self, ack: bool) {
        self.regs.modify(Register::Cr1, |v| {
            if ack {
                v | cr1::ACK
            } else {
                v & !cr1::ACK
            }
        });
    }

    fn read_dr(&mut self) -> u8 {
        self.regs.read(Register::Dr) as u8
    }

    fn wait_flag(&mut self, flag: Flag) -> Result<u16, I2cError> {
        self.wait_for(flag, |status| status & flag.mask() != 0)
    }

    /// Poll SR1 until `ready` holds or the budget runs out
    fn wait_for<F>(&mut self, flag: Flag, ready: F) -> Result<u16, I2cError>
    where
        F: Fn(u16) -> bool,
    {
        for _ in 0..self.poll_budget {
            let status = self.regs.read(Register::Sr1);
            if ready(status) {
                return Ok(status);
            }
            core::hint::spin_loop();
        }
        Err(self.timeout(flag))
    }

    fn timeout(&self, flag: Flag) -> I2cError {
        #[cfg(feature = "defmt")]
        defmt::warn!("i2c: timed out waiting for {}", flag);
        I2cError::Timeout(flag)
    }

    fn run_operations(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), I2cError> {
        let last = operations.len().saturating_sub(1);
        let mut writing = false;

        for (i, operation) in operations.iter_mut().enumerate() {
            match operation {
                Operation::Write(data) => {
                    // Adjacent writes share one address phase
                    if !writing {
                        self.start();
                        self.request(Header::write(address))?;
                        writing = true;
                    }
                    self.write_burst(Role::Initiator, data)?;
                }
                Operation::Read(buf) => {
                    // Receive sequences end with their own stop
                    if i != last {
                        return Err(I2cError::UnsupportedSequence);
                    }
                    writing = false;
                    self.start();
                    self.request(Header::read(address))?;
                    match buf.len() {
                        0 => {
                            self.clear_addr();
                            self.stop();
                        }
                        1 => buf[0] = self.read_byte()?,
                        _ => {
                            self.read_burst(Role::Initiator, buf)?;
                        }
                    }
                }
            }
        }

        if writing {
            self.stop();
        }
        Ok(())
    }
}

impl<R: I2cRegisters> I2cBus for I2cController<R> {
    type Error = I2cError;

    fn start(&mut self) {
        I2cController::start(self)
    }

    fn stop(&mut self) {
        I2cController::stop(self)
    }

    fn request(&mut self, header: Header) -> Result<(), Self::Error> {
        I2cController::request(self, header)
    }

    fn write_byte(&mut self, data: u8) -> Result<(), Self::Error> {
        I2cController::write_byte(self, data)
    }

    fn write_burst(&mut self, role: Role, data: &[u8]) -> Result<(), Self::Error> {
        I2cController::write_burst(self, role, data)
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        I2cController::read_byte(self)
    }

    fn read_burst(&mut self, role: Role, buf: &mut [u8]) -> Result<usize, Self::Error> {
        I2cController::read_burst(self, role, buf)
    }
}

impl<R: I2cRegisters> ErrorType for I2cController<R> {
    type Error = I2cError;
}

impl<R: I2cRegisters> I2c for I2cController<R> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let result = self.run_operations(address, operations);
        if result.is_err() && self.held {
            self.stop();
        }
        result
    }
}
