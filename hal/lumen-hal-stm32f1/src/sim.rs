//! Simulated I2C peripheral for host tests
//!
//! Models just enough of the STM32F1 I2C state machine to exercise the
//! transfer sequences: SB/ADDR/TXE/BTF/RXNE/AF/STOPF, the SR1-then-SR2 ADDR
//! clear, the SR1-then-CR1 STOPF clear, and self-clearing START/STOP bits.
//! Bus activity is recorded as [`Event`]s.

use std::collections::VecDeque;
use std::vec::Vec;

use crate::config::{Instance, PinMap};
use crate::platform::Platform;
use crate::regs::{cr1, sr1, I2cRegisters, Register};

/// Observable bus activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    Stop,
    /// Address byte sent after a start
    Header(u8),
    /// Data byte written to DR
    Tx(u8),
    /// Data byte read from DR
    Rx(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    StartSent,
    /// Address phase went unanswered
    Nacked,
    Transmit,
    Receive,
}

/// Remote party on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Peer {
    /// Nobody answers
    Absent,
    /// A responder at any address
    Device,
    /// A remote initiator that reads this many bytes and NACKs the last
    Reader(usize),
    /// A remote initiator that writes the queued bytes and stops
    Writer,
}

pub struct SimBus {
    pub cr1: u16,
    pub cr2: u16,
    pub oar1: u16,
    pub oar2: u16,
    pub ccr: u16,
    pub trise: u16,
    pub events: Vec<Event>,
    /// Number of software resets seen
    pub resets: u32,
    peer: Peer,
    phase: Phase,
    incoming: VecDeque<u8>,
    addr: bool,
    addressed: bool,
    af: bool,
    sr1_read: bool,
    stop_cleared: bool,
    tx_count: usize,
}

impl SimBus {
    fn new(peer: Peer, incoming: &[u8]) -> Self {
        Self {
            cr1: 0,
            cr2: 0,
            oar1: 0,
            oar2: 0,
            ccr: 0,
            trise: 0,
            events: Vec::new(),
            resets: 0,
            peer,
            phase: Phase::Idle,
            incoming: incoming.iter().copied().collect(),
            addr: false,
            addressed: false,
            af: false,
            sr1_read: false,
            stop_cleared: false,
            tx_count: 0,
        }
    }

    /// A responder that ACKs every address and answers reads with `data`
    pub fn with_device(data: &[u8]) -> Self {
        Self::new(Peer::Device, data)
    }

    /// An empty bus
    pub fn no_device() -> Self {
        Self::new(Peer::Absent, &[])
    }

    /// A remote initiator that writes `data` to us, then stops
    pub fn remote_writer(data: &[u8]) -> Self {
        Self::new(Peer::Writer, data)
    }

    /// A remote initiator that reads `count` bytes from us
    pub fn remote_reader(count: usize) -> Self {
        Self::new(Peer::Reader(count), &[])
    }

    /// AF still set
    pub fn ack_failure(&self) -> bool {
        self.af
    }

    /// STOPF set and not yet cleared
    pub fn stop_pending(&self) -> bool {
        self.peer == Peer::Writer
            && self.addressed
            && self.incoming.is_empty()
            && !self.stop_cleared
    }

    fn status(&self) -> u16 {
        let mut status = 0;
        if self.phase == Phase::StartSent {
            status |= sr1::SB;
        }
        if self.addr {
            status |= sr1::ADDR;
        }
        if self.af {
            status |= sr1::AF;
        }
        if self.stop_pending() {
            status |= sr1::STOPF;
        }
        if !self.addr {
            match self.phase {
                Phase::Transmit => status |= sr1::TXE | sr1::BTF,
                Phase::Receive => {
                    if !self.incoming.is_empty() {
                        status |= sr1::RXNE;
                    }
                    // DR and the shift register both hold a byte
                    if self.incoming.len() >= 2 {
                        status |= sr1::BTF;
                    }
                }
                _ => {}
            }
        }
        status
    }

    fn write_cr1(&mut self, value: u16) {
        if value & cr1::SWRST != 0 && self.cr1 & cr1::SWRST == 0 {
            self.resets += 1;
        }
        if self.sr1_read && self.stop_pending() {
            self.stop_cleared = true;
        }
        if value & cr1::START != 0 {
            self.events.push(Event::Start);
            self.phase = Phase::StartSent;
        }
        if value & cr1::STOP != 0 {
            self.events.push(Event::Stop);
            // Bytes already in flight are still delivered
            if self.phase != Phase::Receive {
                self.phase = Phase::Idle;
            }
        }
        if value & cr1::ACK != 0 && !self.addressed {
            if let Peer::Reader(_) | Peer::Writer = self.peer {
                self.addr = true;
                self.addressed = true;
                self.phase = match self.peer {
                    Peer::Writer => Phase::Receive,
                    _ => Phase::Transmit,
                };
            }
        }
        self.cr1 = value & !(cr1::START | cr1::STOP);
    }

    fn write_dr(&mut self, value: u8) {
        match self.phase {
            Phase::StartSent => {
                self.events.push(Event::Header(value));
                if self.peer == Peer::Device {
                    self.addr = true;
                    self.phase = if value & 1 == 0 {
                        Phase::Transmit
                    } else {
                        Phase::Receive
                    };
                } else {
                    self.phase = Phase::Nacked;
                }
            }
            Phase::Transmit => {
                self.events.push(Event::Tx(value));
                self.tx_count += 1;
                if let Peer::Reader(count) = self.peer {
                    if self.tx_count >= count {
                        self.af = true;
                    }
                }
            }
            _ => {}
        }
    }

    fn read_dr(&mut self) -> u8 {
        match self.incoming.pop_front() {
            Some(byte) if self.phase == Phase::Receive => {
                self.events.push(Event::Rx(byte));
                byte
            }
            _ => 0,
        }
    }
}

impl I2cRegisters for SimBus {
    fn read(&mut self, reg: Register) -> u16 {
        match reg {
            Register::Cr1 => self.cr1,
            Register::Cr2 => self.cr2,
            Register::Oar1 => self.oar1,
            Register::Oar2 => self.oar2,
            Register::Ccr => self.ccr,
            Register::Trise => self.trise,
            Register::Sr1 => {
                self.sr1_read = true;
                self.status()
            }
            Register::Sr2 => {
                if self.sr1_read {
                    self.addr = false;
                }
                self.sr1_read = false;
                0
            }
            Register::Dr => {
                self.sr1_read = false;
                self.read_dr() as u16
            }
        }
    }

    fn write(&mut self, reg: Register, value: u16) {
        match reg {
            Register::Cr1 => self.write_cr1(value),
            Register::Cr2 => self.cr2 = value,
            Register::Oar1 => self.oar1 = value,
            Register::Oar2 => self.oar2 = value,
            Register::Ccr => self.ccr = value,
            Register::Trise => self.trise = value,
            Register::Sr1 => {
                // rc_w0: writing 0 clears AF, writing 1 has no effect
                if value & sr1::AF == 0 {
                    self.af = false;
                }
            }
            Register::Sr2 => {}
            Register::Dr => {
                self.sr1_read = false;
                self.write_dr(value as u8);
            }
        }
    }
}

/// Clock tree and pin bring-up stand-in
pub struct SimPlatform {
    pub sysclk_hz: u32,
    pub ppre1: u8,
    pub enabled: Option<(Instance, PinMap)>,
    pub delayed: u32,
}

impl SimPlatform {
    /// 72 MHz SYSCLK with APB1 at 36 MHz
    pub fn blue_pill() -> Self {
        Self {
            sysclk_hz: 72_000_000,
            ppre1: 4,
            enabled: None,
            delayed: 0,
        }
    }
}

impl Platform for SimPlatform {
    fn enable(&mut self, instance: Instance, pins: PinMap) {
        self.enabled = Some((instance, pins));
    }

    fn system_clock_hz(&self) -> u32 {
        self.sysclk_hz
    }

    fn apb1_prescaler(&self) -> u8 {
        self.ppre1
    }

    fn delay_cycles(&mut self, cycles: u32) {
        self.delayed += cycles;
    }
}
