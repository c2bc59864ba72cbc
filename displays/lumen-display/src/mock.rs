//! Simulated SSD1306 on a recording bus
//!
//! Captures every address phase as a [`Frame`] and decodes command and data
//! streams into a GDDRAM copy, advancing the pointer the way the selected
//! addressing mode does.

use std::vec::Vec;

use lumen_hal::i2c::{Header, I2cBus, Role};

use crate::command::{cmd, AddrMode, CONTROL_COMMAND, CONTROL_DATA};
use crate::framebuffer::{byte_index, BUFFER_SIZE, WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    Nack,
}

/// Bytes sent after one address phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub address: u8,
    /// Started without a stop since the previous frame
    pub restart: bool,
    /// Control byte followed by payload
    pub bytes: Vec<u8>,
}

impl Frame {
    pub fn control(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    pub fn payload(&self) -> &[u8] {
        self.bytes.get(1..).unwrap_or(&[])
    }
}

pub struct MockPanel {
    pub gddram: [u8; BUFFER_SIZE],
    pub frames: Vec<Frame>,
    pub starts: usize,
    pub stops: usize,
    pub held: bool,
    pub contrast: u8,
    pub inverted: bool,
    pub on: bool,
    pub scrolling: bool,
    pub addr_mode: AddrMode,
    col: u8,
    page: u8,
    cols: (u8, u8),
    pages: (u8, u8),
    restart: bool,
    current: Option<Frame>,
    requests: usize,
    fail_at_request: Option<usize>,
}

impl MockPanel {
    pub fn new() -> Self {
        Self {
            gddram: [0; BUFFER_SIZE],
            frames: Vec::new(),
            starts: 0,
            stops: 0,
            held: false,
            contrast: 0x80,
            inverted: false,
            on: false,
            scrolling: false,
            addr_mode: AddrMode::Horizontal,
            col: 0,
            page: 0,
            cols: (0, 127),
            pages: (0, 7),
            restart: false,
            current: None,
            requests: 0,
            fail_at_request: None,
        }
    }

    /// NACK the `n`th address phase (0-based) and every one after it
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at_request: Some(n),
            ..Self::new()
        }
    }

    /// Panel with random GDDRAM content, as after power-up
    pub fn with_garbage(fill: u8) -> Self {
        Self {
            gddram: [fill; BUFFER_SIZE],
            ..Self::new()
        }
    }

    pub fn data_frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames
            .iter()
            .filter(|f| f.control() == Some(CONTROL_DATA))
    }

    pub fn command_frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames
            .iter()
            .filter(|f| f.control() == Some(CONTROL_COMMAND))
    }

    /// Payloads of every command frame
    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.command_frames().map(|f| f.payload().to_vec()).collect()
    }

    /// Forget recorded traffic, keep panel state
    pub fn reset_log(&mut self) {
        self.frames.clear();
        self.starts = 0;
        self.stops = 0;
    }

    fn finish_frame(&mut self) {
        let Some(frame) = self.current.take() else {
            return;
        };
        match frame.control() {
            Some(CONTROL_COMMAND) => self.apply_commands(frame.payload()),
            Some(CONTROL_DATA) => {
                for &byte in frame.payload() {
                    self.write_ram(byte);
                }
            }
            _ => {}
        }
        self.frames.push(frame);
    }

    fn apply_commands(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            let opcode = bytes[i];
            let argc = cmd::arg_count(opcode);
            let args = &bytes[(i + 1).min(bytes.len())..(i + 1 + argc).min(bytes.len())];
            let paged = self.addr_mode == AddrMode::Page;
            match (opcode, args) {
                (cmd::SET_ADDR_MODE, &[mode]) => {
                    self.addr_mode = match mode & 0x03 {
                        0x00 => AddrMode::Horizontal,
                        0x01 => AddrMode::Vertical,
                        _ => AddrMode::Page,
                    };
                }
                // Windows are latched but do not move the pointer in page mode
                (cmd::SET_COLUMN_ADDR, &[start, end]) => {
                    self.cols = (start, end);
                    if !paged {
                        self.col = start;
                    }
                }
                (cmd::SET_PAGE_ADDR, &[start, end]) => {
                    self.pages = (start, end);
                    if !paged {
                        self.page = start;
                    }
                }
                (0x00..=0x0F, _) if paged => self.col = (self.col & 0xF0) | opcode,
                (0x10..=0x1F, _) if paged => self.col = (self.col & 0x0F) | ((opcode & 0x0F) << 4),
                (0xB0..=0xB7, _) if paged => self.page = opcode & 0x07,
                (cmd::SET_CONTRAST, &[value]) => self.contrast = value,
                (cmd::SET_NORMAL, _) => self.inverted = false,
                (cmd::SET_INVERSE, _) => self.inverted = true,
                (cmd::DISPLAY_ON, _) => self.on = true,
                (cmd::DISPLAY_OFF, _) => self.on = false,
                (cmd::SCROLL_ACTIVATE, _) => self.scrolling = true,
                (cmd::SCROLL_DEACTIVATE, _) => self.scrolling = false,
                _ => {}
            }
            i += 1 + argc;
        }
    }

    fn write_ram(&mut self, byte: u8) {
        self.gddram[byte_index(self.col, self.page)] = byte;
        match self.addr_mode {
            AddrMode::Horizontal => {
                self.col += 1;
                if self.col > self.cols.1 {
                    self.col = self.cols.0;
                    self.page += 1;
                    if self.page > self.pages.1 {
                        self.page = self.pages.0;
                    }
                }
            }
            AddrMode::Vertical => {
                self.page += 1;
                if self.page > self.pages.1 {
                    self.page = self.pages.0;
                    self.col += 1;
                    if self.col > self.cols.1 {
                        self.col = self.cols.0;
                    }
                }
            }
            AddrMode::Page => {
                self.col += 1;
                if self.col as usize >= WIDTH {
                    self.col = 0;
                }
            }
        }
    }

    fn push(&mut self, byte: u8) {
        if let Some(frame) = self.current.as_mut() {
            frame.bytes.push(byte);
        }
    }
}

impl I2cBus for MockPanel {
    type Error = MockError;

    fn start(&mut self) {
        self.finish_frame();
        self.starts += 1;
        self.restart = self.held;
        self.held = true;
    }

    fn stop(&mut self) {
        self.finish_frame();
        self.stops += 1;
        self.held = false;
    }

    fn request(&mut self, header: Header) -> Result<(), Self::Error> {
        let n = self.requests;
        self.requests += 1;
        if self.fail_at_request.is_some_and(|at| n >= at) {
            return Err(MockError::Nack);
        }
        self.current = Some(Frame {
            address: header.address(),
            restart: self.restart,
            bytes: Vec::new(),
        });
        Ok(())
    }

    fn write_byte(&mut self, data: u8) -> Result<(), Self::Error> {
        self.push(data);
        Ok(())
    }

    fn write_burst(&mut self, _role: Role, data: &[u8]) -> Result<(), Self::Error> {
        for &b in data {
            self.push(b);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        Ok(0)
    }

    fn read_burst(&mut self, _role: Role, buf: &mut [u8]) -> Result<usize, Self::Error> {
        buf.fill(0);
        Ok(buf.len())
    }
}

/// Delay that records what it was asked to wait
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}
