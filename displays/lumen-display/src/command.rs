//! SSD1306 command set and argument types

use heapless::Vec;

/// Control byte: the rest of the frame is commands
pub const CONTROL_COMMAND: u8 = 0x00;
/// Control byte: the rest of the frame is GDDRAM data
pub const CONTROL_DATA: u8 = 0x40;

/// Longest command frame the driver builds (the init sequence)
pub const MAX_FRAME: usize = 32;

/// Command frame including its control byte
pub type CommandFrame = Vec<u8, MAX_FRAME>;

/// SSD1306 commands
pub mod cmd {
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_RESUME: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;

    pub const SCROLL_HORIZONTAL: u8 = 0x26;
    pub const SCROLL_DIAGONAL: u8 = 0x28;
    pub const SCROLL_DEACTIVATE: u8 = 0x2E;
    pub const SCROLL_ACTIVATE: u8 = 0x2F;
    pub const SET_VERTICAL_SCROLL_AREA: u8 = 0xA3;

    pub const SET_ADDR_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    /// Page addressing only: low nibble of the column in bits 3:0
    pub const SET_LOW_COLUMN: u8 = 0x00;
    /// Page addressing only: high nibble of the column in bits 3:0
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    /// Page addressing only: page in bits 2:0
    pub const SET_PAGE_START: u8 = 0xB0;

    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP_NORMAL: u8 = 0xA0;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_COM_SCAN_INC: u8 = 0xC0;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;

    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;

    /// Number of argument bytes that follow `opcode`
    pub const fn arg_count(opcode: u8) -> usize {
        match opcode {
            SET_CONTRAST | SET_ADDR_MODE | SET_MUX_RATIO | SET_DISPLAY_OFFSET | SET_COM_PINS
            | SET_CLOCK_DIV | SET_PRECHARGE | SET_VCOM_DETECT | SET_CHARGE_PUMP => 1,
            SET_COLUMN_ADDR | SET_PAGE_ADDR | SET_VERTICAL_SCROLL_AREA => 2,
            0x26 | 0x27 => 6,
            0x29 | 0x2A => 5,
            _ => 0,
        }
    }
}

/// GDDRAM page (group of 8 pixel rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Page {
    Page0 = 0,
    Page1 = 1,
    Page2 = 2,
    Page3 = 3,
    Page4 = 4,
    Page5 = 5,
    Page6 = 6,
    Page7 = 7,
}

impl Page {
    pub const ALL: [Page; 8] = [
        Page::Page0,
        Page::Page1,
        Page::Page2,
        Page::Page3,
        Page::Page4,
        Page::Page5,
        Page::Page6,
        Page::Page7,
    ];

    /// Page holding pixel row `index * 8`
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Scroll step interval in frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FrameRate {
    Frames5 = 0,
    Frames64 = 1,
    Frames128 = 2,
    Frames256 = 3,
    Frames3 = 4,
    Frames4 = 5,
    Frames25 = 6,
    Frames2 = 7,
}

impl FrameRate {
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Horizontal scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HorizontalDirection {
    Right,
    Left,
}

impl HorizontalDirection {
    /// 0x26 (right) or 0x27 (left)
    pub const fn opcode(self) -> u8 {
        match self {
            HorizontalDirection::Right => cmd::SCROLL_HORIZONTAL,
            HorizontalDirection::Left => cmd::SCROLL_HORIZONTAL | 1,
        }
    }
}

/// Horizontal component of a diagonal scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagonalDirection {
    Right,
    Left,
}

impl DiagonalDirection {
    /// 0x29 (vertical + right) or 0x2A (vertical + left)
    pub const fn opcode(self) -> u8 {
        match self {
            DiagonalDirection::Right => cmd::SCROLL_DIAGONAL | 1,
            DiagonalDirection::Left => cmd::SCROLL_DIAGONAL | 2,
        }
    }
}

/// Vertical scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VerticalDirection {
    Up,
    Down,
}

impl VerticalDirection {
    /// Rows moved per scroll step
    pub const fn offset(self) -> u8 {
        match self {
            VerticalDirection::Up => 0x01,
            VerticalDirection::Down => 0x3F,
        }
    }
}

/// GDDRAM addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AddrMode {
    #[default]
    Horizontal = 0x00,
    Vertical = 0x01,
    Page = 0x02,
}

/// Axis for [`display_flip`](crate::Ssd1306::display_flip)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Segment remap (mirror left/right)
    Horizontal,
    /// COM scan direction (mirror top/bottom)
    Vertical,
}

impl Orientation {
    pub const fn opcode(self, flipped: bool) -> u8 {
        match (self, flipped) {
            (Orientation::Horizontal, true) => cmd::SET_SEG_REMAP_NORMAL,
            (Orientation::Horizontal, false) => cmd::SET_SEG_REMAP,
            (Orientation::Vertical, true) => cmd::SET_COM_SCAN_INC,
            (Orientation::Vertical, false) => cmd::SET_COM_SCAN_DEC,
        }
    }
}

/// Scroll engine setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scroll {
    /// Scrolling stopped
    None,
    Horizontal {
        dir: HorizontalDirection,
        rate: FrameRate,
        start: Page,
        end: Page,
    },
    Diagonal {
        dir: DiagonalDirection,
        rate: FrameRate,
        start: Page,
        end: Page,
        /// Vertical offset per step (0..=63)
        offset: u8,
    },
    /// Pages up to and including `freeze` stay put
    Vertical {
        dir: VerticalDirection,
        rate: FrameRate,
        freeze: Page,
    },
}

/// Start-up command sequence, control byte included
pub const INIT_SEQUENCE: [u8; 27] = [
    CONTROL_COMMAND,
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0xF0,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x20,
    cmd::SET_CHARGE_PUMP,
    0x14,
    cmd::SET_ADDR_MODE,
    AddrMode::Horizontal as u8,
    cmd::SET_START_LINE,
    cmd::SET_SEG_REMAP,
    cmd::SET_MUX_RATIO,
    0x3F,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0x80,
    cmd::DISPLAY_RESUME,
    cmd::SET_NORMAL,
    cmd::SCROLL_DEACTIVATE,
    cmd::DISPLAY_ON,
];

/// Index of the contrast argument in [`INIT_SEQUENCE`]
pub const INIT_CONTRAST_INDEX: usize = 22;

/// Build a command frame from opcode/argument bytes
///
/// Returns `None` when the bytes and the control byte exceed [`MAX_FRAME`].
pub fn frame(bytes: &[u8]) -> Option<CommandFrame> {
    let mut frame = CommandFrame::new();
    frame.push(CONTROL_COMMAND).ok()?;
    frame.extend_from_slice(bytes).ok()?;
    Some(frame)
}
