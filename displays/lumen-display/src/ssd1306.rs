//! SSD1306 OLED display driver
//!
//! Driver for 128x64 SSD1306 panels on any [`I2cBus`]. Keeps a shadow copy of
//! GDDRAM so single pixels can be changed with one read-modify-write of the
//! affected byte.
//!
//! # Bus framing
//!
//! Command groups are one transaction: start, address, `0x00`, the command
//! bytes, stop. Data is pushed one byte per address phase (start, address,
//! `0x40`, byte) with repeated starts between bytes and a single stop at the
//! end of the stream. Any bus error releases the bus with a stop before it is
//! returned.
//!
//! Full frames (bitmaps and shadow pushes) always go out in horizontal
//! addressing; a different configured mode is restored afterwards.

use embedded_hal::delay::DelayNs;
use lumen_hal::i2c::{Header, I2cBus, Role};

use crate::command::{
    self, cmd, AddrMode, DiagonalDirection, FrameRate, HorizontalDirection, Orientation, Page,
    Scroll, VerticalDirection, CONTROL_DATA, INIT_CONTRAST_INDEX, INIT_SEQUENCE,
};
use crate::config::DisplayConfig;
use crate::error::DisplayError;
use crate::font::glyph;
use crate::framebuffer::{byte_index, Framebuffer, PixelAddr, BUFFER_SIZE, HEIGHT, WIDTH};
use crate::raster::{self, Plot, RasterStats};

/// GDDRAM address pointer as the controller advances it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    col: u8,
    page: u8,
    col_start: u8,
    page_start: u8,
}

impl Cursor {
    const ORIGIN: Self = Self {
        col: 0,
        page: 0,
        col_start: 0,
        page_start: 0,
    };

    fn index(&self) -> usize {
        byte_index(self.col, self.page)
    }

    /// Step past one data byte
    ///
    /// Column and page windows end at 127 and 7. In page addressing the
    /// column wraps to 0 and the page stays put.
    fn advance(&mut self, mode: AddrMode) {
        let last_col = (WIDTH - 1) as u8;
        let last_page = 7;
        match mode {
            AddrMode::Horizontal => {
                if self.col < last_col {
                    self.col += 1;
                } else {
                    self.col = self.col_start;
                    self.page = if self.page < last_page {
                        self.page + 1
                    } else {
                        self.page_start
                    };
                }
            }
            AddrMode::Vertical => {
                if self.page < last_page {
                    self.page += 1;
                } else {
                    self.page = self.page_start;
                    self.col = if self.col < last_col {
                        self.col + 1
                    } else {
                        self.col_start
                    };
                }
            }
            AddrMode::Page => {
                self.col = if self.col < last_col { self.col + 1 } else { 0 };
            }
        }
    }
}

/// Run `f` on the bus; on error issue a stop so the bus is not left claimed
fn guarded<B, T, F>(bus: &mut B, f: F) -> Result<T, DisplayError<B::Error>>
where
    B: I2cBus,
    F: FnOnce(&mut B) -> Result<T, B::Error>,
{
    f(&mut *bus).map_err(|e| {
        bus.stop();
        #[cfg(feature = "defmt")]
        defmt::warn!("display: bus error, released bus");
        DisplayError::Bus(e)
    })
}

/// One data byte in its own address phase, no stop
fn push_data_byte<B: I2cBus>(bus: &mut B, header: Header, byte: u8) -> Result<(), B::Error> {
    bus.start();
    bus.request(header)?;
    bus.write_byte(CONTROL_DATA)?;
    bus.write_byte(byte)
}

/// SSD1306 OLED driver
pub struct Ssd1306<B> {
    bus: B,
    config: DisplayConfig,
    /// Shadow of GDDRAM
    framebuffer: Framebuffer,
    cursor: Cursor,
    addr_mode: AddrMode,
}

impl<B: I2cBus> Ssd1306<B> {
    /// Create a driver; nothing is sent until [`init`](Self::init)
    pub fn new(bus: B, config: DisplayConfig) -> Self {
        Self {
            bus,
            config,
            framebuffer: Framebuffer::new(),
            cursor: Cursor::ORIGIN,
            addr_mode: AddrMode::Horizontal,
        }
    }

    /// Initialize the display
    ///
    /// Waits out the power-up delay, sends the start-up sequence in one
    /// transaction, then clears the panel.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DisplayError<B::Error>> {
        delay.delay_ms(self.config.startup_delay_ms);

        let mut sequence = INIT_SEQUENCE;
        sequence[INIT_CONTRAST_INDEX] = self.config.contrast;
        self.send_frame(&sequence)?;

        self.addr_mode = AddrMode::Horizontal;
        self.cursor = Cursor::ORIGIN;

        self.clear()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("display: ready at {:#x}", self.config.address);

        Ok(())
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Shadow framebuffer
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    #[cfg(feature = "graphics")]
    pub(crate) fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    /// Current GDDRAM pointer as (column, page)
    pub fn cursor(&self) -> (u8, u8) {
        (self.cursor.col, self.cursor.page)
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Release the bus
    pub fn release(self) -> B {
        self.bus
    }

    fn header(&self) -> Header {
        Header::write(self.config.address)
    }

    /// Send a frame whose first byte is already the control byte
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), DisplayError<B::Error>> {
        let header = self.header();
        guarded(&mut self.bus, |bus| {
            bus.start();
            bus.request(header)?;
            bus.write_burst(Role::Initiator, frame)?;
            bus.stop();
            Ok(())
        })
    }

    fn send_commands(&mut self, bytes: &[u8]) -> Result<(), DisplayError<B::Error>> {
        let frame = command::frame(bytes).ok_or(DisplayError::FrameTooLong)?;
        self.send_frame(&frame)
    }

    /// Push `data` at the cursor, mirroring each byte into the shadow
    fn push_data<I>(&mut self, data: I) -> Result<usize, DisplayError<B::Error>>
    where
        I: IntoIterator<Item = u8>,
    {
        let header = self.header();
        let Self {
            bus,
            framebuffer,
            cursor,
            addr_mode,
            ..
        } = self;

        guarded(bus, |bus| {
            let mut sent = 0;
            for byte in data {
                push_data_byte(bus, header, byte)?;
                framebuffer.set_byte(cursor.index(), byte);
                cursor.advance(*addr_mode);
                sent += 1;
            }
            if sent > 0 {
                bus.stop();
            }
            Ok(sent)
        })
    }

    /// Move the pointer to `(col, page)`
    ///
    /// In horizontal and vertical addressing this also sets the column window
    /// to `[col, 127]` and the page window to `[page, 7]`. Page addressing
    /// has no windows and uses the page-start and column-nibble commands.
    pub fn move_cursor(&mut self, col: u8, page: Page) -> Result<(), DisplayError<B::Error>> {
        if col as usize >= WIDTH {
            return Err(DisplayError::InvalidCoordinates);
        }
        let page = page.index();
        match self.addr_mode {
            AddrMode::Page => self.send_commands(&[
                cmd::SET_PAGE_START | page,
                cmd::SET_LOW_COLUMN | (col & 0x0F),
                cmd::SET_HIGH_COLUMN | (col >> 4),
            ])?,
            AddrMode::Horizontal | AddrMode::Vertical => self.send_commands(&[
                cmd::SET_COLUMN_ADDR,
                col,
                (WIDTH - 1) as u8,
                cmd::SET_PAGE_ADDR,
                page,
                7,
            ])?,
        }
        self.cursor = Cursor {
            col,
            page,
            col_start: col,
            page_start: page,
        };
        Ok(())
    }

    /// Write text at the cursor, 5 columns per character
    ///
    /// The cursor is not repositioned between characters; text continues
    /// wherever the controller's address pointer goes. Characters outside
    /// the font render as spaces.
    pub fn draw_char(&mut self, text: &str) -> Result<usize, DisplayError<B::Error>> {
        self.push_data(text.chars().flat_map(|ch| glyph(ch).iter().copied()))
    }

    /// Blit a full frame from the origin
    ///
    /// `image` is in framebuffer layout whatever the addressing mode.
    pub fn draw_bitmap(&mut self, image: &[u8; BUFFER_SIZE]) -> Result<(), DisplayError<B::Error>> {
        self.in_horizontal_mode(|d| {
            d.move_cursor(0, Page::Page0)?;
            d.push_data(image.iter().copied())?;
            Ok(())
        })
    }

    /// Light the pixel at `(x, y)` and push its byte
    ///
    /// The shadow changes only once the panel has taken the byte.
    pub fn draw_pixel(&mut self, x: i32, y: i32) -> Result<Plot, DisplayError<B::Error>> {
        let Some(addr) = PixelAddr::new(x, y) else {
            return Ok(Plot::Clipped);
        };
        let byte = self.framebuffer.as_bytes()[addr.index()] | addr.mask;
        self.push_byte(addr.col, addr.page, byte)?;
        Ok(Plot::Drawn)
    }

    /// Turn off the pixel at `(x, y)` and push its byte
    pub fn clear_pixel(&mut self, x: i32, y: i32) -> Result<Plot, DisplayError<B::Error>> {
        let Some(addr) = PixelAddr::new(x, y) else {
            return Ok(Plot::Clipped);
        };
        let byte = self.framebuffer.as_bytes()[addr.index()] & !addr.mask;
        self.push_byte(addr.col, addr.page, byte)?;
        Ok(Plot::Drawn)
    }

    /// Run `f` with the controller in horizontal addressing
    fn in_horizontal_mode<T, F>(&mut self, f: F) -> Result<T, DisplayError<B::Error>>
    where
        F: FnOnce(&mut Self) -> Result<T, DisplayError<B::Error>>,
    {
        let mode = self.addr_mode;
        if mode == AddrMode::Horizontal {
            return f(self);
        }
        self.display_addr_mode(AddrMode::Horizontal)?;
        let result = f(self);
        let restored = self.display_addr_mode(mode);
        let value = result?;
        restored?;
        Ok(value)
    }

    /// Move to `(col, page)` and push one byte, mirrored into the shadow
    fn push_byte(&mut self, col: u8, page: u8, byte: u8) -> Result<(), DisplayError<B::Error>> {
        let page = Page::from_index(page).ok_or(DisplayError::InvalidCoordinates)?;
        self.move_cursor(col, page)?;
        self.push_data([byte])?;
        Ok(())
    }

    /// Bresenham line between two points, both included
    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    ) -> Result<RasterStats, DisplayError<B::Error>> {
        raster::line((x0, y0), (x1, y1), |x, y| self.draw_pixel(x, y))
    }

    /// Vertical line at `x` from `y0` to `y1`
    pub fn draw_vertical_line(
        &mut self,
        x: i32,
        y0: i32,
        y1: i32,
    ) -> Result<RasterStats, DisplayError<B::Error>> {
        raster::vertical_line(x, y0, y1, |x, y| self.draw_pixel(x, y))
    }

    /// Horizontal line at `y` from `x0` to `x1`
    pub fn draw_horizontal_line(
        &mut self,
        y: i32,
        x0: i32,
        x1: i32,
    ) -> Result<RasterStats, DisplayError<B::Error>> {
        raster::horizontal_line(y, x0, x1, |x, y| self.draw_pixel(x, y))
    }

    /// Circle outline around `(cx, cy)`
    pub fn draw_circle(
        &mut self,
        cx: i32,
        cy: i32,
        radius: u8,
    ) -> Result<RasterStats, DisplayError<B::Error>> {
        raster::circle(cx, cy, radius, |x, y| self.draw_pixel(x, y))
    }

    /// Rectangle outline with its top-left corner at `(x, y)`
    pub fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<RasterStats, DisplayError<B::Error>> {
        raster::rect(x, y, width, height, |x, y| self.draw_pixel(x, y))
    }

    /// Blank the shadow and the panel
    pub fn clear(&mut self) -> Result<(), DisplayError<B::Error>> {
        self.ram_clear();
        self.ram_update_full()
    }

    /// Contrast, 0..=255 (reset value 0x80)
    pub fn display_contrast(&mut self, value: u8) -> Result<(), DisplayError<B::Error>> {
        self.send_commands(&[cmd::SET_CONTRAST, value])
    }

    /// Invert: lit bits turn pixels off
    pub fn display_invert(&mut self, inverted: bool) -> Result<(), DisplayError<B::Error>> {
        let op = if inverted {
            cmd::SET_INVERSE
        } else {
            cmd::SET_NORMAL
        };
        self.send_commands(&[op])
    }

    pub fn display_on(&mut self, on: bool) -> Result<(), DisplayError<B::Error>> {
        let op = if on {
            cmd::DISPLAY_ON
        } else {
            cmd::DISPLAY_OFF
        };
        self.send_commands(&[op])
    }

    /// Mirror the panel along one axis
    pub fn display_flip(
        &mut self,
        orientation: Orientation,
        flipped: bool,
    ) -> Result<(), DisplayError<B::Error>> {
        self.send_commands(&[orientation.opcode(flipped)])
    }

    /// Select how the GDDRAM pointer advances after each data byte
    pub fn display_addr_mode(&mut self, mode: AddrMode) -> Result<(), DisplayError<B::Error>> {
        self.send_commands(&[cmd::SET_ADDR_MODE, mode as u8])?;
        self.addr_mode = mode;
        Ok(())
    }

    /// Configure horizontal scrolling of pages `start..=end`
    ///
    /// Takes effect on [`display_scroll_state(true)`](Self::display_scroll_state).
    pub fn display_scroll_horizontal(
        &mut self,
        dir: HorizontalDirection,
        rate: FrameRate,
        start: Page,
        end: Page,
    ) -> Result<(), DisplayError<B::Error>> {
        if start > end {
            return Err(DisplayError::InvalidScrollArea);
        }
        self.send_commands(&[
            dir.opcode(),
            0x00,
            start.index(),
            rate.bits(),
            end.index(),
            0x00,
            0xFF,
        ])
    }

    /// Configure diagonal scrolling of pages `start..=end` with `offset`
    /// rows of vertical movement per step
    pub fn display_scroll_diagonal(
        &mut self,
        dir: DiagonalDirection,
        rate: FrameRate,
        start: Page,
        end: Page,
        offset: u8,
    ) -> Result<(), DisplayError<B::Error>> {
        if start > end || offset as usize >= HEIGHT {
            return Err(DisplayError::InvalidScrollArea);
        }
        self.send_commands(&[
            dir.opcode(),
            0x00,
            start.index(),
            rate.bits(),
            end.index(),
            offset,
        ])
    }

    /// Keep the top `fixed` rows still; the remaining rows scroll vertically
    pub fn display_set_vertical_scroll_area(
        &mut self,
        fixed: u8,
    ) -> Result<(), DisplayError<B::Error>> {
        if fixed as usize > HEIGHT {
            return Err(DisplayError::InvalidScrollArea);
        }
        self.send_commands(&[cmd::SET_VERTICAL_SCROLL_AREA, fixed, HEIGHT as u8 - fixed])
    }

    /// Start or stop the last configured scroll
    pub fn display_scroll_state(&mut self, active: bool) -> Result<(), DisplayError<B::Error>> {
        let op = if active {
            cmd::SCROLL_ACTIVATE
        } else {
            cmd::SCROLL_DEACTIVATE
        };
        self.send_commands(&[op])
    }

    /// Vertical scroll with pages `0..=freeze` held in place
    ///
    /// Built from a diagonal scroll on page 7 alone plus a scroll area whose
    /// fixed rows cover the frozen pages. Content on page 7 moves sideways.
    pub fn display_scroll_vertical(
        &mut self,
        dir: VerticalDirection,
        rate: FrameRate,
        freeze: Page,
    ) -> Result<(), DisplayError<B::Error>> {
        self.display_scroll_diagonal(
            DiagonalDirection::Right,
            rate,
            Page::Page7,
            Page::Page7,
            dir.offset(),
        )?;
        self.display_set_vertical_scroll_area(8 * (freeze.index() + 1))
    }

    /// Apply a scroll setup and start it; [`Scroll::None`] stops scrolling
    pub fn scroll(&mut self, scroll: Scroll) -> Result<(), DisplayError<B::Error>> {
        match scroll {
            Scroll::None => return self.display_scroll_state(false),
            Scroll::Horizontal {
                dir,
                rate,
                start,
                end,
            } => self.display_scroll_horizontal(dir, rate, start, end)?,
            Scroll::Diagonal {
                dir,
                rate,
                start,
                end,
                offset,
            } => self.display_scroll_diagonal(dir, rate, start, end, offset)?,
            Scroll::Vertical { dir, rate, freeze } => {
                self.display_scroll_vertical(dir, rate, freeze)?
            }
        }
        self.display_scroll_state(true)
    }

    /// OR `value` into the shadow byte at `index`; nothing is sent
    pub fn ram_write(&mut self, index: usize, value: u8) -> Result<(), DisplayError<B::Error>> {
        self.framebuffer
            .or_byte(index, value)
            .ok_or(DisplayError::InvalidCoordinates)?;
        Ok(())
    }

    /// OR `value` into the shadow byte at `index` and push that byte
    pub fn ram_update_byte(
        &mut self,
        index: usize,
        value: u8,
    ) -> Result<(), DisplayError<B::Error>> {
        let byte = self
            .framebuffer
            .byte(index)
            .ok_or(DisplayError::InvalidCoordinates)?
            | value;
        self.push_byte((index % WIDTH) as u8, (index / WIDTH) as u8, byte)
    }

    /// Push the whole shadow buffer from the origin
    pub fn ram_update_full(&mut self) -> Result<(), DisplayError<B::Error>> {
        self.in_horizontal_mode(|d| {
            d.move_cursor(0, Page::Page0)?;
            d.push_shadow()
        })
    }

    /// Stream the shadow at the cursor, which must be at the origin
    fn push_shadow(&mut self) -> Result<(), DisplayError<B::Error>> {
        let header = self.header();
        let Self {
            bus,
            framebuffer,
            cursor,
            addr_mode,
            ..
        } = self;

        guarded(bus, |bus| {
            for &byte in framebuffer.as_bytes() {
                push_data_byte(bus, header, byte)?;
                cursor.advance(*addr_mode);
            }
            bus.stop();
            Ok(())
        })
    }

    /// Blank the shadow buffer; nothing is sent
    pub fn ram_clear(&mut self) {
        self.framebuffer.clear();
    }
}
