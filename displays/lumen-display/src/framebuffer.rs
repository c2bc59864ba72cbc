//! Shadow copy of the panel's GDDRAM
//!
//! Byte `i` covers column `i % 128` of page `i / 128`; bit `b` of that byte is
//! pixel row `8 * page + b`. This is the layout the controller uses in
//! horizontal addressing mode, so the buffer can be streamed as-is.

/// Panel width in pixels
pub const WIDTH: usize = 128;
/// Panel height in pixels
pub const HEIGHT: usize = 64;
/// Rows of 8 pixels
pub const PAGES: usize = HEIGHT / 8;
/// Bytes in a full frame
pub const BUFFER_SIZE: usize = WIDTH * PAGES;

/// A pixel resolved to its byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelAddr {
    /// Column (0..128)
    pub col: u8,
    /// Page (0..8)
    pub page: u8,
    /// Single-bit mask within the byte
    pub mask: u8,
}

impl PixelAddr {
    /// Resolve `(x, y)`, or `None` when it lies off the panel
    pub fn new(x: i32, y: i32) -> Option<Self> {
        if !(0..WIDTH as i32).contains(&x) || !(0..HEIGHT as i32).contains(&y) {
            return None;
        }
        Some(Self {
            col: x as u8,
            page: (y / 8) as u8,
            mask: 1 << (y % 8),
        })
    }

    /// Index into the framebuffer
    pub const fn index(&self) -> usize {
        byte_index(self.col, self.page)
    }
}

/// Framebuffer index of `(col, page)`
pub const fn byte_index(col: u8, page: u8) -> usize {
    page as usize * WIDTH + col as usize
}

/// 1 bit per pixel frame buffer
#[derive(Clone)]
pub struct Framebuffer {
    buf: [u8; BUFFER_SIZE],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; BUFFER_SIZE],
        }
    }

    pub fn as_bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.buf
    }

    pub fn byte(&self, index: usize) -> Option<u8> {
        self.buf.get(index).copied()
    }

    /// Overwrite one byte
    pub fn set_byte(&mut self, index: usize, value: u8) -> Option<u8> {
        let slot = self.buf.get_mut(index)?;
        *slot = value;
        Some(value)
    }

    /// OR `value` into one byte, returning the merged byte
    pub fn or_byte(&mut self, index: usize, value: u8) -> Option<u8> {
        let slot = self.buf.get_mut(index)?;
        *slot |= value;
        Some(*slot)
    }

    /// Set a pixel, returning the updated byte
    pub fn set_pixel(&mut self, addr: PixelAddr) -> u8 {
        let slot = &mut self.buf[addr.index()];
        *slot |= addr.mask;
        *slot
    }

    /// Clear a pixel, returning the updated byte
    pub fn clear_pixel(&mut self, addr: PixelAddr) -> u8 {
        let slot = &mut self.buf[addr.index()];
        *slot &= !addr.mask;
        *slot
    }

    /// Whether the pixel at `(x, y)` is lit; off-panel pixels are unlit
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        PixelAddr::new(x, y).is_some_and(|a| self.buf[a.index()] & a.mask != 0)
    }

    pub fn load(&mut self, image: &[u8; BUFFER_SIZE]) {
        self.buf.copy_from_slice(image);
    }

    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Set every byte to `value`
    pub fn fill(&mut self, value: u8) {
        self.buf.fill(value);
    }

    /// Number of lit pixels
    pub fn count_lit(&self) -> u32 {
        self.buf.iter().map(|b| b.count_ones()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_addressing() {
        let addr = PixelAddr::new(5, 13).unwrap();
        assert_eq!(addr.col, 5);
        assert_eq!(addr.page, 1);
        assert_eq!(addr.mask, 0b0010_0000);
        assert_eq!(addr.index(), 133);

        let corner = PixelAddr::new(127, 63).unwrap();
        assert_eq!(corner.index(), BUFFER_SIZE - 1);
        assert_eq!(corner.mask, 0x80);
    }

    #[test]
    fn test_off_panel_pixels() {
        assert!(PixelAddr::new(-1, 0).is_none());
        assert!(PixelAddr::new(128, 0).is_none());
        assert!(PixelAddr::new(0, 64).is_none());
        assert!(PixelAddr::new(0, -3).is_none());
    }

    #[test]
    fn test_set_and_clear_only_touch_one_bit() {
        let mut fb = Framebuffer::new();
        fb.set_byte(byte_index(10, 2), 0b1010_1010);

        let addr = PixelAddr::new(10, 16).unwrap();
        assert_eq!(fb.set_pixel(addr), 0b1010_1011);

        let other = PixelAddr::new(10, 17).unwrap();
        assert_eq!(fb.clear_pixel(other), 0b1010_1001);
        assert!(fb.pixel(10, 16));
        assert!(!fb.pixel(10, 17));
    }

    #[test]
    fn test_or_byte_merges() {
        let mut fb = Framebuffer::new();
        assert_eq!(fb.or_byte(0, 0x0F), Some(0x0F));
        assert_eq!(fb.or_byte(0, 0xF0), Some(0xFF));
        assert_eq!(fb.or_byte(BUFFER_SIZE, 0x01), None);
    }

    #[test]
    fn test_count_and_clear() {
        let mut fb = Framebuffer::new();
        fb.load(&[0x01; BUFFER_SIZE]);
        assert_eq!(fb.count_lit(), BUFFER_SIZE as u32);
        fb.clear();
        assert_eq!(fb.count_lit(), 0);
    }
}
