//! Boot image, built at compile time

use lumen_display::framebuffer::{byte_index, BUFFER_SIZE, PAGES, WIDTH};

/// One-pixel border with a diagonal checker band across the middle pages
pub static SPLASH: [u8; BUFFER_SIZE] = build();

const fn build() -> [u8; BUFFER_SIZE] {
    let mut image = [0u8; BUFFER_SIZE];
    let mut page = 0;
    while page < PAGES {
        let mut col = 0;
        while col < WIDTH {
            let mut byte = 0u8;
            if col == 0 || col == WIDTH - 1 {
                byte = 0xFF;
            }
            if page == 0 {
                byte |= 0x01;
            }
            if page == PAGES - 1 {
                byte |= 0x80;
            }
            if page == 3 || page == 4 {
                byte |= if (col / 4) % 2 == 0 { 0xAA } else { 0x55 };
            }
            image[byte_index(col as u8, page as u8)] = byte;
            col += 1;
        }
        page += 1;
    }
    image
}
