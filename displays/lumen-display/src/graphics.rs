//! embedded-graphics support
//!
//! [`Ssd1306`] is a [`DrawTarget`] over [`BinaryColor`]. Drawing goes to the
//! shadow framebuffer only; call [`Ssd1306::ram_update_full`] to show the
//! result.
//!
//! ```rust,ignore
//! use embedded_graphics::{prelude::*, primitives::{Circle, PrimitiveStyle}};
//!
//! Circle::new(Point::new(40, 8), 48)
//!     .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
//!     .draw(&mut display)?;
//! display.ram_update_full()?;
//! ```

use core::convert::Infallible;

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
    Pixel,
};
use lumen_hal::i2c::I2cBus;

use crate::framebuffer::{PixelAddr, HEIGHT, WIDTH};
use crate::ssd1306::Ssd1306;

impl<B: I2cBus> DrawTarget for Ssd1306<B> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let fb = self.framebuffer_mut();
        for Pixel(point, color) in pixels {
            let Some(addr) = PixelAddr::new(point.x, point.y) else {
                continue;
            };
            match color {
                BinaryColor::On => fb.set_pixel(addr),
                BinaryColor::Off => fb.clear_pixel(addr),
            };
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = match color {
            BinaryColor::On => 0xFF,
            BinaryColor::Off => 0x00,
        };
        self.framebuffer_mut().fill(fill);
        Ok(())
    }
}

impl<B: I2cBus> OriginDimensions for Ssd1306<B> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}
