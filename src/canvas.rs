//! `embedded-graphics` drawing surface over the framebuffer
//!
//! Colors are [`Gray8`]; luma is scaled to the nearest brightness level.

use core::convert::Infallible;

use embedded_graphics::Pixel;
use embedded_graphics::pixelcolor::{Gray8, GrayColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Size};

use crate::framebuffer::Framebuffer;

/// Brightness level closest to `luma` on a display with `planes` planes
#[allow(clippy::cast_possible_truncation)]
pub const fn luma_to_level(luma: u8, planes: usize) -> u8 {
    ((luma as usize * planes + 127) / 255) as u8
}

/// Borrowed drawing target; see [`Framebuffer::canvas`]
pub struct Canvas<'a, const PLANES: usize, const WIDTH: usize, const HEIGHT: usize, const LINE_BYTES: usize>
{
    framebuffer: &'a Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES>,
}

impl<'a, const PLANES: usize, const WIDTH: usize, const HEIGHT: usize, const LINE_BYTES: usize>
    Canvas<'a, PLANES, WIDTH, HEIGHT, LINE_BYTES>
{
    pub const fn new(framebuffer: &'a Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES>) -> Self {
        Self { framebuffer }
    }

    pub const fn framebuffer(&self) -> &'a Framebuffer<PLANES, WIDTH, HEIGHT, LINE_BYTES> {
        self.framebuffer
    }
}

impl<const PLANES: usize, const WIDTH: usize, const HEIGHT: usize, const LINE_BYTES: usize>
    OriginDimensions for Canvas<'_, PLANES, WIDTH, HEIGHT, LINE_BYTES>
{
    #[allow(clippy::cast_possible_truncation)]
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<const PLANES: usize, const WIDTH: usize, const HEIGHT: usize, const LINE_BYTES: usize>
    DrawTarget for Canvas<'_, PLANES, WIDTH, HEIGHT, LINE_BYTES>
{
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.framebuffer
                .set_pixel(point, luma_to_level(color.luma(), PLANES));
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer.fill(luma_to_level(color.luma(), PLANES));
        Ok(())
    }
}
