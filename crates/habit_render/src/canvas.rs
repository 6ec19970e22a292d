use std::convert::Infallible;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use image::GrayImage;

pub const DISPLAY_WIDTH: u32 = 800;
pub const DISPLAY_HEIGHT: u32 = 480;

/// Fixed-size two-color framebuffer. `BinaryColor::On` is ink (black on the
/// panel), `Off` is paper. Out-of-bounds draws clip silently.
pub struct Canvas {
    pixels: Vec<bool>,
}

impl Canvas {
    /// A blank, all-paper canvas.
    pub fn new() -> Self {
        Self {
            pixels: vec![false; (DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> u32 {
        DISPLAY_HEIGHT
    }

    /// Whether the pixel at (x, y) carries ink. Out-of-bounds reads as paper.
    pub fn is_ink(&self, x: i32, y: i32) -> bool {
        if !Self::in_bounds(x, y) {
            return false;
        }
        self.pixels[(y as u32 * DISPLAY_WIDTH + x as u32) as usize]
    }

    pub fn set_ink(&mut self, x: i32, y: i32, ink: bool) {
        if Self::in_bounds(x, y) {
            self.pixels[(y as u32 * DISPLAY_WIDTH + x as u32) as usize] = ink;
        }
    }

    /// Total ink coverage, mostly useful in tests.
    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }

    /// Run a drawable against this canvas. The draw target is infallible, so
    /// this returns the drawable's output directly.
    pub fn draw<D: Drawable<Color = BinaryColor>>(&mut self, drawable: &D) -> D::Output {
        match drawable.draw(self) {
            Ok(output) => output,
            Err(infallible) => match infallible {},
        }
    }

    /// 8-bit grayscale copy (ink = 0, paper = 255) for PNG previews.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(DISPLAY_WIDTH, DISPLAY_HEIGHT, |x, y| {
            if self.pixels[(y * DISPLAY_WIDTH + x) as usize] {
                image::Luma([0u8])
            } else {
                image::Luma([255u8])
            }
        })
    }

    /// Packed 1-bpp rows, MSB first, ink = 0 (the framing e-paper panels
    /// expect). `DISPLAY_WIDTH / 8` bytes per row.
    pub fn to_packed(&self) -> Vec<u8> {
        let mut out = vec![0xffu8; (DISPLAY_WIDTH / 8 * DISPLAY_HEIGHT) as usize];
        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                if self.pixels[(y * DISPLAY_WIDTH + x) as usize] {
                    let index = (y * DISPLAY_WIDTH / 8 + x / 8) as usize;
                    out[index] &= !(0x80 >> (x % 8));
                }
            }
        }
        out
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        (0..DISPLAY_WIDTH as i32).contains(&x) && (0..DISPLAY_HEIGHT as i32).contains(&y)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_ink(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}
