use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use micro_loudness::IntensityLevel;

use crate::pattern::{pattern_for, OverflowPolicy};

/// An addressable LED strip or matrix, written a whole frame at a time.
pub trait LedMatrix {
    type Error;

    /// Turns every LED off in the pending frame.
    fn clear(&mut self);
    fn set_pixel(&mut self, index: usize, r: u8, g: u8, b: u8);
    /// Pushes the pending frame out to the LEDs.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Clears the matrix, lights the pattern for `level` and commits the frame.
pub fn render_level<M: LedMatrix>(
    matrix: &mut M,
    level: IntensityLevel,
    policy: OverflowPolicy,
) -> Result<(), M::Error> {
    matrix.clear();
    for &(index, color) in pattern_for(level, policy) {
        matrix.set_pixel(index as usize, color.r(), color.g(), color.b());
    }
    matrix.flush()
}

/// Pending frame for LED drivers that send all pixels in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelFrame<const N: usize> {
    pixels: [Rgb888; N],
}

impl<const N: usize> PixelFrame<N> {
    pub const fn new() -> Self {
        Self {
            pixels: [Rgb888::BLACK; N],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [Rgb888::BLACK; N];
    }

    /// Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, color: Rgb888) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    pub fn pixels(&self) -> &[Rgb888; N] {
        &self.pixels
    }

    /// Draws the frame as a grid of `cell`-sized squares, `columns` wide,
    /// filled row by row from the top-left.
    pub fn draw<D>(&self, target: &mut D, columns: usize, cell: u32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let columns = columns.max(1);
        for (i, &color) in self.pixels.iter().enumerate() {
            let x = (i % columns) as i32 * cell as i32;
            let y = (i / columns) as i32 * cell as i32;
            Rectangle::new(Point::new(x, y), Size::new_equal(cell))
                .into_styled(PrimitiveStyle::with_fill(color))
                .draw(target)?;
        }
        Ok(())
    }
}

impl<const N: usize> Default for PixelFrame<N> {
    fn default() -> Self {
        Self::new()
    }
}
