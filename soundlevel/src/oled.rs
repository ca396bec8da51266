use display_interface::DisplayError;
use embassy_rp::i2c::{Blocking, I2c, Instance};
use embedded_graphics::{
    draw_target::DrawTargetExt,
    geometry::{Point, Size},
    primitives::Rectangle,
};
use micro_meter::{draw_text_line, RenderRegion, TextPanel};
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

type Display<'d, T> = Ssd1306<
    I2CInterface<I2c<'d, T, Blocking>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// SSD1306 128x64 over I2C, buffered.
pub struct Oled<'d, T: Instance> {
    display: Display<'d, T>,
    region: RenderRegion,
}

impl<'d, T: Instance> Oled<'d, T> {
    /// Runs the controller init sequence.
    pub fn new(i2c: I2c<'d, T, Blocking>) -> Result<Self, DisplayError> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init()?;

        Ok(Self {
            display,
            region: RenderRegion::FULL_128X64,
        })
    }

    fn region_bounds(&self) -> Rectangle {
        Rectangle::new(
            Point::zero(),
            Size::new(self.region.columns as u32, self.region.pages as u32 * 8),
        )
    }
}

impl<T: Instance> TextPanel for Oled<'_, T> {
    type Error = DisplayError;

    fn define_render_region(&mut self, region: RenderRegion) {
        self.region = region;
    }

    fn clear_framebuffer(&mut self) {
        self.display.clear_buffer();
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<(), DisplayError> {
        let bounds = self.region_bounds();
        draw_text_line(&mut self.display.clipped(&bounds), x, y, text)
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.display.flush()
    }
}
