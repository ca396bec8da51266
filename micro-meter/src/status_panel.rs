use core::fmt::Write;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::Point,
    mono_font::{ascii::FONT_5X8, MonoTextStyle},
    pixelcolor::BinaryColor,
    text::{Baseline, Text},
    Drawable,
};
use heapless::String;
use micro_loudness::Reading;

/// Vertical distance between status lines, in pixels.
pub const LINE_HEIGHT: i32 = 8;

/// Characters kept per status line. Fits the longest line any `f32` can
/// produce: `"Level: "`, a sign, 39 integer digits and `" of 100"`.
pub const LINE_CAPACITY: usize = 64;

/// Area of a page-addressed monochrome display that gets redrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct RenderRegion {
    pub columns: u8,
    /// 8-pixel-high pages.
    pub pages: u8,
}

impl RenderRegion {
    /// The whole of a 128x64 SSD1306.
    pub const FULL_128X64: Self = Self {
        columns: 128,
        pages: 8,
    };

    /// Framebuffer bytes needed for this region.
    pub const fn buffer_len(&self) -> usize {
        self.columns as usize * self.pages as usize
    }
}

/// A small text display with its own framebuffer.
pub trait TextPanel {
    type Error;

    fn define_render_region(&mut self, region: RenderRegion);
    fn clear_framebuffer(&mut self);
    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<(), Self::Error>;
    /// Sends the framebuffer to the display.
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// The three text lines shown for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLines {
    pub intensity: String<LINE_CAPACITY>,
    pub voltage: String<LINE_CAPACITY>,
    pub level: String<LINE_CAPACITY>,
}

impl StatusLines {
    pub fn new(reading: &Reading) -> Self {
        let mut intensity = String::new();
        let mut voltage = String::new();
        let mut level = String::new();

        // LINE_CAPACITY covers every f32 rendering, so these cannot fail.
        let _ = write!(intensity, "Intensity: {}", reading.intensity.value());
        let _ = write!(voltage, "Mean: {:.2}V", reading.measurement.normalized_voltage);
        let _ = write!(level, "Level: {:.0} of 100", reading.measurement.db_normalized);

        Self {
            intensity,
            voltage,
            level,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            self.intensity.as_str(),
            self.voltage.as_str(),
            self.level.as_str(),
        ]
        .into_iter()
    }
}

/// Clears the panel, draws every line and presents the result.
pub fn render_status<P: TextPanel>(panel: &mut P, lines: &StatusLines) -> Result<(), P::Error> {
    panel.clear_framebuffer();
    for (row, line) in lines.iter().enumerate() {
        panel.draw_text(0, row as i32 * LINE_HEIGHT, line)?;
    }
    panel.present()
}

/// Draws one line of status text with its top edge at `y`.
pub fn draw_text_line<D>(target: &mut D, x: i32, y: i32, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(target)?;
    Ok(())
}
