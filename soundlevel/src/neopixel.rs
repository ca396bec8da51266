use core::convert::Infallible;

use embassy_futures::block_on;
use embassy_rp::{pio::Instance, pio_programs::ws2812::PioWs2812};
use embedded_graphics::{pixelcolor::Rgb888, prelude::RgbColor};
use micro_meter::{LedMatrix, PixelFrame};
use smart_leds::RGB8;

use crate::config::LED_COUNT;

/// WS2812 5x5 matrix driven by a PIO state machine.
pub struct NeoPixelMatrix<'d, P: Instance, const S: usize> {
    driver: PioWs2812<'d, P, S, LED_COUNT>,
    frame: PixelFrame<LED_COUNT>,
}

impl<'d, P: Instance, const S: usize> NeoPixelMatrix<'d, P, S> {
    pub fn new(driver: PioWs2812<'d, P, S, LED_COUNT>) -> Self {
        Self {
            driver,
            frame: PixelFrame::new(),
        }
    }
}

impl<P: Instance, const S: usize> LedMatrix for NeoPixelMatrix<'_, P, S> {
    type Error = Infallible;

    fn clear(&mut self) {
        self.frame.clear();
    }

    fn set_pixel(&mut self, index: usize, r: u8, g: u8, b: u8) {
        self.frame.set(index, Rgb888::new(r, g, b));
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        let pixels = self.frame.pixels();
        let colors: [RGB8; LED_COUNT] =
            core::array::from_fn(|i| RGB8::new(pixels[i].r(), pixels[i].g(), pixels[i].b()));
        // The main loop is the only task; waiting here keeps the cycle
        // strictly sequential.
        block_on(self.driver.write(&colors));
        Ok(())
    }
}
