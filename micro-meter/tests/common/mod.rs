#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_hal::delay::DelayNs;
use micro_loudness::{AcquireError, Converter, ResultQueue, TransferConfig, TransferEngine};
use micro_meter::{LedMatrix, PixelFrame, RenderRegion, TextPanel, LED_COUNT};

/// Microphone that hands out one prepared frame per capture.
#[derive(Default)]
pub struct Mic {
    pub frames: VecDeque<Vec<u16>>,
    pub stalled: bool,
}

pub type SharedMic = Rc<RefCell<Mic>>;

pub fn mic(frames: &[&[u16]]) -> SharedMic {
    Rc::new(RefCell::new(Mic {
        frames: frames.iter().map(|f| f.to_vec()).collect(),
        stalled: false,
    }))
}

pub struct FakeConverter(pub SharedMic);

impl Converter for FakeConverter {
    type Register = SharedMic;

    fn configure(&mut self, _pin: u8, _channel: u8) -> Result<(), AcquireError> {
        Ok(())
    }
    fn set_clock_divider(&mut self, _divider: f32) {}
    fn configure_result_queue(&mut self, _queue: ResultQueue) {}
    fn select_input(&mut self, _channel: u8) {}
    fn drain_result_queue(&mut self) {}
    fn start_conversion_clock(&mut self, _run: bool) {}

    fn result_register(&self) -> SharedMic {
        self.0.clone()
    }
}

#[derive(Default)]
pub struct FakeEngine {
    busy: bool,
}

impl TransferEngine for FakeEngine {
    type Source = SharedMic;

    fn claim_channel(&mut self) -> Result<(), AcquireError> {
        Ok(())
    }
    fn configure_channel(&mut self, _config: TransferConfig) {}

    unsafe fn start_transfer(&mut self, dest: *mut u16, source: SharedMic, count: usize) {
        let mut mic = source.borrow_mut();
        if mic.stalled {
            self.busy = true;
            return;
        }
        let frame = mic.frames.pop_front().expect("test ran out of frames");
        assert_eq!(frame.len(), count);
        for (i, code) in frame.into_iter().enumerate() {
            dest.add(i).write(code);
        }
        self.busy = false;
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn abort(&mut self) {
        self.busy = false;
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// LED matrix remembering every committed frame.
#[derive(Default)]
pub struct RecordingMatrix {
    pending: PixelFrame<LED_COUNT>,
    pub frames: Vec<PixelFrame<LED_COUNT>>,
    pub fail_flush: bool,
}

impl RecordingMatrix {
    pub fn lit(&self) -> usize {
        self.frames
            .last()
            .map(|f| f.pixels().iter().filter(|&&p| p != Rgb888::new(0, 0, 0)).count())
            .unwrap_or(0)
    }
}

impl LedMatrix for RecordingMatrix {
    type Error = ();

    fn clear(&mut self) {
        self.pending.clear();
    }

    fn set_pixel(&mut self, index: usize, r: u8, g: u8, b: u8) {
        self.pending.set(index, Rgb888::new(r, g, b));
    }

    fn flush(&mut self) -> Result<(), ()> {
        if self.fail_flush {
            return Err(());
        }
        self.frames.push(self.pending.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelFault;

/// Text panel keeping the lines of every presented screen.
#[derive(Default)]
pub struct RecordingPanel {
    pub region: Option<RenderRegion>,
    framebuffer: Vec<(i32, i32, String)>,
    pub screens: Vec<Vec<(i32, i32, String)>>,
    pub fail_present: bool,
}

impl TextPanel for RecordingPanel {
    type Error = PanelFault;

    fn define_render_region(&mut self, region: RenderRegion) {
        self.region = Some(region);
    }

    fn clear_framebuffer(&mut self) {
        self.framebuffer.clear();
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<(), PanelFault> {
        self.framebuffer.push((x, y, text.to_string()));
        Ok(())
    }

    fn present(&mut self) -> Result<(), PanelFault> {
        if self.fail_present {
            return Err(PanelFault);
        }
        self.screens.push(self.framebuffer.clone());
        Ok(())
    }
}

/// Serial sink whose every write fails.
pub struct BrokenSerial;

impl fmt::Write for BrokenSerial {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Err(fmt::Error)
    }
}
