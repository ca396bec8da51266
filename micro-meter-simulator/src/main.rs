use std::{
    cell::RefCell,
    convert::Infallible,
    fmt,
    io::{self, Write as _},
    rc::Rc,
    thread,
    time::Duration,
};

use embedded_graphics::{
    pixelcolor::{BinaryColor, Rgb888},
    prelude::*,
};
use embedded_graphics_simulator::{
    BinaryColorTheme, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};
use embedded_hal::delay::DelayNs;
use micro_loudness::{
    AcquireError, AcquisitionConfig, Converter, ResultQueue, SampleAcquirer, TransferConfig,
    TransferEngine, ADC_MAX_CODE, SAMPLES,
};
use micro_meter::{
    draw_text_line, LedMatrix, LevelMeter, OverflowPolicy, PixelFrame, RenderRegion, TextPanel,
    LED_COUNT,
};

// Constants for visualization parameters
pub const MATRIX_COLUMNS: usize = 5;
pub const CELL_SIZE: u32 = 12;
pub const FRAME_DELAY_MS: u64 = 50;

const MIC_CHANNEL: u8 = 2;
const MIC_PIN: u8 = 26 + MIC_CHANNEL;
const MID_SCALE: f32 = 2048.0;

/// Synthetic microphone: a tone whose amplitude swells and fades.
struct Tone {
    amplitude: f32,
    phase: f32,
    time: f32,
}

impl Tone {
    fn next_code(&mut self) -> u16 {
        self.phase += 0.9;
        let code = MID_SCALE + self.amplitude * self.phase.sin();
        code.clamp(0.0, ADC_MAX_CODE as f32) as u16
    }

    fn advance(&mut self) {
        self.time += 0.02;
        // Envelope spans silence to clipping so every band and the
        // overflow range show up.
        self.amplitude = (self.time.sin() * 0.5 + 0.5).powi(3) * 2600.0;
    }
}

type SharedTone = Rc<RefCell<Tone>>;

struct SimConverter {
    tone: SharedTone,
    running: bool,
}

impl Converter for SimConverter {
    type Register = SharedTone;

    fn configure(&mut self, pin: u8, channel: u8) -> Result<(), AcquireError> {
        if pin != MIC_PIN || channel != MIC_CHANNEL {
            return Err(AcquireError::HardwareUnavailable);
        }
        Ok(())
    }

    fn set_clock_divider(&mut self, _divider: f32) {}
    fn configure_result_queue(&mut self, _queue: ResultQueue) {}
    fn select_input(&mut self, _channel: u8) {}
    fn drain_result_queue(&mut self) {}

    fn start_conversion_clock(&mut self, run: bool) {
        if run && !self.running {
            self.tone.borrow_mut().advance();
        }
        self.running = run;
    }

    fn result_register(&self) -> SharedTone {
        self.tone.clone()
    }
}

#[derive(Default)]
struct SimDma;

impl TransferEngine for SimDma {
    type Source = SharedTone;

    fn claim_channel(&mut self) -> Result<(), AcquireError> {
        Ok(())
    }

    fn configure_channel(&mut self, _config: TransferConfig) {}

    unsafe fn start_transfer(&mut self, dest: *mut u16, source: SharedTone, count: usize) {
        let mut tone = source.borrow_mut();
        for i in 0..count {
            dest.add(i).write(tone.next_code());
        }
    }

    fn is_busy(&self) -> bool {
        false
    }

    fn abort(&mut self) {}
}

struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }
}

struct SimLeds {
    frame: PixelFrame<LED_COUNT>,
    display: Rc<RefCell<SimulatorDisplay<Rgb888>>>,
}

impl LedMatrix for SimLeds {
    type Error = Infallible;

    fn clear(&mut self) {
        self.frame.clear();
    }

    fn set_pixel(&mut self, index: usize, r: u8, g: u8, b: u8) {
        self.frame.set(index, Rgb888::new(r, g, b));
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        self.frame
            .draw(&mut *self.display.borrow_mut(), MATRIX_COLUMNS, CELL_SIZE)
    }
}

struct SimPanel {
    framebuffer: SimulatorDisplay<BinaryColor>,
    screen: Rc<RefCell<SimulatorDisplay<BinaryColor>>>,
}

impl TextPanel for SimPanel {
    type Error = Infallible;

    fn define_render_region(&mut self, region: RenderRegion) {
        let size = Size::new(region.columns as u32, region.pages as u32 * 8);
        self.framebuffer = SimulatorDisplay::new(size);
        *self.screen.borrow_mut() = SimulatorDisplay::new(size);
    }

    fn clear_framebuffer(&mut self) {
        self.framebuffer.clear(BinaryColor::Off).ok();
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<(), Infallible> {
        draw_text_line(&mut self.framebuffer, x, y, text)
    }

    fn present(&mut self) -> Result<(), Infallible> {
        *self.screen.borrow_mut() = self.framebuffer.clone();
        Ok(())
    }
}

/// Status lines go to stdout, like the firmware's serial port.
struct Stdout;

impl fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut out = io::stdout();
        out.write_all(s.as_bytes()).map_err(|_| fmt::Error)?;
        out.flush().map_err(|_| fmt::Error)
    }
}

fn main() -> Result<(), Infallible> {
    let side = MATRIX_COLUMNS as u32 * CELL_SIZE;
    let matrix = Rc::new(RefCell::new(SimulatorDisplay::<Rgb888>::new(Size::new(
        side, side,
    ))));
    let oled = Rc::new(RefCell::new(SimulatorDisplay::<BinaryColor>::new(
        Size::new(128, 64),
    )));

    let tone = Rc::new(RefCell::new(Tone {
        amplitude: 0.0,
        phase: 0.0,
        time: 0.0,
    }));
    let mut acquirer = match SampleAcquirer::<_, _, _, SAMPLES>::configure(
        SimConverter {
            tone,
            running: false,
        },
        SimDma,
        StdDelay,
        AcquisitionConfig::new(MIC_PIN, MIC_CHANNEL, 10.0),
    ) {
        Ok(acquirer) => acquirer,
        Err(e) => {
            eprintln!("setup failed: {}", e);
            return Ok(());
        }
    };

    let leds = SimLeds {
        frame: PixelFrame::new(),
        display: matrix.clone(),
    };
    let panel = SimPanel {
        framebuffer: SimulatorDisplay::new(Size::new(128, 64)),
        screen: oled.clone(),
    };
    let mut meter = LevelMeter::new(leds, panel, Stdout, OverflowPolicy::Saturate);
    if let Err(e) = meter.init(RenderRegion::FULL_128X64) {
        eprintln!("init failed: {:?}", e);
    }

    let mut matrix_window = Window::new(
        "LED matrix",
        &OutputSettingsBuilder::new().scale(2).build(),
    );
    let mut oled_window = Window::new(
        "OLED",
        &OutputSettingsBuilder::new()
            .theme(BinaryColorTheme::OledBlue)
            .scale(3)
            .build(),
    );

    'running: loop {
        if let Err(e) = meter.run_cycle(&mut acquirer) {
            eprintln!("cycle failed: {:?}", e);
        }

        matrix_window.update(&matrix.borrow());
        oled_window.update(&oled.borrow());

        for event in matrix_window.events().chain(oled_window.events()) {
            if let SimulatorEvent::Quit = event {
                break 'running;
            }
        }

        thread::sleep(Duration::from_millis(FRAME_DELAY_MS));
    }

    println!();
    Ok(())
}
