#![no_std]
#![no_main]

use defmt::{error, info, trace, warn, Debug2Format};
use embassy_executor::Spawner;
use embassy_rp::{
    adc, bind_interrupts, gpio::Pull, i2c,
    peripherals::PIO0,
    pio::{self, Pio},
    pio_programs::ws2812::{PioWs2812, PioWs2812Program},
    uart,
};
use embassy_time::{Delay, Timer};
use micro_loudness::{AcquisitionConfig, SampleAcquirer};
use micro_meter::{LevelMeter, RenderRegion};
use {defmt_rtt as _, panic_probe as _};

use soundlevel::{
    config::*,
    mic_adc::{AdcFifo, DmaTransfer},
    neopixel::NeoPixelMatrix,
    oled::Oled,
    serial::SerialStatus,
};

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => pio::InterruptHandler<PIO0>;
});

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    info!("Preparing NeoPixel on GPIO{}...", LED_PIN);
    let Pio { mut common, sm0, .. } = Pio::new(p.PIO0, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let ws2812 = PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_7, &program);
    let leds = NeoPixelMatrix::new(ws2812);

    info!("Preparing ADC on GPIO{} (channel {})...", MIC_PIN, MIC_CHANNEL);
    let converter = AdcFifo::new(
        adc::Adc::new_blocking(p.ADC, adc::Config::default()),
        adc::Channel::new_pin(p.PIN_28, Pull::None),
        MIC_PIN,
    );
    let config = AcquisitionConfig::new(MIC_PIN, MIC_CHANNEL, ADC_CLOCK_DIV)
        .with_timeout_us(ACQUISITION_TIMEOUT_US)
        .with_poll_interval_us(ACQUISITION_POLL_US);
    let mut acquirer = match SampleAcquirer::<_, _, _, SAMPLES>::configure(
        converter,
        DmaTransfer::new(p.DMA_CH1),
        Delay,
        config,
    ) {
        Ok(acquirer) => acquirer,
        Err(e) => {
            error!("ADC/DMA setup failed: {}", e);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };
    info!("ADC configured!");

    info!("Preparing OLED on I2C1 (SDA GPIO{}, SCL GPIO{})...", I2C_SDA, I2C_SCL);
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = i2c::I2c::new_blocking(p.I2C1, p.PIN_15, p.PIN_14, i2c_config);
    let panel = Oled::new(i2c).expect("Failed to initialize SSD1306");

    let status = SerialStatus::new(uart::UartTx::new_blocking(
        p.UART0,
        p.PIN_0,
        uart::Config::default(),
    ));

    let mut meter = LevelMeter::new(leds, panel, status, OVERFLOW_POLICY);
    if let Err(e) = meter.init(RenderRegion::FULL_128X64) {
        warn!("Blanking displays failed: {}", Debug2Format(&e));
    }

    info!("Warm-up capture...");
    if let Err(e) = acquirer.acquire() {
        warn!("Warm-up capture failed: {}", e);
    }

    info!("Setup complete, entering loop");
    loop {
        match meter.run_cycle(&mut acquirer) {
            Ok(reading) => trace!("{}", reading),
            Err(e) => error!("Cycle {} failed: {}", meter.cycles(), Debug2Format(&e)),
        }
    }
}
