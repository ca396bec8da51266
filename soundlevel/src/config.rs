use micro_meter::OverflowPolicy;

// --- Microphone / ADC ---
pub const MIC_CHANNEL: u8 = 2;
pub const MIC_PIN: u8 = 26 + MIC_CHANNEL;
pub const ADC_CLOCK_DIV: f32 = 10.0;
pub const SAMPLES: usize = micro_loudness::SAMPLES;

// --- Acquisition wait ---
// Ten conversions take a few tens of microseconds; anything near this
// bound means the converter or the DMA stalled.
pub const ACQUISITION_TIMEOUT_US: u32 = 10_000;
pub const ACQUISITION_POLL_US: u32 = 5;

// --- LED matrix ---
pub const LED_PIN: u8 = 7;
pub const LED_COUNT: usize = micro_meter::LED_COUNT;
pub const OVERFLOW_POLICY: OverflowPolicy = OverflowPolicy::Saturate;

// --- OLED ---
pub const I2C_SDA: u8 = 14;
pub const I2C_SCL: u8 = 15;
pub const I2C_FREQUENCY_HZ: u32 = 400_000;
