#![no_std]

//! Loudness metering for a microphone read through a 12-bit ADC.
//!
//! The pipeline is: a fixed-length DMA capture ([`SampleAcquirer`]), an RMS
//! reduction ([`compute_power`]) and the level mapping in [`level`], which
//! turns the RMS code into volts, an intensity count and a dBFS figure.

pub mod acquire;
pub mod level;
pub mod power;

pub use acquire::{
    AcquireError, AcquisitionConfig, Converter, ResultQueue, SampleAcquirer, TransferConfig,
    TransferEngine, TransferWidth,
};
pub use level::{
    adjust_to_voltage, fold_to_magnitude, normalize_decibels, quantize_intensity, to_decibels,
    IntensityLevel, LoudnessMeasurement,
};
pub use power::compute_power;

/// Number of samples captured per cycle.
pub const SAMPLES: usize = 10;

/// Converter resolution in bits.
pub const ADC_BITS: u32 = 12;

/// Largest code the converter can produce.
pub const ADC_MAX_CODE: u16 = (1 << ADC_BITS) - 1;

/// Full-scale reference voltage.
pub const V_MAX: f32 = 3.3;

/// One capture worth of raw converter codes.
pub type SampleBuffer<const N: usize> = [u16; N];

/// Everything derived from one sample buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct Reading {
    /// RMS of the raw converter codes.
    pub power: f32,
    pub measurement: LoudnessMeasurement,
    pub intensity: IntensityLevel,
}

impl Reading {
    /// Runs the whole metric pipeline over one buffer.
    pub fn from_samples(samples: &[u16]) -> Self {
        let power = compute_power(samples);
        let measurement = LoudnessMeasurement::from_power(power);
        let intensity = quantize_intensity(measurement.normalized_voltage);

        Self {
            power,
            measurement,
            intensity,
        }
    }
}
