use crate::{ADC_BITS, V_MAX};

/// Mid-scale bias of the microphone front end, in volts.
pub const V_BIAS: f32 = V_MAX / 2.0;

/// Number of intensity bands the presentation side knows about.
pub const BAND_COUNT: u8 = 5;

/// Sub-steps each band is divided into by the quantizer.
pub const SUBSTEPS_PER_BAND: f32 = 20.0;

/// Voltage decrement used by [`quantize_intensity`].
pub const INTENSITY_STEP: f32 = (V_MAX / BAND_COUNT as f32) / SUBSTEPS_PER_BAND;

/// Step counts above this are computed by division; f32 subtraction
/// stops making progress well before `u32` saturates.
const EXACT_COUNT_LIMIT: f32 = 100_000.0;

/// Anything at or below this voltage is reported as [`DBFS_FLOOR`].
pub const DBFS_SILENCE_THRESHOLD: f32 = 0.0001;

/// dBFS reported for silence.
pub const DBFS_FLOOR: f32 = -100.0;

/// Output of [`quantize_intensity`].
///
/// Bands `0..=4` map onto presentation patterns. The quantizer step is a
/// twentieth of a band, so loud input produces counts far above 4; those are
/// kept as-is and reported through [`IntensityLevel::band`] returning `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct IntensityLevel(u32);

impl IntensityLevel {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// The presentation band, if the count falls inside one.
    pub fn band(self) -> Option<u8> {
        if self.0 < BAND_COUNT as u32 {
            Some(self.0 as u8)
        } else {
            None
        }
    }

    /// True when the count is past the last presentation band.
    pub fn is_overflow(self) -> bool {
        self.band().is_none()
    }
}

/// Loudness figures derived from one RMS value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct LoudnessMeasurement {
    /// Bias-corrected voltage, signed.
    pub raw_voltage: f32,
    /// `2 * |raw_voltage|`, nominally `0.0..=V_MAX`.
    pub normalized_voltage: f32,
    /// Decibels relative to [`V_MAX`].
    pub dbfs: f32,
    /// `100 + dbfs`, floored at zero. Not capped at 100.
    pub db_normalized: f32,
}

impl LoudnessMeasurement {
    pub fn from_power(power: f32) -> Self {
        let raw_voltage = adjust_to_voltage(power);
        let normalized_voltage = fold_to_magnitude(raw_voltage);
        let dbfs = to_decibels(normalized_voltage, V_MAX);

        Self {
            raw_voltage,
            normalized_voltage,
            dbfs,
            db_normalized: normalize_decibels(dbfs),
        }
    }

    /// True when the voltage went past the reference, i.e. the percentage
    /// is above 100.
    pub fn is_over_full_scale(&self) -> bool {
        self.db_normalized > 100.0
    }
}

/// Converts an RMS code to volts and removes the mid-scale bias.
pub fn adjust_to_voltage(raw_rms: f32) -> f32 {
    raw_rms * V_MAX / (1u32 << ADC_BITS) as f32 - V_BIAS
}

/// Drops the sign and doubles the magnitude back towards full scale.
pub fn fold_to_magnitude(voltage: f32) -> f32 {
    2.0 * libm::fabsf(voltage)
}

/// Counts how many [`INTENSITY_STEP`] subtractions leave a positive
/// remainder.
///
/// Unbounded above: a full-scale input gives roughly 99. NaN and
/// non-positive inputs count as zero. Past `EXACT_COUNT_LIMIT` steps the
/// count is `floor(normalized / step)`, saturating at `u32::MAX`.
pub fn quantize_intensity(normalized: f32) -> IntensityLevel {
    let steps = normalized / INTENSITY_STEP;
    if steps > EXACT_COUNT_LIMIT {
        return IntensityLevel(libm::floorf(steps) as u32);
    }

    let mut remainder = normalized;
    let mut count = 0;
    loop {
        remainder -= INTENSITY_STEP;
        if remainder > 0.0 {
            count += 1;
        } else {
            break;
        }
    }
    IntensityLevel(count)
}

/// `20 * log10(voltage / reference)`, clamped to [`DBFS_FLOOR`] for
/// voltages at or below [`DBFS_SILENCE_THRESHOLD`].
pub fn to_decibels(voltage: f32, reference: f32) -> f32 {
    if voltage <= DBFS_SILENCE_THRESHOLD {
        return DBFS_FLOOR;
    }
    20.0 * libm::log10f(voltage / reference)
}

/// Shifts dBFS onto a 0-based scale. Negative results are floored at 0;
/// there is no upper cap.
pub fn normalize_decibels(dbfs: f32) -> f32 {
    let normalized = 100.0 + dbfs;
    if normalized < 0.0 {
        0.0
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_adjust_to_voltage_endpoints() {
        assert_abs_diff_eq!(adjust_to_voltage(0.0), -1.65, epsilon = 1e-6);
        assert_abs_diff_eq!(adjust_to_voltage(4095.0), 1.6492, epsilon = 1e-4);
        assert_eq!(adjust_to_voltage(2048.0), 0.0);
    }

    #[test]
    fn test_adjust_to_voltage_is_monotonic() {
        let mut previous = adjust_to_voltage(0.0);
        for code in 1..=4095u16 {
            let v = adjust_to_voltage(code as f32);
            assert!(v > previous, "not increasing at code {}", code);
            previous = v;
        }
    }

    #[test]
    fn test_fold_to_magnitude_discards_sign() {
        assert_eq!(fold_to_magnitude(0.5), 1.0);
        assert_eq!(fold_to_magnitude(-0.5), 1.0);
        assert_eq!(fold_to_magnitude(0.0), 0.0);
    }

    #[test]
    fn test_quantize_intensity_step_boundaries() {
        assert_abs_diff_eq!(INTENSITY_STEP, 0.033, epsilon = 1e-6);
        assert_eq!(quantize_intensity(0.0).value(), 0);
        assert_eq!(quantize_intensity(0.0329).value(), 0);
        assert_eq!(quantize_intensity(0.034).value(), 1);
    }

    #[test]
    fn test_quantize_intensity_is_not_bounded_to_bands() {
        let level = quantize_intensity(3.2);
        assert_eq!(level.value(), 96);
        assert!(level.is_overflow());
        assert_eq!(level.band(), None);
    }

    #[test]
    fn test_quantize_intensity_degenerate_inputs() {
        assert_eq!(quantize_intensity(-1.0).value(), 0);
        assert_eq!(quantize_intensity(f32::NAN).value(), 0);
        assert_eq!(quantize_intensity(f32::INFINITY).value(), u32::MAX);
    }

    #[test]
    fn test_quantize_intensity_large_finite_inputs() {
        let level = quantize_intensity(1.0e8).value();
        assert!((3_030_000_000..=3_031_000_000).contains(&level));
        assert_eq!(quantize_intensity(f32::MAX).value(), u32::MAX);

        // Subtraction drifts a little over this many steps; the two sides
        // of the switch to division still line up.
        let below = quantize_intensity(3299.0).value();
        let above = quantize_intensity(3301.0).value();
        assert!((99_000..=101_000).contains(&below));
        assert!((100_020..=100_040).contains(&above));
    }

    #[test]
    fn test_intensity_bands() {
        for value in 0..5 {
            assert_eq!(IntensityLevel::new(value).band(), Some(value as u8));
        }
        assert_eq!(IntensityLevel::new(5).band(), None);
    }

    #[test]
    fn test_to_decibels_floor() {
        assert_eq!(to_decibels(0.0001, 3.3), -100.0);
        assert_eq!(to_decibels(0.0, 3.3), -100.0);
        assert_eq!(to_decibels(-2.0, 3.3), -100.0);
        assert_eq!(to_decibels(3.3, 3.3), 0.0);
    }

    #[test]
    fn test_to_decibels_has_no_upper_clamp() {
        assert_abs_diff_eq!(to_decibels(6.6, 3.3), 6.0206, epsilon = 1e-3);
    }

    #[test]
    fn test_normalize_decibels() {
        assert_eq!(normalize_decibels(-100.0), 0.0);
        assert_eq!(normalize_decibels(0.0), 100.0);
        assert_eq!(normalize_decibels(-150.0), 0.0);
        assert_eq!(normalize_decibels(1.0), 101.0);
    }

    #[test]
    fn test_measurement_over_full_scale() {
        // Power past the top code only happens with a broken converter,
        // but the percentage must still go above 100 rather than clip.
        let m = LoudnessMeasurement::from_power(8192.0);
        assert!(m.is_over_full_scale());
        assert!(m.db_normalized > 100.0);
    }
}
