/// Root-mean-square of raw converter codes.
///
/// Squares are summed as integers so a 12-bit buffer of any practical length
/// accumulates without rounding; only the mean and the square root go through
/// floating point. An empty buffer has no power.
pub fn compute_power(samples: &[u16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_of_squares: u64 = samples.iter().map(|&s| u64::from(s) * u64::from(s)).sum();
    let mean = sum_of_squares as f64 / samples.len() as f64;

    libm::sqrt(mean) as f32
}
