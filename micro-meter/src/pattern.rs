use embedded_graphics::pixelcolor::Rgb888;
use micro_loudness::IntensityLevel;

/// LEDs on the 5x5 matrix.
pub const LED_COUNT: usize = 25;

/// Lit LEDs for one band as `(index, color)` pairs. Everything else is off.
pub type Pattern = &'static [(u8, Rgb888)];

const DIM_RED: Rgb888 = Rgb888::new(200, 0, 0);
const DIM_BLUE: Rgb888 = Rgb888::new(0, 0, 200);
const DIM_YELLOW: Rgb888 = Rgb888::new(200, 200, 0);
const DIM_GREEN: Rgb888 = Rgb888::new(0, 200, 0);
const BLUE: Rgb888 = Rgb888::new(0, 0, 255);
const YELLOW: Rgb888 = Rgb888::new(255, 255, 0);
const GREEN: Rgb888 = Rgb888::new(0, 255, 0);

// Silence: an X across the matrix.
const BAND_0: Pattern = &[
    (0, DIM_RED),
    (4, DIM_RED),
    (6, DIM_RED),
    (8, DIM_RED),
    (12, DIM_RED),
    (16, DIM_RED),
    (18, DIM_RED),
    (20, DIM_RED),
    (24, DIM_RED),
];

const BAND_1: Pattern = &[(12, DIM_BLUE)];

const BAND_2: Pattern = &[
    (6, DIM_YELLOW),
    (7, DIM_YELLOW),
    (8, DIM_YELLOW),
    (11, DIM_YELLOW),
    (13, DIM_YELLOW),
    (16, DIM_YELLOW),
    (17, DIM_YELLOW),
    (18, DIM_YELLOW),
];

const BAND_3: Pattern = &[
    (0, DIM_GREEN),
    (1, DIM_GREEN),
    (2, DIM_GREEN),
    (3, DIM_GREEN),
    (4, DIM_GREEN),
    (5, DIM_GREEN),
    (9, DIM_GREEN),
    (10, DIM_GREEN),
    (14, DIM_GREEN),
    (15, DIM_GREEN),
    (19, DIM_GREEN),
    (20, DIM_GREEN),
    (21, DIM_GREEN),
    (22, DIM_GREEN),
    (23, DIM_GREEN),
    (24, DIM_GREEN),
];

// Loudest: centre, inner ring and outer ring at full brightness.
const BAND_4: Pattern = &[
    (12, BLUE),
    (6, YELLOW),
    (7, YELLOW),
    (8, YELLOW),
    (11, YELLOW),
    (13, YELLOW),
    (16, YELLOW),
    (17, YELLOW),
    (18, YELLOW),
    (0, GREEN),
    (1, GREEN),
    (2, GREEN),
    (3, GREEN),
    (4, GREEN),
    (5, GREEN),
    (9, GREEN),
    (10, GREEN),
    (14, GREEN),
    (15, GREEN),
    (19, GREEN),
    (20, GREEN),
    (21, GREEN),
    (22, GREEN),
    (23, GREEN),
    (24, GREEN),
];

/// Patterns indexed by intensity band.
pub const PATTERNS: [Pattern; 5] = [BAND_0, BAND_1, BAND_2, BAND_3, BAND_4];

/// What to show for an intensity past the last band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// Show the loudest band.
    #[default]
    Saturate,
    /// Leave the matrix unlit.
    Blank,
}

/// Looks up the pattern for `level`, applying `policy` past band 4.
pub fn pattern_for(level: IntensityLevel, policy: OverflowPolicy) -> Pattern {
    match (level.band(), policy) {
        (Some(band), _) => PATTERNS[band as usize],
        (None, OverflowPolicy::Saturate) => PATTERNS[PATTERNS.len() - 1],
        (None, OverflowPolicy::Blank) => &[],
    }
}
