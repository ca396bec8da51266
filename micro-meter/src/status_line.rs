use core::fmt::{self, Write};

use micro_loudness::IntensityLevel;

/// Writes the per-cycle serial line: `"<intensity:2> <voltage:8.4>\r"`.
///
/// Log scrapers match this byte for byte; keep the widths.
pub fn write_status_line<W: Write>(
    out: &mut W,
    intensity: IntensityLevel,
    voltage: f32,
) -> fmt::Result {
    write!(out, "{:2} {:8.4}\r", intensity.value(), voltage)
}
