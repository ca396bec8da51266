#![no_std]

//! Presentation side of the level meter: a 5x5 LED pattern per intensity
//! band, three lines of status text and a serial status line, driven once
//! per acquisition cycle by [`LevelMeter`].

#[cfg(feature = "std")]
extern crate std;

pub mod led_matrix;
pub mod level_meter;
pub mod pattern;
pub mod status_line;
pub mod status_panel;

pub use led_matrix::{render_level, LedMatrix, PixelFrame};
pub use level_meter::{CycleError, LevelMeter};
pub use pattern::{pattern_for, OverflowPolicy, Pattern, LED_COUNT, PATTERNS};
pub use status_line::write_status_line;
pub use status_panel::{draw_text_line, render_status, RenderRegion, StatusLines, TextPanel};
