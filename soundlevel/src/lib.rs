#![no_std]

pub mod config;
pub mod mic_adc;
pub mod neopixel;
pub mod oled;
pub mod serial;
