use core::fmt;

use embassy_rp::uart::{Blocking, Instance, UartTx};

/// Blocking UART transmitter usable as a `core::fmt::Write` sink.
pub struct SerialStatus<'d, T: Instance> {
    tx: UartTx<'d, T, Blocking>,
}

impl<'d, T: Instance> SerialStatus<'d, T> {
    pub fn new(tx: UartTx<'d, T, Blocking>) -> Self {
        Self { tx }
    }
}

impl<T: Instance> fmt::Write for SerialStatus<'_, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.tx.blocking_write(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
