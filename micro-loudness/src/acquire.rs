use core::fmt;

use embedded_hal::delay::DelayNs;

#[cfg(feature = "logging")]
use defmt::{trace, warn};

use crate::SampleBuffer;

/// Errors surfaced by [`SampleAcquirer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum AcquireError {
    /// The pin/channel pair is not usable, or no transfer channel was free.
    HardwareUnavailable,
    /// The transfer did not complete within the configured timeout.
    AcquisitionTimeout,
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireError::HardwareUnavailable => f.write_str("acquisition hardware unavailable"),
            AcquireError::AcquisitionTimeout => f.write_str("acquisition timed out"),
        }
    }
}

/// Result FIFO settings of the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultQueue {
    pub enable: bool,
    /// Raise a transfer request when `threshold` results are queued.
    pub request_on_ready: bool,
    pub threshold: u8,
    /// Append the conversion error flag to each result.
    pub include_error_bit: bool,
    /// Right-shift results down to 8 bits.
    pub shrink_to_8bit: bool,
}

impl ResultQueue {
    /// One transfer request per conversion, full 12-bit results.
    pub const fn per_conversion() -> Self {
        Self {
            enable: true,
            request_on_ready: true,
            threshold: 1,
            include_error_bit: false,
            shrink_to_8bit: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferWidth {
    Byte,
    HalfWord,
    Word,
}

/// Transfer channel settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    pub width: TransferWidth,
    pub source_increment: bool,
    pub dest_increment: bool,
    /// Pace each transfer on the converter's data-ready request.
    pub paced_by_converter: bool,
}

impl TransferConfig {
    /// Fixed result register into an incrementing halfword buffer.
    pub const fn converter_to_buffer() -> Self {
        Self {
            width: TransferWidth::HalfWord,
            source_increment: false,
            dest_increment: true,
            paced_by_converter: true,
        }
    }
}

/// The analog-to-digital converter side of an acquisition.
pub trait Converter {
    /// Handle to the result register the transfer engine reads from.
    type Register;

    /// Binds `pin` as an analog input for `channel`.
    fn configure(&mut self, pin: u8, channel: u8) -> Result<(), AcquireError>;
    fn set_clock_divider(&mut self, divider: f32);
    fn configure_result_queue(&mut self, queue: ResultQueue);
    fn select_input(&mut self, channel: u8);
    /// Discards every result still sitting in the queue.
    fn drain_result_queue(&mut self);
    /// Starts or stops free-running conversions.
    fn start_conversion_clock(&mut self, run: bool);
    fn result_register(&self) -> Self::Register;
}

/// A DMA-style engine moving converter results into memory.
pub trait TransferEngine {
    type Source;

    fn claim_channel(&mut self) -> Result<(), AcquireError>;
    fn configure_channel(&mut self, config: TransferConfig);

    /// Starts `count` transfers from `source` into `dest`.
    ///
    /// # Safety
    ///
    /// `dest` must be valid for `count` writes and must not be read or
    /// written by anything else until [`TransferEngine::is_busy`] returns
    /// false or [`TransferEngine::abort`] returns.
    unsafe fn start_transfer(&mut self, dest: *mut u16, source: Self::Source, count: usize);

    fn is_busy(&self) -> bool;

    /// Stops an in-flight transfer. Returns once the engine is idle.
    fn abort(&mut self);
}

/// One-time acquisition settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionConfig {
    pub pin: u8,
    pub channel: u8,
    pub clock_divider: f32,
    /// Upper bound on the completion wait.
    pub timeout_us: u32,
    /// Delay between completion checks.
    pub poll_interval_us: u32,
}

impl AcquisitionConfig {
    pub const fn new(pin: u8, channel: u8, clock_divider: f32) -> Self {
        Self {
            pin,
            channel,
            clock_divider,
            timeout_us: 10_000,
            poll_interval_us: 10,
        }
    }

    pub const fn with_timeout_us(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    pub const fn with_poll_interval_us(mut self, poll_interval_us: u32) -> Self {
        self.poll_interval_us = poll_interval_us;
        self
    }

    fn poll_interval(&self) -> u32 {
        self.poll_interval_us.max(1)
    }

    /// Rounded up, and never below one delayed check.
    fn max_polls(&self) -> u32 {
        self.timeout_us.div_ceil(self.poll_interval()).max(1)
    }
}

/// Owns the converter, the transfer channel and the sample buffer.
///
/// Each [`acquire`](SampleAcquirer::acquire) overwrites the buffer with `N`
/// fresh samples and lends it out until the next call.
pub struct SampleAcquirer<C, T, D, const N: usize> {
    converter: C,
    engine: T,
    delay: D,
    config: AcquisitionConfig,
    buffer: SampleBuffer<N>,
}

impl<C, T, D, const N: usize> SampleAcquirer<C, T, D, N>
where
    C: Converter,
    T: TransferEngine<Source = C::Register>,
    D: DelayNs,
{
    /// Performs the one-time hardware setup.
    pub fn configure(
        mut converter: C,
        mut engine: T,
        delay: D,
        config: AcquisitionConfig,
    ) -> Result<Self, AcquireError> {
        converter.configure(config.pin, config.channel)?;
        converter.select_input(config.channel);
        converter.configure_result_queue(ResultQueue::per_conversion());
        converter.set_clock_divider(config.clock_divider);

        engine.claim_channel()?;
        engine.configure_channel(TransferConfig::converter_to_buffer());

        Ok(Self {
            converter,
            engine,
            delay,
            config,
            buffer: [0; N],
        })
    }

    /// Captures `N` samples, blocking until the transfer completes or the
    /// timeout elapses.
    pub fn acquire(&mut self) -> Result<&SampleBuffer<N>, AcquireError> {
        self.converter.drain_result_queue();
        self.converter.start_conversion_clock(false);

        let source = self.converter.result_register();
        // SAFETY: the buffer is owned by `self` and is not touched again
        // until the engine is idle or aborted below.
        unsafe {
            self.engine
                .start_transfer(self.buffer.as_mut_ptr(), source, N);
        }

        self.converter.start_conversion_clock(true);
        let completed = self.wait_for_completion();
        self.converter.start_conversion_clock(false);

        if !completed {
            self.engine.abort();
            #[cfg(feature = "logging")]
            warn!("acquisition timed out after {} us", self.config.timeout_us);
            return Err(AcquireError::AcquisitionTimeout);
        }

        #[cfg(feature = "logging")]
        trace!("acquired {} samples", N);
        Ok(&self.buffer)
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Gives the peripherals back. The transfer channel stays claimed.
    pub fn release(self) -> (C, T, D) {
        (self.converter, self.engine, self.delay)
    }

    fn wait_for_completion(&mut self) -> bool {
        let interval = self.config.poll_interval();
        for _ in 0..self.config.max_polls() {
            if !self.engine.is_busy() {
                return true;
            }
            self.delay.delay_us(interval);
        }
        !self.engine.is_busy()
    }
}
