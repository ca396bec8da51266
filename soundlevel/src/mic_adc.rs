//! RP2040 ADC result FIFO and a raw DMA channel behind the acquisition
//! traits.
//!
//! embassy-rp powers up the ADC and puts the pad into analog mode; the FIFO,
//! the clock divider and the DMA channel are then driven register by
//! register so each step of a capture stays visible to `SampleAcquirer`.

use core::sync::atomic::{compiler_fence, Ordering};

use defmt::trace;
use embassy_rp::{
    adc::{self, Adc, Blocking},
    dma::Channel as DmaChannel,
    pac::{
        self,
        dma::vals::{DataSize, TreqSel},
    },
};
use micro_loudness::{
    AcquireError, Converter, ResultQueue, TransferConfig, TransferEngine, TransferWidth,
};

/// First GPIO wired to the ADC mux; GPIO26..29 are channels 0..3.
const ADC_BASE_PIN: u8 = 26;
const ADC_PIN_CHANNELS: u8 = 4;

/// Bits of fraction in the ADC clock divider.
const DIV_FRAC_BITS: u32 = 8;

pub struct AdcFifo<'d> {
    _adc: Adc<'d, Blocking>,
    _input: adc::Channel<'d>,
    pin: u8,
}

impl<'d> AdcFifo<'d> {
    /// `pin` is the GPIO number `input` was created from.
    pub fn new(adc: Adc<'d, Blocking>, input: adc::Channel<'d>, pin: u8) -> Self {
        Self {
            _adc: adc,
            _input: input,
            pin,
        }
    }
}

impl Converter for AdcFifo<'_> {
    type Register = *const u16;

    fn configure(&mut self, pin: u8, channel: u8) -> Result<(), AcquireError> {
        let is_adc_pin = (ADC_BASE_PIN..ADC_BASE_PIN + ADC_PIN_CHANNELS).contains(&pin);
        if !is_adc_pin || pin != self.pin || channel != pin - ADC_BASE_PIN {
            return Err(AcquireError::HardwareUnavailable);
        }
        Ok(())
    }

    fn set_clock_divider(&mut self, divider: f32) {
        let int = divider as u16;
        let frac = ((divider - int as f32) * (1u32 << DIV_FRAC_BITS) as f32) as u8;
        trace!("adc div int={} frac={}", int, frac);
        pac::ADC.div().write(|w| {
            w.set_int(int);
            w.set_frac(frac);
        });
    }

    fn configure_result_queue(&mut self, queue: ResultQueue) {
        pac::ADC.fcs().write(|w| {
            w.set_en(queue.enable);
            w.set_dreq_en(queue.request_on_ready);
            w.set_thresh(queue.threshold);
            w.set_err(queue.include_error_bit);
            w.set_shift(queue.shrink_to_8bit);
        });
    }

    fn select_input(&mut self, channel: u8) {
        pac::ADC.cs().modify(|w| w.set_ainsel(channel));
    }

    fn drain_result_queue(&mut self) {
        let r = pac::ADC;
        while !r.fcs().read().empty() {
            let _ = r.fifo().read();
        }
        // Sticky overflow/underflow flags are write-one-to-clear.
        r.fcs().modify(|w| {
            w.set_over(true);
            w.set_under(true);
        });
    }

    fn start_conversion_clock(&mut self, run: bool) {
        pac::ADC.cs().modify(|w| w.set_start_many(run));
    }

    fn result_register(&self) -> *const u16 {
        pac::ADC.fifo().as_ptr() as *const u16
    }
}

/// One DMA channel reserved for ADC captures.
pub struct DmaTransfer<C> {
    channel: C,
    claimed: bool,
    config: TransferConfig,
}

impl<C: DmaChannel> DmaTransfer<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            claimed: false,
            config: TransferConfig::converter_to_buffer(),
        }
    }

    fn regs(&self) -> pac::dma::Channel {
        pac::DMA.ch(self.channel.number() as usize)
    }
}

impl<C: DmaChannel> TransferEngine for DmaTransfer<C> {
    type Source = *const u16;

    fn claim_channel(&mut self) -> Result<(), AcquireError> {
        if self.claimed {
            return Err(AcquireError::HardwareUnavailable);
        }
        self.claimed = true;
        Ok(())
    }

    fn configure_channel(&mut self, config: TransferConfig) {
        self.config = config;
    }

    unsafe fn start_transfer(&mut self, dest: *mut u16, source: *const u16, count: usize) {
        let p = self.regs();
        let config = self.config;

        p.read_addr().write_value(source as u32);
        p.write_addr().write_value(dest as u32);
        p.trans_count().write(|w| {
            *w = count as u32;
        });

        compiler_fence(Ordering::SeqCst);

        p.ctrl_trig().write(|w| {
            w.set_treq_sel(if config.paced_by_converter {
                TreqSel::ADC
            } else {
                TreqSel::PERMANENT
            });
            w.set_data_size(match config.width {
                TransferWidth::Byte => DataSize::SIZE_BYTE,
                TransferWidth::HalfWord => DataSize::SIZE_HALFWORD,
                TransferWidth::Word => DataSize::SIZE_WORD,
            });
            w.set_incr_read(config.source_increment);
            w.set_incr_write(config.dest_increment);
            w.set_chain_to(self.channel.number());
            w.set_en(true);
        });

        compiler_fence(Ordering::SeqCst);
    }

    fn is_busy(&self) -> bool {
        let busy = self.regs().ctrl_trig().read().busy();
        if !busy {
            compiler_fence(Ordering::SeqCst);
        }
        busy
    }

    fn abort(&mut self) {
        pac::DMA
            .chan_abort()
            .modify(|m| m.set_chan_abort(1 << self.channel.number()));
        while self.regs().ctrl_trig().read().busy() {}
        compiler_fence(Ordering::SeqCst);
    }
}
