use core::fmt;

use embedded_hal::delay::DelayNs;
use micro_loudness::{AcquireError, Converter, Reading, SampleAcquirer, TransferEngine};

#[cfg(feature = "logging")]
use defmt::{debug, trace};

use crate::led_matrix::{render_level, LedMatrix};
use crate::pattern::OverflowPolicy;
use crate::status_line::write_status_line;
use crate::status_panel::{render_status, RenderRegion, StatusLines, TextPanel};

/// Why a cycle did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleError<LE, PE> {
    Acquire(AcquireError),
    Leds(LE),
    Panel(PE),
    Status(fmt::Error),
}

impl<LE, PE> From<AcquireError> for CycleError<LE, PE> {
    fn from(e: AcquireError) -> Self {
        CycleError::Acquire(e)
    }
}

/// Drives the LED matrix, the text panel and the serial status line from
/// one [`Reading`] per cycle.
pub struct LevelMeter<L, P, W> {
    leds: L,
    panel: P,
    status: W,
    policy: OverflowPolicy,
    cycles: u32,
}

impl<L, P, W> LevelMeter<L, P, W>
where
    L: LedMatrix,
    P: TextPanel,
    W: fmt::Write,
{
    pub fn new(leds: L, panel: P, status: W, policy: OverflowPolicy) -> Self {
        Self {
            leds,
            panel,
            status,
            policy,
            cycles: 0,
        }
    }

    /// Sets up the panel region and blanks both surfaces.
    pub fn init(&mut self, region: RenderRegion) -> Result<(), CycleError<L::Error, P::Error>> {
        self.panel.define_render_region(region);
        self.panel.clear_framebuffer();
        self.panel.present().map_err(CycleError::Panel)?;

        self.leds.clear();
        self.leds.flush().map_err(CycleError::Leds)
    }

    /// One full cycle: capture, reduce, map and present.
    pub fn run_cycle<C, T, D, const N: usize>(
        &mut self,
        acquirer: &mut SampleAcquirer<C, T, D, N>,
    ) -> Result<Reading, CycleError<L::Error, P::Error>>
    where
        C: Converter,
        T: TransferEngine<Source = C::Register>,
        D: DelayNs,
    {
        let reading = Reading::from_samples(acquirer.acquire()?);
        self.present(&reading)?;
        Ok(reading)
    }

    /// Pushes an already computed reading to every surface.
    pub fn present(&mut self, reading: &Reading) -> Result<(), CycleError<L::Error, P::Error>> {
        self.cycles = self.cycles.wrapping_add(1);

        if reading.intensity.is_overflow() {
            #[cfg(feature = "logging")]
            debug!(
                "intensity {} past last band, policy {}",
                reading.intensity.value(),
                self.policy
            );
            #[cfg(feature = "std")]
            std::println!(
                "intensity {} past last band, policy {:?}",
                reading.intensity.value(),
                self.policy
            );
        }

        render_level(&mut self.leds, reading.intensity, self.policy).map_err(CycleError::Leds)?;
        render_status(&mut self.panel, &StatusLines::new(reading)).map_err(CycleError::Panel)?;
        write_status_line(
            &mut self.status,
            reading.intensity,
            reading.measurement.normalized_voltage,
        )
        .map_err(CycleError::Status)?;

        #[cfg(feature = "logging")]
        trace!("cycle {}: {}", self.cycles, reading);
        Ok(())
    }

    /// Cycles presented so far, wrapping.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn release(self) -> (L, P, W) {
        (self.leds, self.panel, self.status)
    }
}
