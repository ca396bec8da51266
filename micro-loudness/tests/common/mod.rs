#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use micro_loudness::{AcquireError, Converter, ResultQueue, TransferConfig, TransferEngine};

/// Everything the mock converter and mock engine observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Configure(u8, u8),
    ClockDivider(f32),
    ResultQueue(ResultQueue),
    SelectInput(u8),
    Drain,
    Clock(bool),
    Claim,
    ConfigureChannel(TransferConfig),
    StartTransfer(usize),
    Abort,
}

/// Shared state standing in for the converter FIFO and the microphone.
#[derive(Default)]
pub struct Bench {
    pub events: Vec<Event>,
    /// Results queued before the current capture began.
    pub fifo: VecDeque<u16>,
    /// Codes the microphone produces once the clock runs.
    pub signal: VecDeque<u16>,
    pub running: bool,
    pub stalled: bool,
    pub channel_taken: bool,
}

pub type SharedBench = Rc<RefCell<Bench>>;

pub fn bench() -> SharedBench {
    Rc::new(RefCell::new(Bench::default()))
}

pub fn feed(bench: &SharedBench, codes: &[u16]) {
    bench.borrow_mut().signal.extend(codes.iter().copied());
}

pub struct MockConverter {
    pub bench: SharedBench,
}

impl Converter for MockConverter {
    type Register = SharedBench;

    fn configure(&mut self, pin: u8, channel: u8) -> Result<(), AcquireError> {
        self.bench.borrow_mut().events.push(Event::Configure(pin, channel));
        if channel > 3 || pin != 26 + channel {
            return Err(AcquireError::HardwareUnavailable);
        }
        Ok(())
    }

    fn set_clock_divider(&mut self, divider: f32) {
        self.bench.borrow_mut().events.push(Event::ClockDivider(divider));
    }

    fn configure_result_queue(&mut self, queue: ResultQueue) {
        self.bench.borrow_mut().events.push(Event::ResultQueue(queue));
    }

    fn select_input(&mut self, channel: u8) {
        self.bench.borrow_mut().events.push(Event::SelectInput(channel));
    }

    fn drain_result_queue(&mut self) {
        let mut bench = self.bench.borrow_mut();
        bench.fifo.clear();
        bench.events.push(Event::Drain);
    }

    fn start_conversion_clock(&mut self, run: bool) {
        let mut bench = self.bench.borrow_mut();
        bench.running = run;
        bench.events.push(Event::Clock(run));
    }

    fn result_register(&self) -> SharedBench {
        self.bench.clone()
    }
}

struct Pending {
    dest: *mut u16,
    source: SharedBench,
    remaining: usize,
    written: usize,
}

pub struct MockEngine {
    pub bench: SharedBench,
    pending: RefCell<Option<Pending>>,
}

impl MockEngine {
    pub fn new(bench: SharedBench) -> Self {
        Self {
            bench,
            pending: RefCell::new(None),
        }
    }
}

impl TransferEngine for MockEngine {
    type Source = SharedBench;

    fn claim_channel(&mut self) -> Result<(), AcquireError> {
        let mut bench = self.bench.borrow_mut();
        bench.events.push(Event::Claim);
        if bench.channel_taken {
            return Err(AcquireError::HardwareUnavailable);
        }
        bench.channel_taken = true;
        Ok(())
    }

    fn configure_channel(&mut self, config: TransferConfig) {
        self.bench.borrow_mut().events.push(Event::ConfigureChannel(config));
    }

    unsafe fn start_transfer(&mut self, dest: *mut u16, source: SharedBench, count: usize) {
        self.bench.borrow_mut().events.push(Event::StartTransfer(count));
        *self.pending.borrow_mut() = Some(Pending {
            dest,
            source,
            remaining: count,
            written: 0,
        });
    }

    fn is_busy(&self) -> bool {
        let mut slot = self.pending.borrow_mut();
        let Some(pending) = slot.as_mut() else {
            return false;
        };

        // One result per poll, FIFO first, then the live signal.
        let mut source = pending.source.borrow_mut();
        if source.running && !source.stalled && pending.remaining > 0 {
            let code = match source.fifo.pop_front() {
                Some(code) => Some(code),
                None => source.signal.pop_front(),
            };
            if let Some(code) = code {
                unsafe { pending.dest.add(pending.written).write(code) };
                pending.written += 1;
                pending.remaining -= 1;
            }
        }
        let busy = pending.remaining > 0;
        drop(source);
        if !busy {
            *slot = None;
        }
        busy
    }

    fn abort(&mut self) {
        self.bench.borrow_mut().events.push(Event::Abort);
        *self.pending.borrow_mut() = None;
    }
}

/// Delay that only counts.
#[derive(Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
