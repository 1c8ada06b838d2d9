// event_loop.rs

use crate::clock::{elapsed_ms, MonotonicClock};
use crate::engine::TranslationEngine;
use crate::midi::{TransportEvent, TransportSource};
use crate::pins::PinIo;
use log::info;

/// Rate limit for pulse reversion passes.
///
/// Reading the clock and touching pins competes with MIDI reception, so
/// reversions are only checked once per `period_ms`. The period has to stay
/// below the shortest hold duration in use.
#[derive(Debug, Clone, Copy)]
pub struct PollThrottle {
    period_ms: u32,
    last_check: Option<u32>,
}

impl PollThrottle {
    pub fn new(period_ms: u32) -> Self {
        PollThrottle {
            period_ms,
            last_check: None,
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// True if a poll pass is due at `now`; records `now` as the last pass.
    pub fn due(&mut self, now: u32) -> bool {
        let due = match self.last_check {
            None => true,
            Some(last) => elapsed_ms(now, last) >= self.period_ms,
        };
        if due {
            self.last_check = Some(now);
        }
        due
    }
}

/// What one loop iteration did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub event: Option<TransportEvent>,
    pub polled: bool,
    pub reverted: usize,
}

/// Cooperative single-threaded loop tying a transport source, a clock and
/// the engine together.
pub struct EventLoop<S, C, P>
where
    S: TransportSource,
    C: MonotonicClock,
    P: PinIo,
{
    engine: TranslationEngine<P>,
    source: S,
    clock: C,
    throttle: PollThrottle,
}

impl<S, C, P> EventLoop<S, C, P>
where
    S: TransportSource,
    C: MonotonicClock,
    P: PinIo,
{
    pub fn new(
        engine: TranslationEngine<P>,
        source: S,
        clock: C,
        throttle: PollThrottle,
    ) -> Self {
        EventLoop {
            engine,
            source,
            clock,
            throttle,
        }
    }

    pub fn engine(&self) -> &TranslationEngine<P> {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// One pass: decode at most one event, then poll reversions if due.
    ///
    /// The clock is read at most once per pass and not at all while idle
    /// with no pulse in flight and no indicator pattern to drive.
    pub fn poll_loop_step(&mut self) -> StepReport {
        let event = self.source.decode_next();
        if event.is_none() && !self.engine.needs_clock() {
            return StepReport::default();
        }

        let now = self.clock.now();
        if let Some(event) = event {
            self.engine.handle(event, now);
        }

        let mut report = StepReport {
            event,
            ..StepReport::default()
        };
        if self.engine.needs_clock() && self.throttle.due(now) {
            report.polled = true;
            report.reverted = self.engine.poll(now);
        }
        report
    }

    /// Runs `steps` iterations, then logs a summary.
    pub fn run_for(&mut self, steps: usize) {
        for _ in 0..steps {
            self.poll_loop_step();
        }
        info!("Event loop paused: {:?}", self.engine.stats());
    }

    pub fn run(&mut self) -> ! {
        info!(
            "Event loop running, pulse check every {} ms",
            self.throttle.period_ms()
        );
        loop {
            self.poll_loop_step();
        }
    }

    pub fn into_engine(self) -> TranslationEngine<P> {
        self.engine
    }
}
