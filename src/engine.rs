//! Translation engine: MIDI transport in, shaped sync pulses out.
//!
//! The engine owns all mutable state (transport, drivers, pins) and is driven
//! from a single thread. It never reads a clock itself; every entry point
//! that needs the time takes `now` from the caller.

use crate::clock::elapsed_ms;
use crate::config::SyncConfig;
use crate::divider::is_boundary;
use crate::error::Result;
use crate::midi::TransportEvent;
use crate::pins::PinIo;
use crate::pulse::SyncOutputDriver;
use crate::transport::{TransportAction, TransportOptions, TransportState};
use log::{debug, info, trace};

/// Counters kept for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub clocks: u64,
    pub starts: u64,
    pub continues: u64,
    pub stops: u64,
    pub system_resets: u64,
    pub parse_errors: u64,
    /// Stop or SystemReset events suppressed by configuration.
    pub ignored: u64,
}

/// Status LED.
///
/// While running it blinks on its divisor's boundaries, held longer on the
/// downbeat. While stopped it blinks slowly so a powered, waiting device is
/// distinguishable from a dead one. A parse error shows as one long blink.
#[derive(Debug, Clone)]
pub struct Indicator {
    driver: SyncOutputDriver,
    diagnostic_hold_ms: u32,
    accent_hold_ms: u32,
    idle_period_ms: u32,
    last_lit_at: Option<u32>,
}

impl Indicator {
    /// No downbeat accent and no idle pattern until configured.
    pub fn new(driver: SyncOutputDriver, diagnostic_hold_ms: u32) -> Self {
        Indicator {
            accent_hold_ms: driver.hold_ms(),
            driver,
            diagnostic_hold_ms,
            idle_period_ms: 0,
            last_lit_at: None,
        }
    }

    /// Hold used for the blink on tick 0.
    pub fn with_accent(mut self, accent_hold_ms: u32) -> Self {
        self.accent_hold_ms = accent_hold_ms;
        self
    }

    /// Slow blink every `idle_period_ms` while stopped; 0 disables it.
    pub fn with_idle_period(mut self, idle_period_ms: u32) -> Self {
        self.idle_period_ms = idle_period_ms;
        self
    }

    pub fn driver(&self) -> &SyncOutputDriver {
        &self.driver
    }

    pub fn diagnostic_hold_ms(&self) -> u32 {
        self.diagnostic_hold_ms
    }

    pub fn accent_hold_ms(&self) -> u32 {
        self.accent_hold_ms
    }

    pub fn idle_period_ms(&self) -> u32 {
        self.idle_period_ms
    }

    fn light<P: PinIo>(&mut self, now: u32, hold_ms: u32, pins: &mut P) {
        self.driver.fire_for(now, hold_ms, pins);
        self.last_lit_at = Some(now);
    }

    fn idle_due(&self, now: u32) -> bool {
        if self.idle_period_ms == 0 || self.driver.is_active() {
            return false;
        }
        match self.last_lit_at {
            None => true,
            Some(at) => elapsed_ms(now, at) >= self.idle_period_ms,
        }
    }
}

pub struct TranslationEngine<P: PinIo> {
    transport: TransportState,
    options: TransportOptions,
    drivers: Vec<SyncOutputDriver>,
    indicator: Option<Indicator>,
    pins: P,
    stats: EngineStats,
}

impl<P: PinIo> TranslationEngine<P> {
    /// Builds an engine and parks every driver pin at its rest level.
    ///
    /// Drivers are evaluated finest division first on each clock.
    pub fn new(
        mut pins: P,
        options: TransportOptions,
        mut drivers: Vec<SyncOutputDriver>,
    ) -> Self {
        drivers.sort_by(|a, b| b.divisor().cmp(&a.divisor()));
        for driver in drivers.iter_mut() {
            driver.init(&mut pins);
        }
        TranslationEngine {
            transport: TransportState::new(),
            options,
            drivers,
            indicator: None,
            pins,
            stats: EngineStats::default(),
        }
    }

    pub fn with_indicator(mut self, mut indicator: Indicator) -> Self {
        indicator.driver.init(&mut self.pins);
        self.indicator = Some(indicator);
        self
    }

    /// Validates `config` and wires up the outputs it enables.
    pub fn from_config(config: &SyncConfig, options: TransportOptions, pins: P) -> Result<Self> {
        config.validate()?;
        let engine = Self::new(pins, options, config.sync_drivers()?);
        info!(
            "Engine ready: {} sync output(s), ignore_stop={}, ignore_system_reset={}",
            engine.drivers.len(),
            options.ignore_stop,
            options.ignore_system_reset
        );
        Ok(match config.indicator()? {
            Some(indicator) => engine.with_indicator(indicator),
            None => engine,
        })
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    pub fn drivers(&self) -> &[SyncOutputDriver] {
        &self.drivers
    }

    pub fn driver(&self, name: &str) -> Option<&SyncOutputDriver> {
        self.drivers.iter().find(|d| d.name() == name)
    }

    pub fn indicator(&self) -> Option<&Indicator> {
        self.indicator.as_ref()
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// True while any output still waits to revert.
    pub fn has_pending_pulses(&self) -> bool {
        self.drivers.iter().any(|d| d.is_active())
            || self
                .indicator
                .as_ref()
                .map_or(false, |i| i.driver.is_active())
    }

    /// True when the loop has to read the clock even without a new event:
    /// a pulse waits to revert, or the stopped indicator pattern is running.
    pub fn needs_clock(&self) -> bool {
        self.has_pending_pulses()
            || (!self.transport.is_pulsing()
                && self
                    .indicator
                    .as_ref()
                    .map_or(false, |i| i.idle_period_ms > 0))
    }

    /// Single dispatch point for decoded transport events.
    pub fn handle(&mut self, event: TransportEvent, now: u32) {
        match event {
            TransportEvent::Clock => self.on_clock(now),
            TransportEvent::Start => self.on_start(),
            TransportEvent::Continue => self.on_continue(),
            TransportEvent::Stop => self.on_stop(),
            TransportEvent::SystemReset => self.on_system_reset(),
            TransportEvent::ParseError => self.on_parse_error(now),
        }
    }

    pub fn on_clock(&mut self, now: u32) {
        self.stats.clocks += 1;
        let action = self.transport.on_clock();
        self.apply(action, now);
    }

    pub fn on_start(&mut self) {
        self.stats.starts += 1;
        let action = self.transport.on_start();
        self.apply(action, 0);
    }

    pub fn on_continue(&mut self) {
        self.stats.continues += 1;
        let action = self.transport.on_continue();
        self.apply(action, 0);
    }

    pub fn on_stop(&mut self) {
        self.stats.stops += 1;
        let action = self.transport.on_stop(&self.options);
        self.apply(action, 0);
    }

    pub fn on_system_reset(&mut self) {
        self.stats.system_resets += 1;
        let action = self.transport.on_system_reset(&self.options);
        self.apply(action, 0);
    }

    pub fn on_parse_error(&mut self, now: u32) {
        self.stats.parse_errors += 1;
        let action = self.transport.on_parse_error();
        self.apply(action, now);
    }

    /// Reverts every output whose hold has elapsed. Returns how many did.
    ///
    /// While stopped this also drives the indicator's idle blink.
    pub fn poll(&mut self, now: u32) -> usize {
        let mut reverted = 0;
        for driver in self.drivers.iter_mut() {
            if driver.poll(now, &mut self.pins) {
                reverted += 1;
            }
        }
        if let Some(indicator) = self.indicator.as_mut() {
            if indicator.driver.poll(now, &mut self.pins) {
                reverted += 1;
            }
            if !self.transport.is_pulsing() && indicator.idle_due(now) {
                let hold = indicator.idle_period_ms / 2;
                indicator.light(now, hold.max(1), &mut self.pins);
            }
        }
        reverted
    }

    // `now` is only read by actions that start pulses.
    fn apply(&mut self, action: TransportAction, now: u32) {
        match action {
            TransportAction::None => {}
            TransportAction::Ignored => self.stats.ignored += 1,
            TransportAction::AbortOutputs => self.abort_all(),
            TransportAction::HardReset => {
                for driver in self.drivers.iter_mut() {
                    driver.force_rest(&mut self.pins);
                }
                if let Some(indicator) = self.indicator.as_mut() {
                    indicator.driver.force_rest(&mut self.pins);
                }
            }
            TransportAction::Diagnose => {
                self.abort_all();
                if let Some(indicator) = self.indicator.as_mut() {
                    let hold = indicator.diagnostic_hold_ms;
                    indicator.light(now, hold, &mut self.pins);
                    debug!("Diagnostic blink for {} ms", hold);
                }
            }
            TransportAction::Divide { tick } => self.divide(tick, now),
        }
    }

    fn divide(&mut self, tick: u32, now: u32) {
        for driver in self.drivers.iter_mut() {
            if is_boundary(tick, driver.divisor()) {
                driver.fire(now, &mut self.pins);
                trace!("{} pulse at tick {}", driver.name(), tick);
            }
        }
        if let Some(indicator) = self.indicator.as_mut() {
            if tick == 0 {
                let hold = indicator.accent_hold_ms;
                indicator.light(now, hold, &mut self.pins);
            } else if is_boundary(tick, indicator.driver.divisor()) {
                let hold = indicator.driver.hold_ms();
                indicator.light(now, hold, &mut self.pins);
            }
        }
    }

    fn abort_all(&mut self) {
        for driver in self.drivers.iter_mut() {
            driver.abort(&mut self.pins);
        }
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.driver.abort(&mut self.pins);
        }
    }
}
