//! Non-blocking pulse outputs.
//!
//! A [`SyncOutputDriver`] drives one pin: `fire` moves it to the active level
//! and starts a [`PulseTimer`], `poll` reverts it to rest once the hold
//! duration has elapsed. Nothing here blocks or reads a clock; timestamps are
//! always passed in by the caller.

use crate::clock::elapsed_ms;
use crate::divider::{valid_divisor, PPQN};
use crate::error::{Result, SyncError};
use crate::pins::{Level, PinId, PinIo, PinMode};
use log::trace;

/// Single pending auto-reversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PulseTimer {
    active: bool,
    started_at: u32,
    hold_ms: u32,
}

impl PulseTimer {
    /// Arms the timer. Re-arming while active restarts the window.
    pub fn start(&mut self, now: u32, hold_ms: u32) {
        self.active = true;
        self.started_at = now;
        self.hold_ms = hold_ms;
    }

    pub fn clear(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn started_at(&self) -> u32 {
        self.started_at
    }

    /// True once at least the hold duration has passed since `start`.
    pub fn expired(&self, now: u32) -> bool {
        self.active && elapsed_ms(now, self.started_at) >= self.hold_ms
    }
}

/// Edge convention expected by the receiving instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Rests low, triggers with a high pulse.
    VTrig,
    /// Rests high, triggers by pulling low.
    STrig,
}

impl Polarity {
    pub fn rest_level(self) -> Level {
        match self {
            Polarity::VTrig => Level::Low,
            Polarity::STrig => Level::High,
        }
    }

    pub fn active_level(self) -> Level {
        self.rest_level().inverted()
    }
}

/// One output consumer: a pin, its polarity, hold duration and pulse density.
#[derive(Debug, Clone)]
pub struct SyncOutputDriver {
    name: &'static str,
    pin: PinId,
    polarity: Polarity,
    hold_ms: u32,
    divisor: u32,
    timer: PulseTimer,
    fired: u64,
}

impl SyncOutputDriver {
    /// Fails unless `divisor` splits a beat into whole ticks and `hold_ms`
    /// is non-zero.
    pub fn new(
        name: &'static str,
        pin: PinId,
        polarity: Polarity,
        hold_ms: u32,
        divisor: u32,
    ) -> Result<Self> {
        if !valid_divisor(divisor) {
            return Err(SyncError::InvalidConfig(format!(
                "{}: divisor {} does not divide {} PPQN",
                name, divisor, PPQN
            )));
        }
        if hold_ms == 0 {
            return Err(SyncError::InvalidConfig(format!(
                "{}: hold must be positive",
                name
            )));
        }
        Ok(Self::unchecked(name, pin, polarity, hold_ms, divisor))
    }

    fn unchecked(
        name: &'static str,
        pin: PinId,
        polarity: Polarity,
        hold_ms: u32,
        divisor: u32,
    ) -> Self {
        SyncOutputDriver {
            name,
            pin,
            polarity,
            hold_ms,
            divisor,
            timer: PulseTimer::default(),
            fired: 0,
        }
    }

    /// Pocket Operator / Volca style sync: two high pulses per beat.
    pub fn vtrig(pin: PinId, hold_ms: u32) -> Self {
        Self::unchecked("v-trig", pin, Polarity::VTrig, hold_ms, 2)
    }

    /// Inverted sync: one low pulse per beat.
    pub fn strig(pin: PinId, hold_ms: u32) -> Self {
        Self::unchecked("s-trig", pin, Polarity::STrig, hold_ms, 1)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn hold_ms(&self) -> u32 {
        self.hold_ms
    }

    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    pub fn rest_level(&self) -> Level {
        self.polarity.rest_level()
    }

    pub fn active_level(&self) -> Level {
        self.polarity.active_level()
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    pub fn timer(&self) -> &PulseTimer {
        &self.timer
    }

    /// Pulses started since creation.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Configures the pin as an output parked at rest.
    pub fn init<P: PinIo>(&mut self, pins: &mut P) {
        pins.configure_pin(self.pin, PinMode::Output);
        pins.set_output_level(self.pin, self.rest_level());
        self.timer.clear();
    }

    pub fn fire<P: PinIo>(&mut self, now: u32, pins: &mut P) {
        self.fire_for(now, self.hold_ms, pins);
    }

    /// Starts a pulse with a one-off hold duration.
    pub fn fire_for<P: PinIo>(&mut self, now: u32, hold_ms: u32, pins: &mut P) {
        if self.timer.is_active() {
            trace!("{} retriggered while active", self.name);
        }
        pins.set_output_level(self.pin, self.active_level());
        self.timer.start(now, hold_ms);
        self.fired += 1;
    }

    /// Reverts to rest if the hold has elapsed. Returns true on reversion.
    pub fn poll<P: PinIo>(&mut self, now: u32, pins: &mut P) -> bool {
        if !self.timer.expired(now) {
            return false;
        }
        pins.set_output_level(self.pin, self.rest_level());
        self.timer.clear();
        trace!(
            "{} released after {} ms",
            self.name,
            elapsed_ms(now, self.timer.started_at())
        );
        true
    }

    /// Drops to rest immediately, whatever the timer says.
    pub fn abort<P: PinIo>(&mut self, pins: &mut P) {
        pins.set_output_level(self.pin, self.rest_level());
        self.timer.clear();
    }

    /// Reasserts pin mode and rest level without consulting the timer.
    pub fn force_rest<P: PinIo>(&mut self, pins: &mut P) {
        self.init(pins);
    }
}
