//! Pin-level I/O boundary.
//!
//! The engine only ever talks to pins through [`PinIo`]. On the host the
//! [`SimulatedPins`] backend stands in for real hardware: it records every
//! output write (so tests can check edge polarity and timing) and serves
//! fixed levels for strap inputs.

use log::trace;
use std::collections::HashMap;
use std::fmt;

/// Output or input line identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u8);

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    InputPullUp,
    Output,
}

/// Boundary capability for setting and sampling pins.
pub trait PinIo {
    fn configure_pin(&mut self, pin: PinId, mode: PinMode);
    fn set_output_level(&mut self, pin: PinId, level: Level);
    fn read_input_level(&self, pin: PinId) -> Level;
}

/// A single recorded output write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    pub pin: PinId,
    pub level: Level,
}

/// In-memory pin bank used on the host and in tests.
#[derive(Debug)]
pub struct SimulatedPins {
    modes: HashMap<PinId, PinMode>,
    outputs: HashMap<PinId, Level>,
    straps: HashMap<PinId, Level>,
    writes: Vec<PinWrite>,
    record: bool,
}

impl Default for SimulatedPins {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPins {
    /// Pin bank that keeps a history of every output write.
    pub fn new() -> Self {
        SimulatedPins {
            modes: HashMap::new(),
            outputs: HashMap::new(),
            straps: HashMap::new(),
            writes: Vec::new(),
            record: true,
        }
    }

    /// Pin bank for long-running sessions: levels are tracked and traced
    /// but no write history accumulates.
    pub fn without_history() -> Self {
        SimulatedPins {
            record: false,
            ..Self::new()
        }
    }

    /// Ties an input pin to a fixed level, like a jumper to ground or VCC.
    pub fn with_strap(mut self, pin: PinId, level: Level) -> Self {
        self.straps.insert(pin, level);
        self
    }

    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        self.modes.get(&pin).copied()
    }

    /// Last level written to `pin`, if any.
    pub fn level(&self, pin: PinId) -> Option<Level> {
        self.outputs.get(&pin).copied()
    }

    pub fn writes(&self) -> &[PinWrite] {
        &self.writes
    }

    /// Writes to `pin` that moved it to `level`.
    pub fn count_writes(&self, pin: PinId, level: Level) -> usize {
        self.writes
            .iter()
            .filter(|w| w.pin == pin && w.level == level)
            .count()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl PinIo for SimulatedPins {
    fn configure_pin(&mut self, pin: PinId, mode: PinMode) {
        trace!("configure {} as {:?}", pin, mode);
        self.modes.insert(pin, mode);
    }

    fn set_output_level(&mut self, pin: PinId, level: Level) {
        trace!("{} -> {:?}", pin, level);
        self.outputs.insert(pin, level);
        if self.record {
            self.writes.push(PinWrite { pin, level });
        }
    }

    fn read_input_level(&self, pin: PinId) -> Level {
        match self.straps.get(&pin) {
            Some(level) => *level,
            // Unstrapped pull-up inputs float high; plain inputs read low.
            None => match self.modes.get(&pin) {
                Some(PinMode::InputPullUp) => Level::High,
                _ => Level::Low,
            },
        }
    }
}

impl<T: PinIo + ?Sized> PinIo for &mut T {
    fn configure_pin(&mut self, pin: PinId, mode: PinMode) {
        (**self).configure_pin(pin, mode)
    }

    fn set_output_level(&mut self, pin: PinId, level: Level) {
        (**self).set_output_level(pin, level)
    }

    fn read_input_level(&self, pin: PinId) -> Level {
        (**self).read_input_level(pin)
    }
}
