//! Transport state machine.
//!
//! Consumes MIDI transport events and decides what the outputs must do. The
//! handlers only mutate [`TransportState`]; applying the resulting
//! [`TransportAction`] to pins is the engine's job.

use crate::divider::next_tick;
use log::{info, warn};

/// Runtime switches for noisy links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub ignore_stop: bool,
    pub ignore_system_reset: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions {
            ignore_stop: false,
            ignore_system_reset: true,
        }
    }
}

/// What the outputs must do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    /// Nothing changes.
    None,
    /// The event was suppressed by configuration.
    Ignored,
    /// Abort pending pulses and park every output at rest.
    AbortOutputs,
    /// Reinitialize every output regardless of timer state.
    HardReset,
    /// Abort outputs and show the parse error pattern.
    Diagnose,
    /// A clock arrived while running; `tick` is the count before increment.
    Divide { tick: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportState {
    pulsing: bool,
    tick: u32,
}

impl TransportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pulsing(&self) -> bool {
        self.pulsing
    }

    /// Clocks since the last beat boundary, in `[0, PPQN)`.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// The first clock after Start is tick 0; Start itself emits nothing.
    pub fn on_start(&mut self) -> TransportAction {
        self.pulsing = true;
        self.tick = 0;
        info!("Transport started");
        TransportAction::AbortOutputs
    }

    pub fn on_continue(&mut self) -> TransportAction {
        if self.pulsing {
            return TransportAction::None;
        }
        info!("Transport continued from stop, restarting beat");
        self.on_start()
    }

    pub fn on_stop(&mut self, options: &TransportOptions) -> TransportAction {
        if options.ignore_stop {
            warn!("Stop ignored by configuration");
            return TransportAction::Ignored;
        }
        self.pulsing = false;
        info!("Transport stopped");
        TransportAction::AbortOutputs
    }

    pub fn on_system_reset(&mut self, options: &TransportOptions) -> TransportAction {
        if options.ignore_system_reset {
            warn!("System reset ignored by configuration");
            return TransportAction::Ignored;
        }
        self.pulsing = false;
        self.tick = 0;
        info!("System reset, all outputs forced to rest");
        TransportAction::HardReset
    }

    pub fn on_parse_error(&mut self) -> TransportAction {
        self.pulsing = false;
        warn!("MIDI parse error, transport stopped");
        TransportAction::Diagnose
    }

    pub fn on_clock(&mut self) -> TransportAction {
        if !self.pulsing {
            return TransportAction::None;
        }
        let tick = self.tick;
        self.tick = next_tick(tick);
        TransportAction::Divide { tick }
    }
}
