//! Boot-time sampling of configuration straps.
//!
//! A strap pin is configured with its pull-up and read once; a jumper to
//! ground (low) switches the corresponding ignore flag on. A strap can only
//! add an ignore flag: an open strap keeps whatever config or the command
//! line decided.

use crate::config::SyncConfig;
use crate::pins::{Level, PinId, PinIo, PinMode};
use crate::transport::TransportOptions;
use log::info;

/// Reads one strap pin. Returns `true` when it is pulled low.
pub fn sample_strap<P: PinIo>(pins: &mut P, pin: PinId) -> bool {
    pins.configure_pin(pin, PinMode::InputPullUp);
    pins.read_input_level(pin) == Level::Low
}

/// Resolves the transport options for this session.
pub fn sample_options<P: PinIo>(pins: &mut P, config: &SyncConfig) -> TransportOptions {
    let mut options = config.transport_options();

    if let Some(pin) = config.ignore_stop_pin {
        options.ignore_stop |= sample_strap(pins, PinId(pin));
        info!("Stop strap on {}: ignore_stop={}", PinId(pin), options.ignore_stop);
    }
    if let Some(pin) = config.ignore_reset_pin {
        options.ignore_system_reset |= sample_strap(pins, PinId(pin));
        info!(
            "Reset strap on {}: ignore_system_reset={}",
            PinId(pin),
            options.ignore_system_reset
        );
    }
    options
}
