//! analogsyncrs: MIDI transport clock in, analog sync pulses out.
//!
//! Data flows one way: [`midi::TransportSource`] → [`transport`] state
//! machine → [`divider`] → [`pulse`] drivers → [`pins`]. The
//! [`engine::TranslationEngine`] owns all of it and [`event_loop::EventLoop`]
//! drives it cooperatively from a single thread.

pub mod boot;
pub mod cli;
pub mod clock;
pub mod config;
pub mod divider;
pub mod engine;
pub mod error;
pub mod event_loop;
pub mod logging;
pub mod midi;
pub mod pins;
pub mod pulse;
pub mod transport;

pub use cli::{handle_device_list, validate_device, Args};
pub use engine::TranslationEngine;
pub use error::{Result, SyncError};
