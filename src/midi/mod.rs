//! MIDI boundary for analogsyncrs
//!
//! The engine never sees raw bytes. This module turns MIDI input into
//! [`TransportEvent`]s:
//! - [`TransportEvent::from_bytes`] classifies a single MIDI message
//! - [`TransportSource`] is the decode capability the event loop pulls from
//! - [`MidirSource`] reads a real device via midir
//! - [`ScriptedSource`] replays events for tests
mod engine;
pub mod midir_engine;
pub mod mock_engine;

pub use engine::{TransportEvent, TransportSource};
pub use midir_engine::MidirSource;
pub use mock_engine::ScriptedSource;

#[cfg(not(feature = "test-mock"))]
pub fn list_devices() -> Vec<String> {
    midir_engine::input_port_names()
}

#[cfg(feature = "test-mock")]
pub fn list_devices() -> Vec<String> {
    // Mock implementation for tests - simple format as expected by tests
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}
