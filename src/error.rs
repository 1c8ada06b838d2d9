use thiserror::Error;

/// Errors raised while setting up the sync device.
///
/// The running engine never produces these: malformed MIDI input becomes a
/// [`crate::midi::TransportEvent::ParseError`] and is handled in place.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("MIDI initialization error: {0}")]
    MidiInit(String),

    #[error("MIDI device '{name}' not found (available: {})", available.join(", "))]
    DeviceNotFound { name: String, available: Vec<String> },

    #[error("MIDI connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<midir::InitError> for SyncError {
    fn from(e: midir::InitError) -> Self {
        SyncError::MidiInit(e.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for SyncError {
    fn from(e: midir::ConnectError<T>) -> Self {
        SyncError::Connection(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
