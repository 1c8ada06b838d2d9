use clap::Parser;
use std::path::PathBuf;

/// Turns incoming MIDI clock into analog sync pulses.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI devices
    #[arg(long)]
    pub device_list: bool,

    /// Bind to a specific MIDI device
    #[arg(long)]
    pub bind_to_device: Option<String>,

    /// Load settings from a config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ignore MIDI Stop messages (noisy links)
    #[arg(long)]
    pub ignore_stop: bool,

    /// Act on MIDI System Reset instead of ignoring it
    #[arg(long)]
    pub honour_system_reset: bool,

    /// Milliseconds between pulse reversion checks
    #[arg(long, value_name = "MS")]
    pub pulse_check_ms: Option<u32>,

    /// Log to stderr (filtered by RUST_LOG) instead of the log file
    #[arg(long)]
    pub log_stderr: bool,
}

pub fn handle_device_list() -> Vec<String> {
    crate::midi::list_devices()
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
