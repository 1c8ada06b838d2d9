use crate::error::{Result, SyncError};
use crate::midi::{TransportEvent, TransportSource};
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError};
use log::{error, info, trace};
use midir::{Ignore, MidiInput, MidiInputConnection};
use std::time::Duration;

/// Transport source backed by a midir input port.
///
/// midir invokes its callback on a thread of its own; raw messages cross to
/// the engine thread through a single-consumer channel so event handling and
/// poll passes never interleave.
pub struct MidirSource {
    #[allow(dead_code)]
    connection: MidiInputConnection<()>,
    rx: Receiver<Vec<u8>>,
    timeout: Duration,
    port_name: String,
    connected: bool,
}

impl MidirSource {
    /// Connects to the first input port whose name contains `device_name`.
    pub fn connect(device_name: &str, timeout: Duration) -> Result<Self> {
        let mut midi_in = MidiInput::new("analogsyncrs-in")?;
        // Clock and other real-time messages are filtered by default.
        midi_in.ignore(Ignore::None);

        let in_ports = midi_in.ports();
        let available: Vec<String> = in_ports
            .iter()
            .filter_map(|p| midi_in.port_name(p).ok())
            .collect();

        let in_port = in_ports
            .iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or_else(|| SyncError::DeviceNotFound {
                name: device_name.to_string(),
                available,
            })?;
        let port_name = midi_in.port_name(in_port).unwrap_or_default();

        let (tx, rx) = unbounded();
        let connection = midi_in.connect(
            in_port,
            "analogsyncrs-input",
            move |stamp, message, _| {
                trace!("MIDI in {:02X?} at {} us", message, stamp);
                let _ = tx.send(message.to_vec());
            },
            (),
        )?;

        info!("Listening for MIDI clock on '{}'", port_name);
        Ok(MidirSource {
            connection,
            rx,
            timeout,
            port_name,
            connected: true,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl TransportSource for MidirSource {
    fn decode_next(&mut self) -> Option<TransportEvent> {
        if !self.connected {
            return None;
        }
        match self.rx.recv_timeout(self.timeout) {
            Ok(bytes) => TransportEvent::from_bytes(&bytes),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                error!("MIDI input '{}' disconnected", self.port_name);
                self.connected = false;
                None
            }
        }
    }
}

/// Names of all MIDI input ports visible to midir.
pub fn input_port_names() -> Vec<String> {
    match MidiInput::new("analogsyncrs-list") {
        Ok(midi_in) => midi_in
            .ports()
            .iter()
            .filter_map(|p| midi_in.port_name(p).ok())
            .collect(),
        Err(e) => {
            error!("Unable to enumerate MIDI inputs: {}", e);
            vec![]
        }
    }
}
