/// Real-time transport messages the sync engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportEvent {
    /// 0xF8 timing clock, 24 per quarter note
    Clock,
    /// 0xFA
    Start,
    /// 0xFB
    Continue,
    /// 0xFC
    Stop,
    /// 0xFF
    SystemReset,
    /// Malformed or undefined input on the wire
    ParseError,
}

impl TransportEvent {
    /// Classifies one complete MIDI message.
    ///
    /// Returns `None` for well-formed messages the engine does not care about
    /// (channel voice, system common, SysEx, Active Sensing).
    pub fn from_bytes(data: &[u8]) -> Option<TransportEvent> {
        let status = match data.first() {
            Some(status) => *status,
            None => return Some(TransportEvent::ParseError),
        };

        match status {
            0xF8 => Some(TransportEvent::Clock),
            0xFA => Some(TransportEvent::Start),
            0xFB => Some(TransportEvent::Continue),
            0xFC => Some(TransportEvent::Stop),
            0xFF => Some(TransportEvent::SystemReset),
            0xFE => None,
            0xF9 | 0xFD => Some(TransportEvent::ParseError),
            0xF0..=0xF7 => None,
            0x80..=0xEF => {
                if data.len() < channel_message_len(status) {
                    Some(TransportEvent::ParseError)
                } else {
                    None
                }
            }
            // Data byte with no status in front of it.
            _ => Some(TransportEvent::ParseError),
        }
    }
}

fn channel_message_len(status: u8) -> usize {
    match status & 0xF0 {
        0xC0 | 0xD0 => 2,
        _ => 3,
    }
}

/// Boundary capability producing decoded transport events.
///
/// `decode_next` may block while input bytes arrive, but returns `None`
/// when nothing relevant was decoded.
pub trait TransportSource {
    fn decode_next(&mut self) -> Option<TransportEvent>;
}

impl<T: TransportSource + ?Sized> TransportSource for Box<T> {
    fn decode_next(&mut self) -> Option<TransportEvent> {
        (**self).decode_next()
    }
}
