use crate::midi::{TransportEvent, TransportSource};
use std::collections::VecDeque;

/// Replays a fixed script of decode results.
///
/// `None` entries model decode calls that consumed input without producing
/// an event; once the script runs out every call returns `None`.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: VecDeque<Option<TransportEvent>>,
    calls: usize,
}

impl ScriptedSource {
    pub fn new<I>(events: I) -> Self
    where
        I: IntoIterator<Item = TransportEvent>,
    {
        ScriptedSource {
            script: events.into_iter().map(Some).collect(),
            calls: 0,
        }
    }

    pub fn push(&mut self, event: TransportEvent) {
        self.script.push_back(Some(event));
    }

    pub fn push_idle(&mut self) {
        self.script.push_back(None);
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Number of `decode_next` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl TransportSource for ScriptedSource {
    fn decode_next(&mut self) -> Option<TransportEvent> {
        self.calls += 1;
        self.script.pop_front().flatten()
    }
}
