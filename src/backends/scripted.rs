//! Scripted backend that replays a queued snapshot sequence.

use std::collections::VecDeque;

use crate::backend::InputBackend;
use crate::snapshot::Snapshot;
use crate::Result;

/// Replays queued snapshots one per poll, then holds the last one.
///
/// Stands in for real hardware in tests and demo runs. An empty queue
/// reports a disconnected controller.
pub struct ScriptedBackend {
    queue: VecDeque<Snapshot>,
    current: Snapshot,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            current: Snapshot::disconnected(),
        }
    }

    pub fn with_sequence(sequence: impl IntoIterator<Item = Snapshot>) -> Self {
        Self {
            queue: sequence.into_iter().collect(),
            current: Snapshot::disconnected(),
        }
    }

    /// Append one snapshot to the replay queue.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.queue.push_back(snapshot);
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBackend for ScriptedBackend {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn poll(&mut self) -> Snapshot {
        if let Some(next) = self.queue.pop_front() {
            self.current = next;
        }
        self.current.clone()
    }

    fn shutdown(&mut self) {
        self.queue.clear();
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
