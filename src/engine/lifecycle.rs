use crate::debug::{DebugEvent, EventQueue, StopReason};

//===========================================================================//

/// Running/stopped bookkeeping and the outgoing event queue, shared by both
/// backends.
#[derive(Debug, Default)]
pub struct Lifecycle {
    running: bool,
    events: EventQueue,
}

impl Lifecycle {
    /// Returns a stopped lifecycle with no pending events.
    pub fn new() -> Lifecycle {
        Lifecycle::default()
    }

    /// Returns true between `started` and the matching `stopped`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Marks the backend running and queues `Started`.
    pub fn started(&mut self) {
        tracing::debug!("running");
        self.running = true;
        self.events.push(DebugEvent::Started);
    }

    /// Marks the backend stopped and queues `Stopped(reason)`.
    pub fn stopped(&mut self, reason: StopReason) {
        tracing::debug!(%reason, "stopped");
        self.running = false;
        self.events.push(DebugEvent::Stopped(reason));
    }

    /// Queues any other event.
    pub fn emit(&mut self, event: DebugEvent) {
        self.events.push(event);
    }

    /// Removes and returns the oldest pending event.
    pub fn next(&mut self) -> Option<DebugEvent> {
        self.events.pop()
    }

    /// Returns true if events are waiting.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Discards pending events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

//===========================================================================//


//===========================================================================//
