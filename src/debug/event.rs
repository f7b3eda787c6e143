use super::breakpoint::Breakpoint;
use std::collections::VecDeque;
use std::fmt;

//===========================================================================//

/// Why a backend stopped running.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StopReason {
    /// The program returned from its entry point.
    Exit,
    /// A breakpoint was hit, or a step completed.
    Breakpoint,
    /// The debugger asked to pause.
    Pause,
    /// The processor executed BRK or a halting opcode.
    Break,
    /// The debugger asked to stop.
    Interrupted,
    /// The backend could not continue.
    Failed,
    /// Anything else.
    Unknown,
}

impl fmt::Display for StopReason {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            StopReason::Exit => "exit",
            StopReason::Breakpoint => "breakpoint",
            StopReason::Pause => "pause",
            StopReason::Break => "break",
            StopReason::Interrupted => "interrupted",
            StopReason::Failed => "failed",
            StopReason::Unknown => "unknown",
        };
        formatter.write_str(name)
    }
}

//===========================================================================//

/// A notification from a backend to the debug session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DebugEvent {
    /// The backend began running.
    Started,
    /// The backend stopped running.
    Stopped(StopReason),
    /// A breakpoint was hit.  A `Stopped` event follows.
    Breakpoint(Breakpoint),
    /// The processor hit BRK or a halting opcode at the given address.
    Break(u16),
    /// A logpoint was hit; execution continues.
    Logpoint {
        /// The logpoint.
        breakpoint: Breakpoint,
        /// Its message, with placeholders expanded.
        message: String,
    },
    /// The backend failed.  The session should tear it down.
    Error(String),
}

impl fmt::Display for DebugEvent {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DebugEvent::Started => write!(formatter, "started"),
            DebugEvent::Stopped(reason) => write!(formatter, "stopped ({reason})"),
            DebugEvent::Breakpoint(bp) => {
                write!(formatter, "breakpoint at ${:04x}", bp.address)
            }
            DebugEvent::Break(pc) => write!(formatter, "break at ${pc:04x}"),
            DebugEvent::Logpoint { breakpoint, message } => write!(
                formatter,
                "logpoint at ${:04x}: {message}",
                breakpoint.address
            ),
            DebugEvent::Error(error) => write!(formatter, "error: {error}"),
        }
    }
}

//===========================================================================//

/// A FIFO of pending events that the session drains.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<DebugEvent>,
}

impl EventQueue {
    /// Returns an empty queue.
    pub fn new() -> EventQueue {
        EventQueue { events: VecDeque::new() }
    }

    /// Appends an event.
    pub fn push(&mut self, event: DebugEvent) {
        tracing::trace!(%event, "queued debug event");
        self.events.push_back(event);
    }

    /// Removes and returns the oldest event.
    pub fn pop(&mut self) -> Option<DebugEvent> {
        self.events.pop_front()
    }

    /// Returns true if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards all pending events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Removes and returns every pending event.
    pub fn drain(&mut self) -> Vec<DebugEvent> {
        self.events.drain(..).collect()
    }
}

//===========================================================================//


//===========================================================================//
