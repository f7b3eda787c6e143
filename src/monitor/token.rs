use super::command::MessageType;
use super::frame::EVENT_REQUEST_ID;
use super::response::{Checkpoint, Response};
use crate::error::{MonitorError, MonitorResult};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::oneshot;

//===========================================================================//

/// The receiving end of an outstanding request.
pub type ReplyReceiver = oneshot::Receiver<MonitorResult<Response>>;

struct PendingRequest {
    command: MessageType,
    reply: oneshot::Sender<MonitorResult<Response>>,
    checkpoints: BTreeMap<u32, Checkpoint>,
}

//===========================================================================//

/// Outstanding requests, keyed by request id.
///
/// Ids come from a per-table counter.  The table holds at most `capacity`
/// requests; allocating beyond that evicts (and rejects) the oldest one, and
/// a late reply to an evicted request is recognized and dropped.
pub struct TokenTable {
    next_id: u32,
    capacity: usize,
    order: VecDeque<u32>,
    pending: HashMap<u32, PendingRequest>,
    evicted: VecDeque<u32>,
}

impl TokenTable {
    /// Returns an empty table that holds up to `capacity` requests.
    pub fn new(capacity: usize) -> TokenTable {
        let capacity = capacity.max(1);
        TokenTable {
            next_id: 0,
            capacity,
            order: VecDeque::with_capacity(capacity),
            pending: HashMap::with_capacity(capacity),
            evicted: VecDeque::with_capacity(capacity),
        }
    }

    /// Returns the number of outstanding requests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is outstanding.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Registers a new request and returns its id and reply receiver.
    pub fn allocate(&mut self, command: MessageType) -> (u32, ReplyReceiver) {
        if self.pending.len() >= self.capacity {
            self.evict_oldest();
        }
        self.next_id = self.next_id.wrapping_add(1);
        if self.next_id == EVENT_REQUEST_ID || self.next_id == 0 {
            self.next_id = 1;
        }
        let id = self.next_id;
        let (reply, receiver) = oneshot::channel();
        self.pending.insert(
            id,
            PendingRequest { command, reply, checkpoints: BTreeMap::new() },
        );
        self.order.push_back(id);
        (id, receiver)
    }

    fn evict_oldest(&mut self) {
        let Some(id) = self.order.pop_front() else {
            return;
        };
        if let Some(request) = self.pending.remove(&id) {
            tracing::warn!(id, command = %request.command, "evicting unanswered request");
            let _ = request.reply.send(Err(MonitorError::Evicted));
            if self.evicted.len() >= self.capacity {
                self.evicted.pop_front();
            }
            self.evicted.push_back(id);
        }
    }

    /// Returns the command type of an outstanding request.
    pub fn command_of(&self, id: u32) -> Option<MessageType> {
        self.pending.get(&id).map(|request| request.command)
    }

    /// Returns true if `id` belonged to a request that was evicted.
    pub fn was_evicted(&self, id: u32) -> bool {
        self.evicted.contains(&id)
    }

    /// Adds a checkpoint record to an outstanding checkpoint-list request.
    /// Returns false (and does nothing) if `id` is not such a request.
    pub fn accumulate(&mut self, id: u32, checkpoint: Checkpoint) -> bool {
        match self.pending.get_mut(&id) {
            Some(request) if request.command == MessageType::CheckpointList => {
                request.checkpoints.insert(checkpoint.id, checkpoint);
                true
            }
            _ => false,
        }
    }

    /// Completes the request `id` with `response`.  A checkpoint-list
    /// trailer resolves to the records accumulated so far.  If no such
    /// request is outstanding, the response is handed back.
    pub fn resolve(&mut self, id: u32, response: Response) -> Option<Response> {
        let Some(request) = self.take(id) else {
            return Some(response);
        };
        let response = match response {
            Response::CheckpointCount(count) => {
                if count as usize != request.checkpoints.len() {
                    tracing::debug!(
                        count,
                        received = request.checkpoints.len(),
                        "checkpoint list count mismatch"
                    );
                }
                Response::CheckpointList(request.checkpoints.into_values().collect())
            }
            other => other,
        };
        let _ = request.reply.send(Ok(response));
        None
    }

    /// Fails the request `id`.  Returns false if it was not outstanding.
    pub fn reject(&mut self, id: u32, error: MonitorError) -> bool {
        match self.take(id) {
            Some(request) => {
                let _ = request.reply.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Fails every outstanding request.
    pub fn reject_all<F: Fn() -> MonitorError>(&mut self, make_error: F) {
        self.order.clear();
        for (_, request) in self.pending.drain() {
            let _ = request.reply.send(Err(make_error()));
        }
    }

    fn take(&mut self, id: u32) -> Option<PendingRequest> {
        let request = self.pending.remove(&id)?;
        self.order.retain(|&other| other != id);
        Some(request)
    }
}

//===========================================================================//


//===========================================================================//
