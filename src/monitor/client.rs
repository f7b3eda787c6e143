use super::command::{CHECKPOINT_OP_EXEC, Command, MEMSPACE_MAIN, MessageType};
use super::frame::{Frame, FrameBuffer};
use super::response::{Checkpoint, RegisterValue, Response};
use super::token::{ReplyReceiver, TokenTable};
use crate::config::MonitorConfig;
use crate::debug::{CpuFlags, CpuState, MemoryKind};
use crate::error::{MonitorError, MonitorResult};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, lookup_host};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, instrument, trace, warn};

//===========================================================================//

const READ_CHUNK_SIZE: usize = 0x4000;

//===========================================================================//

/// Something the monitor sent that no outstanding request was waiting for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MonitorEvent {
    /// An unsolicited message, such as a stop, resume, or checkpoint hit.
    Message(Response),
    /// The connection closed.  `error` is set if it closed because of a
    /// socket error rather than an orderly shutdown by the peer.
    Closed {
        /// Why the connection closed, if not cleanly.
        error: Option<String>,
    },
}

//===========================================================================//

/// The receive side of a monitor connection: reassembles frames, routes
/// responses to outstanding requests, and mirrors the register and bank
/// tables and the CPU state.
pub struct Dispatcher {
    tokens: TokenTable,
    buffer: FrameBuffer,
    register_names: HashMap<u8, String>,
    banks: HashMap<String, u16>,
    state: CpuState,
    events: mpsc::UnboundedSender<MonitorEvent>,
}

impl Dispatcher {
    /// Creates a dispatcher that delivers unsolicited messages to `events`.
    pub fn new(
        config: &MonitorConfig,
        events: mpsc::UnboundedSender<MonitorEvent>,
    ) -> Dispatcher {
        Dispatcher {
            tokens: TokenTable::new(config.max_pending),
            buffer: FrameBuffer::with_capacity(config.receive_buffer),
            register_names: HashMap::new(),
            banks: HashMap::new(),
            state: CpuState::default(),
            events,
        }
    }

    /// Registers an outgoing request.
    pub fn allocate(&mut self, command: MessageType) -> (u32, ReplyReceiver) {
        self.tokens.allocate(command)
    }

    /// Fails an outgoing request that never made it onto the wire.
    pub fn abandon(&mut self, id: u32, error: MonitorError) {
        self.tokens.reject(id, error);
    }

    /// Returns the number of outstanding requests.
    pub fn pending(&self) -> usize {
        self.tokens.len()
    }

    /// Returns the mirrored CPU state.
    pub fn cpu_state(&self) -> &CpuState {
        &self.state
    }

    /// Looks up a register id by (lowercase) name.
    pub fn register_id(&self, name: &str) -> Option<u8> {
        let name = name.to_lowercase();
        self.register_names
            .iter()
            .find(|(_, other)| **other == name)
            .map(|(&id, _)| id)
    }

    /// Looks up a memory bank id by name.
    pub fn bank_id(&self, name: &str) -> Option<u16> {
        self.banks.get(name).copied()
    }

    /// Feeds received bytes and dispatches every frame they complete.
    pub fn receive(&mut self, mut data: &[u8]) {
        loop {
            let taken = self.buffer.push(data);
            data = &data[taken..];
            loop {
                match self.buffer.next_frame() {
                    Ok(Some(frame)) => self.dispatch_frame(frame),
                    Ok(None) => break,
                    Err(error) => {
                        warn!(%error, "discarding receive buffer");
                        break;
                    }
                }
            }
            if data.is_empty() {
                return;
            }
            if taken == 0 {
                warn!(len = data.len(), "receive buffer stuck, dropping input");
                self.buffer.clear();
                return;
            }
        }
    }

    /// Fails every outstanding request and reports the connection closed.
    pub fn close(&mut self, error: Option<String>) {
        self.tokens.reject_all(|| MonitorError::Disconnected);
        self.buffer.clear();
        let _ = self.events.send(MonitorEvent::Closed { error });
    }

    fn dispatch_frame(&mut self, frame: Frame) {
        let header = frame.header;
        let id = header.request_id;
        trace!(
            message_type = header.message_type,
            id,
            len = frame.body.len(),
            "received frame"
        );
        if header.error != 0 {
            let command = self
                .tokens
                .command_of(id)
                .map_or(header.message_type, MessageType::code);
            let error = MonitorError::Remote { command, code: header.error };
            if !self.tokens.reject(id, error) {
                debug!(id, code = header.error, "error reply to no pending request");
            }
            return;
        }
        let response = match Response::decode(header.message_type, &frame.body) {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, id, "undecodable reply");
                self.tokens.reject(id, error);
                return;
            }
        };
        self.observe(&response);
        if let Response::Checkpoint(checkpoint) = &response {
            if self.tokens.command_of(id) == Some(MessageType::CheckpointList) {
                self.tokens.accumulate(id, checkpoint.clone());
                return;
            }
        }
        if let Some(response) = self.tokens.resolve(id, response) {
            if self.tokens.was_evicted(id) {
                debug!(id, "dropping late reply to evicted request");
            } else {
                let _ = self.events.send(MonitorEvent::Message(response));
            }
        }
    }

    fn observe(&mut self, response: &Response) {
        match response {
            Response::RegistersAvailable(registers) => {
                self.register_names = registers
                    .iter()
                    .map(|info| (info.id, info.name.clone()))
                    .collect();
            }
            Response::BanksAvailable(banks) => {
                self.banks = banks
                    .iter()
                    .map(|bank| (bank.name.clone(), bank.id))
                    .collect();
            }
            Response::Registers(values) => self.update_registers(values),
            Response::Stopped(pc) | Response::Resumed(pc) | Response::Jam(pc) => {
                self.state.registers.pc = *pc;
            }
            _ => {}
        }
    }

    fn update_registers(&mut self, values: &[RegisterValue]) {
        if self.register_names.is_empty() {
            trace!("register names not loaded yet");
            return;
        }
        let state = &mut self.state;
        for value in values {
            let Some(name) = self.register_names.get(&value.id) else {
                warn!(id = value.id, "unknown register id");
                continue;
            };
            let byte = value.value as u8;
            match name.as_str() {
                "a" => state.registers.a = byte,
                "x" => state.registers.x = byte,
                "y" => state.registers.y = byte,
                "pc" => state.registers.pc = value.value,
                "sp" => state.registers.s = byte,
                "fl" => state.flags = CpuFlags::from_bits(byte),
                "00" => state.info.zero0 = Some(byte),
                "01" => state.info.zero1 = Some(byte),
                "lin" => state.info.raster_line = Some(value.value),
                "cyc" => state.info.raster_cycle = Some(value.value),
                other => trace!(register = other, "ignoring register"),
            }
        }
    }
}

//===========================================================================//

/// A connection to a binary monitor.
pub struct MonitorClient {
    config: MonitorConfig,
    shared: Arc<Mutex<Dispatcher>>,
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    reader: JoinHandle<()>,
    connected: Arc<AtomicBool>,
}

impl MonitorClient {
    /// Connects to the monitor described by `config`, retrying refused
    /// connections until the configured timeout.  Returns the client and the
    /// stream of unsolicited events.
    #[instrument(skip(config), fields(host = %config.host, port = config.port))]
    pub async fn connect(
        config: MonitorConfig,
    ) -> MonitorResult<(MonitorClient, mpsc::UnboundedReceiver<MonitorEvent>)>
    {
        let addrs: Vec<SocketAddr> =
            lookup_host((config.host.as_str(), config.port))
                .await
                .map_err(|error| MonitorError::Resolve {
                    host: config.host.clone(),
                    reason: error.to_string(),
                })?
                .collect();
        if addrs.is_empty() {
            return Err(MonitorError::Resolve {
                host: config.host.clone(),
                reason: "no addresses found".to_string(),
            });
        }
        let deadline = Instant::now() + config.connect_timeout;
        let stream = loop {
            match TcpStream::connect(&addrs[..]).await {
                Ok(stream) => break stream,
                Err(error) => {
                    if Instant::now() + config.retry_interval > deadline {
                        warn!(%error, "giving up on monitor connection");
                        return Err(MonitorError::ConnectTimeout {
                            host: config.host.clone(),
                            port: config.port,
                        });
                    }
                    debug!(%error, "connection failed, retrying");
                    sleep(config.retry_interval).await;
                }
            }
        };
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(Dispatcher::new(&config, events_tx)));
        let connected = Arc::new(AtomicBool::new(true));
        let reader = tokio::spawn(read_loop(
            read_half,
            Arc::clone(&shared),
            Arc::clone(&connected),
        ));
        let client = MonitorClient {
            config,
            shared,
            writer: tokio::sync::Mutex::new(write_half),
            reader,
            connected,
        };
        client
            .send(Command::RegistersAvailable { memspace: MEMSPACE_MAIN })
            .await?;
        client.send(Command::BanksAvailable).await?;
        info!("connected to monitor");
        Ok((client, events_rx))
    }

    /// Returns the configuration this client connected with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Returns true until the connection closes.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Returns the CPU state as of the most recent registers reply.
    pub fn cpu_state(&self) -> MonitorResult<CpuState> {
        Ok(self.dispatcher()?.cpu_state().clone())
    }

    fn dispatcher(&self) -> MonitorResult<MutexGuard<'_, Dispatcher>> {
        self.shared.lock().map_err(|_| MonitorError::Disconnected)
    }

    /// Sends a command and waits for its reply.
    #[instrument(skip_all, fields(command = %command.message_type()))]
    pub async fn send(&self, command: Command) -> MonitorResult<Response> {
        if !self.is_connected() {
            return Err(MonitorError::Disconnected);
        }
        let (id, reply) = self.dispatcher()?.allocate(command.message_type());
        let bytes = match command.encode(id) {
            Ok(bytes) => bytes,
            Err(error) => {
                self.dispatcher()?.abandon(id, MonitorError::Disconnected);
                return Err(error.into());
            }
        };
        let written = {
            let mut writer = self.writer.lock().await;
            writer.write_all(&bytes).await
        };
        if let Err(error) = written {
            self.dispatcher()?.abandon(id, MonitorError::Disconnected);
            return Err(error.into());
        }
        trace!(id, len = bytes.len(), "sent request");
        reply.await.unwrap_or(Err(MonitorError::Disconnected))
    }

    async fn send_ack(&self, command: Command) -> MonitorResult<()> {
        self.send(command).await.map(drop)
    }

    /// Reads `start..=end` from the bank that holds `kind` memory.
    pub async fn memory_get(
        &self,
        start: u16,
        end: u16,
        kind: MemoryKind,
    ) -> MonitorResult<Vec<u8>> {
        let bank = kind
            .bank_name()
            .and_then(|name| self.dispatcher().ok()?.bank_id(name))
            .unwrap_or(0);
        let command = Command::MemoryGet {
            side_effects: false,
            start,
            end,
            memspace: MEMSPACE_MAIN,
            bank,
        };
        match self.send(command).await? {
            Response::Memory(data) => Ok(data),
            other => Err(unexpected(other)),
        }
    }

    /// Writes `data` starting at `start`.
    pub async fn memory_set(&self, start: u16, data: Vec<u8>) -> MonitorResult<()> {
        self.send_ack(Command::MemorySet {
            side_effects: false,
            start,
            memspace: MEMSPACE_MAIN,
            bank: 0,
            data,
        })
        .await
    }

    /// Fetches the registers and returns the updated CPU state.
    pub async fn registers_get(&self) -> MonitorResult<CpuState> {
        self.send(Command::RegistersGet { memspace: MEMSPACE_MAIN }).await?;
        self.cpu_state()
    }

    /// Writes registers given by name.
    pub async fn registers_set(&self, values: &[(&str, u16)]) -> MonitorResult<()> {
        let values = {
            let dispatcher = self.dispatcher()?;
            values
                .iter()
                .map(|&(name, value)| {
                    dispatcher
                        .register_id(name)
                        .map(|id| (id, value))
                        .ok_or_else(|| MonitorError::UnknownRegister(name.to_string()))
                })
                .collect::<MonitorResult<Vec<_>>>()?
        };
        self.send_ack(Command::RegistersSet { memspace: MEMSPACE_MAIN, values })
            .await
    }

    /// Lists every checkpoint, ordered by id.
    pub async fn checkpoint_list(&self) -> MonitorResult<Vec<Checkpoint>> {
        match self.send(Command::CheckpointList).await? {
            Response::CheckpointList(checkpoints) => Ok(checkpoints),
            other => Err(unexpected(other)),
        }
    }

    /// Creates an enabled, stopping exec checkpoint over `start..=end`.
    pub async fn checkpoint_set(
        &self,
        start: u16,
        end: u16,
        temporary: bool,
    ) -> MonitorResult<Checkpoint> {
        let command = Command::CheckpointSet {
            start,
            end,
            stop_when_hit: true,
            enabled: true,
            operation: CHECKPOINT_OP_EXEC,
            temporary,
        };
        match self.send(command).await? {
            Response::Checkpoint(checkpoint) => Ok(checkpoint),
            other => Err(unexpected(other)),
        }
    }

    /// Fetches one checkpoint.
    pub async fn checkpoint_get(&self, id: u32) -> MonitorResult<Checkpoint> {
        match self.send(Command::CheckpointGet(id)).await? {
            Response::Checkpoint(checkpoint) => Ok(checkpoint),
            other => Err(unexpected(other)),
        }
    }

    /// Deletes a checkpoint.
    pub async fn checkpoint_delete(&self, id: u32) -> MonitorResult<()> {
        self.send_ack(Command::CheckpointDelete(id)).await
    }

    /// Enables or disables a checkpoint.
    pub async fn checkpoint_toggle(&self, id: u32, enabled: bool) -> MonitorResult<()> {
        self.send_ack(Command::CheckpointToggle { id, enabled }).await
    }

    /// Executes `count` instructions.
    pub async fn advance(&self, step_over: bool, count: u16) -> MonitorResult<()> {
        self.send_ack(Command::AdvanceInstructions { step_over, count }).await
    }

    /// Runs until the current subroutine returns.
    pub async fn execute_until_return(&self) -> MonitorResult<()> {
        self.send_ack(Command::ExecuteUntilReturn).await
    }

    /// Leaves the monitor, resuming emulation.
    pub async fn exit(&self) -> MonitorResult<()> {
        self.send_ack(Command::Exit).await
    }

    /// Round trip.
    pub async fn ping(&self) -> MonitorResult<()> {
        self.send_ack(Command::Ping).await
    }

    /// Quits the emulator.
    pub async fn quit(&self) -> MonitorResult<()> {
        self.send_ack(Command::Quit).await
    }

    /// Resets the machine.
    pub async fn reset(&self, hard: bool) -> MonitorResult<()> {
        self.send_ack(Command::Reset { hard }).await
    }

    /// Loads a host file into the emulator, optionally running it.
    pub async fn autostart(&self, filename: &str, run: bool) -> MonitorResult<()> {
        self.send_ack(Command::Autostart {
            run,
            index: 0,
            filename: filename.to_string(),
        })
        .await
    }

    /// Types text on the emulated keyboard.
    pub async fn keyboard_feed(&self, text: &str) -> MonitorResult<()> {
        self.send_ack(Command::KeyboardFeed(text.as_bytes().to_vec())).await
    }

    /// Removes every checkpoint, resumes the target, and closes the
    /// connection.  Outstanding requests fail with `Disconnected`.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) -> MonitorResult<()> {
        if self.is_connected() {
            match self.checkpoint_list().await {
                Ok(checkpoints) => {
                    for checkpoint in checkpoints {
                        if let Err(error) = self.checkpoint_delete(checkpoint.id).await {
                            warn!(%error, id = checkpoint.id, "cannot delete checkpoint");
                        }
                    }
                }
                Err(error) => warn!(%error, "cannot list checkpoints"),
            }
            if let Err(error) = self.exit().await {
                warn!(%error, "cannot resume target");
            }
        }
        self.reader.abort();
        self.connected.store(false, Ordering::SeqCst);
        self.dispatcher()?.close(None);
        let _ = self.writer.lock().await.shutdown().await;
        info!("disconnected from monitor");
        Ok(())
    }
}

impl Drop for MonitorClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

fn unexpected(response: Response) -> MonitorError {
    MonitorError::Decode(format!("unexpected reply {response:?}"))
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    shared: Arc<Mutex<Dispatcher>>,
    connected: Arc<AtomicBool>,
) {
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    let error = loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break None,
            Ok(count) => match shared.lock() {
                Ok(mut dispatcher) => dispatcher.receive(&chunk[..count]),
                Err(_) => break Some("dispatcher lock poisoned".to_string()),
            },
            Err(error) => break Some(error.to_string()),
        }
    };
    connected.store(false, Ordering::SeqCst);
    match &error {
        Some(error) => error!(%error, "monitor connection lost"),
        None => info!("monitor closed the connection"),
    }
    if let Ok(mut dispatcher) = shared.lock() {
        dispatcher.close(error);
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{Dispatcher, MonitorEvent};
    use crate::config::MonitorConfig;
    use crate::error::MonitorError;
    use crate::monitor::{Checkpoint, EVENT_REQUEST_ID, Frame, MessageType, Response};
    use tokio::sync::mpsc;

    fn dispatcher() -> (Dispatcher, mpsc::UnboundedReceiver<MonitorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = MonitorConfig::default().with_max_pending(2);
        (Dispatcher::new(&config, tx), rx)
    }

    fn frame(message_type: u8, error: u8, id: u32, body: Vec<u8>) -> Vec<u8> {
        Frame::new(message_type, error, id, body).to_bytes().unwrap()
    }

    fn registers_available() -> Vec<u8> {
        let mut body = vec![4, 0];
        for (id, name) in [(0u8, "A"), (3, "PC"), (13, "FL"), (36, "LIN")] {
            body.push(3 + name.len() as u8);
            body.extend([id, if name == "PC" { 16 } else { 8 }, name.len() as u8]);
            body.extend(name.bytes());
        }
        body
    }

    fn checkpoint(id: u32, start: u16) -> Vec<u8> {
        let mut body = Vec::new();
        Checkpoint {
            id,
            currently_hit: false,
            start,
            end: start,
            stop_when_hit: true,
            enabled: true,
            operation: 4,
            temporary: false,
            hit_count: 0,
            ignore_count: 0,
            has_condition: false,
            memspace: 0,
        }
        .write_to(&mut body)
        .unwrap();
        body
    }

    #[test]
    fn registers_update_the_mirror() {
        let (mut dispatcher, _events) = dispatcher();
        dispatcher.receive(&frame(0x83, 0, EVENT_REQUEST_ID, registers_available()));
        assert_eq!(dispatcher.register_id("pc"), Some(3));
        assert_eq!(dispatcher.register_id("PC"), Some(3));
        let body = vec![
            4, 0, 3, 0, 0x05, 0, 3, 3, 0x00, 0xc0, 3, 13, 0x02, 0, 3, 36, 0x2a,
            0x01,
        ];
        dispatcher.receive(&frame(0x31, 0, EVENT_REQUEST_ID, body));
        let state = dispatcher.cpu_state();
        assert_eq!(state.registers.a, 0x05);
        assert_eq!(state.registers.pc, 0xc000);
        assert!(state.flags.z);
        assert_eq!(state.info.raster_line, Some(0x012a));
    }

    #[test]
    fn replies_resolve_tokens_and_events_go_to_the_sink() {
        let (mut dispatcher, mut events) = dispatcher();
        let (id, mut reply) = dispatcher.allocate(MessageType::Ping);
        let mut bytes = frame(0x62, 0, EVENT_REQUEST_ID, vec![0x34, 0x12]);
        bytes.extend(frame(0x81, 0, id, vec![]));
        dispatcher.receive(&bytes);
        assert_eq!(reply.try_recv().unwrap().unwrap(), Response::Ack(MessageType::Ping));
        assert_eq!(
            events.try_recv().unwrap(),
            MonitorEvent::Message(Response::Stopped(0x1234))
        );
        assert_eq!(dispatcher.cpu_state().registers.pc, 0x1234);
    }

    #[test]
    fn error_code_rejects_only_its_token() {
        let (mut dispatcher, _events) = dispatcher();
        let (first, mut first_reply) = dispatcher.allocate(MessageType::CheckpointSet);
        let (second, mut second_reply) = dispatcher.allocate(MessageType::Ping);
        dispatcher.receive(&frame(0x12, 0x8f, first, vec![]));
        dispatcher.receive(&frame(0x81, 0, second, vec![]));
        assert!(matches!(
            first_reply.try_recv().unwrap(),
            Err(MonitorError::Remote { command: 0x12, code: 0x8f })
        ));
        assert!(second_reply.try_recv().unwrap().is_ok());
    }

    #[test]
    fn checkpoint_list_is_aggregated() {
        let (mut dispatcher, mut events) = dispatcher();
        let (id, mut reply) = dispatcher.allocate(MessageType::CheckpointList);
        let mut bytes = frame(0x11, 0, id, checkpoint(7, 0xc000));
        bytes.extend(frame(0x11, 0, EVENT_REQUEST_ID, checkpoint(8, 0xc003)));
        bytes.extend(frame(0x11, 0, id, checkpoint(5, 0xc010)));
        bytes.extend(frame(0x14, 0, id, vec![2, 0, 0, 0]));
        dispatcher.receive(&bytes);
        let Response::CheckpointList(list) = reply.try_recv().unwrap().unwrap() else {
            panic!("expected checkpoint list");
        };
        assert_eq!(list.iter().map(|cp| cp.id).collect::<Vec<_>>(), vec![5, 7]);
        // The unsolicited record is an event.
        assert!(matches!(
            events.try_recv().unwrap(),
            MonitorEvent::Message(Response::Checkpoint(Checkpoint { id: 8, .. }))
        ));
    }

    #[test]
    fn late_reply_to_evicted_request_is_dropped() {
        let (mut dispatcher, mut events) = dispatcher();
        let (first, _) = dispatcher.allocate(MessageType::Ping);
        dispatcher.allocate(MessageType::Ping);
        dispatcher.allocate(MessageType::Ping);
        dispatcher.receive(&frame(0x81, 0, first, vec![]));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn framing_error_recovers_on_next_frame() {
        let (mut dispatcher, mut events) = dispatcher();
        dispatcher.receive(&[0x55; 20]);
        dispatcher.receive(&frame(0x63, 0, EVENT_REQUEST_ID, vec![0x00, 0x08]));
        assert_eq!(
            events.try_recv().unwrap(),
            MonitorEvent::Message(Response::Resumed(0x0800))
        );
    }

    #[test]
    fn chunk_larger_than_buffer_is_dispatched() {
        let (tx, mut events) = mpsc::unbounded_channel();
        let config = MonitorConfig::default().with_receive_buffer(32);
        let mut dispatcher = Dispatcher::new(&config, tx);
        let mut bytes = Vec::new();
        for pc in [0x0800u16, 0x0900, 0x0a00] {
            bytes.extend(frame(0x63, 0, EVENT_REQUEST_ID, pc.to_le_bytes().to_vec()));
        }
        dispatcher.receive(&bytes[..5]);
        dispatcher.receive(&bytes[5..]);
        for pc in [0x0800, 0x0900, 0x0a00] {
            assert_eq!(
                events.try_recv().unwrap(),
                MonitorEvent::Message(Response::Resumed(pc))
            );
        }
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn close_rejects_pending_requests() {
        let (mut dispatcher, mut events) = dispatcher();
        let (_, mut reply) = dispatcher.allocate(MessageType::Ping);
        dispatcher.close(Some("reset by peer".to_string()));
        assert!(matches!(reply.try_recv().unwrap(), Err(MonitorError::Disconnected)));
        assert_eq!(
            events.try_recv().unwrap(),
            MonitorEvent::Closed { error: Some("reset by peer".to_string()) }
        );
        assert_eq!(dispatcher.pending(), 0);
    }
}

//===========================================================================//
