use c64db::config::{MonitorConfig, RemoteConfig};
use c64db::debug::{
    Breakpoint, Breakpoints, DebugEvent, LineTable, MemoryKind, StepKind,
    StopReason,
};
use c64db::engine::Backend;
use c64db::monitor::{
    Checkpoint, EVENT_REQUEST_ID, Frame, FrameBuffer, MonitorClient,
};
use c64db::{DebugError, MonitorError};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Notify;

//===========================================================================//

const REGISTER_NAMES: [&str; 5] = ["A", "X", "Y", "PC", "SP"];
const REG_PC: usize = 3;

/// The emulator side of a monitor connection, just capable enough to drive
/// the client: it keeps memory, registers and checkpoints, and "runs" by
/// stopping at a scripted list of addresses.
struct FakeState {
    memory: Vec<u8>,
    registers: [u16; 5],
    checkpoints: BTreeMap<u32, Checkpoint>,
    next_checkpoint: u32,
    stops: VecDeque<u16>,
    running: bool,
    log: Vec<(u8, Vec<u8>)>,
}

impl FakeState {
    fn new() -> FakeState {
        FakeState {
            memory: vec![0; 0x10000],
            registers: [0x05, 0x00, 0x00, 0xc000, 0xf6],
            checkpoints: BTreeMap::new(),
            next_checkpoint: 1,
            stops: VecDeque::new(),
            running: false,
            log: Vec::new(),
        }
    }

    fn add_checkpoint(&mut self, start: u16, end: u16, temporary: bool) -> Checkpoint {
        let checkpoint = Checkpoint {
            id: self.next_checkpoint,
            currently_hit: false,
            start,
            end,
            stop_when_hit: true,
            enabled: true,
            operation: 4,
            temporary,
            hit_count: 0,
            ignore_count: 0,
            has_condition: false,
            memspace: 0,
        };
        self.next_checkpoint += 1;
        self.checkpoints.insert(checkpoint.id, checkpoint.clone());
        checkpoint
    }

    fn handle(&mut self, frame: Frame) -> Vec<Frame> {
        let id = frame.header.request_id;
        let code = frame.header.message_type;
        let body = frame.body;
        self.log.push((code, body.clone()));
        let was_running = std::mem::replace(&mut self.running, false);
        let mut out = Vec::new();
        let reply = |body: Vec<u8>| Frame::new(code, 0, id, body);
        match code {
            0x01 => {
                let start = usize::from(le16(&body[1..]));
                let end = usize::from(le16(&body[3..]));
                let data = &self.memory[start..=end];
                let mut reply_body = (data.len() as u16).to_le_bytes().to_vec();
                reply_body.extend_from_slice(data);
                out.push(reply(reply_body));
            }
            0x02 => {
                let start = usize::from(le16(&body[1..]));
                let data = &body[8..];
                self.memory[start..start + data.len()].copy_from_slice(data);
                out.push(reply(Vec::new()));
            }
            0x12 => {
                let checkpoint =
                    self.add_checkpoint(le16(&body[0..]), le16(&body[2..]), body[7] != 0);
                out.push(Frame::new(0x11, 0, id, checkpoint_bytes(&checkpoint)));
            }
            0x13 => {
                let target = u32::from_le_bytes([body[0], body[1], body[2], body[3]]);
                if self.checkpoints.remove(&target).is_some() {
                    out.push(reply(Vec::new()));
                } else {
                    out.push(Frame::new(code, 0x01, id, Vec::new()));
                }
            }
            0x14 => {
                for checkpoint in self.checkpoints.values() {
                    out.push(Frame::new(0x11, 0, id, checkpoint_bytes(checkpoint)));
                }
                let count = self.checkpoints.len() as u32;
                out.push(reply(count.to_le_bytes().to_vec()));
            }
            0x31 => out.push(reply(self.register_bytes())),
            0x32 => {
                let count = usize::from(le16(&body[1..]));
                for item in body[3..].chunks(4).take(count) {
                    self.registers[usize::from(item[1])] = le16(&item[2..]);
                }
                out.push(reply(self.register_bytes()));
            }
            0x71 | 0x73 => {
                out.push(reply(Vec::new()));
                let next = self.registers[REG_PC].wrapping_add(1);
                let pc = self.stops.pop_front().unwrap_or(next);
                self.stop_at(pc, &mut out);
            }
            0x82 => {
                let mut reply_body = 2u16.to_le_bytes().to_vec();
                for (bank, name) in [(0u16, "cpu"), (1, "ram")] {
                    reply_body.push(3 + name.len() as u8);
                    reply_body.extend_from_slice(&bank.to_le_bytes());
                    reply_body.push(name.len() as u8);
                    reply_body.extend_from_slice(name.as_bytes());
                }
                out.push(reply(reply_body));
            }
            0x83 => {
                let mut reply_body = (REGISTER_NAMES.len() as u16).to_le_bytes().to_vec();
                for (index, name) in REGISTER_NAMES.iter().enumerate() {
                    let bits = if *name == "PC" { 16 } else { 8 };
                    reply_body.push(3 + name.len() as u8);
                    reply_body.extend_from_slice(&[index as u8, bits, name.len() as u8]);
                    reply_body.extend_from_slice(name.as_bytes());
                }
                out.push(reply(reply_body));
            }
            0xaa => {
                out.push(reply(Vec::new()));
                let pc = self.registers[REG_PC];
                out.push(event(0x63, pc.to_le_bytes().to_vec()));
                self.running = true;
                if let Some(pc) = self.stops.pop_front() {
                    self.stop_at(pc, &mut out);
                }
            }
            0x81 | 0xbb | 0xcc | 0xdd => out.push(reply(Vec::new())),
            _ => out.push(Frame::new(code, 0x83, id, Vec::new())),
        }
        // Any other command from a running emulator enters the monitor.
        if was_running && !matches!(code, 0x71 | 0x73 | 0xaa) {
            let pc = self.registers[REG_PC];
            out.push(event(0x62, pc.to_le_bytes().to_vec()));
        }
        out
    }

    fn stop_at(&mut self, pc: u16, out: &mut Vec<Frame>) {
        self.registers[REG_PC] = pc;
        self.running = false;
        let hits: Vec<u32> = self
            .checkpoints
            .values()
            .filter(|cp| cp.enabled && cp.start <= pc && pc <= cp.end)
            .map(|cp| cp.id)
            .collect();
        for id in hits {
            let Some(checkpoint) = self.checkpoints.get_mut(&id) else { continue };
            checkpoint.hit_count += 1;
            let mut record = checkpoint.clone();
            record.currently_hit = true;
            if record.temporary {
                self.checkpoints.remove(&id);
            }
            out.push(event(0x11, checkpoint_bytes(&record)));
        }
        out.push(event(0x62, pc.to_le_bytes().to_vec()));
    }

    fn register_bytes(&self) -> Vec<u8> {
        let mut body = (self.registers.len() as u16).to_le_bytes().to_vec();
        for (index, value) in self.registers.iter().enumerate() {
            body.extend_from_slice(&[3, index as u8]);
            body.extend_from_slice(&value.to_le_bytes());
        }
        body
    }

    fn count(&self, code: u8) -> usize {
        self.log.iter().filter(|(logged, _)| *logged == code).count()
    }
}

fn le16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn event(code: u8, body: Vec<u8>) -> Frame {
    Frame::new(code, 0, EVENT_REQUEST_ID, body)
}

fn checkpoint_bytes(checkpoint: &Checkpoint) -> Vec<u8> {
    let mut body = Vec::new();
    checkpoint.write_to(&mut body).unwrap();
    body
}

//===========================================================================//

struct FakeMonitor {
    port: u16,
    state: Arc<Mutex<FakeState>>,
    hang_up: Arc<Notify>,
}

impl FakeMonitor {
    async fn start(state: FakeState) -> FakeMonitor {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(state));
        let hang_up = Arc::new(Notify::new());
        let task_state = Arc::clone(&state);
        let task_hang_up = Arc::clone(&hang_up);
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buffer = FrameBuffer::with_capacity(0x1000);
            let mut chunk = vec![0u8; 0x1000];
            loop {
                let len = tokio::select! {
                    read = stream.read(&mut chunk) => match read {
                        Ok(0) | Err(_) => return,
                        Ok(len) => len,
                    },
                    _ = task_hang_up.notified() => return,
                };
                let mut data = &chunk[..len];
                while !data.is_empty() {
                    data = &data[buffer.push(data)..];
                    while let Some(frame) = buffer.next_frame().unwrap() {
                        let replies = task_state.lock().unwrap().handle(frame);
                        for reply in replies {
                            let bytes = reply.to_bytes().unwrap();
                            if stream.write_all(&bytes).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });
        FakeMonitor { port, state, hang_up }
    }

    fn config(&self) -> RemoteConfig {
        RemoteConfig::new(MonitorConfig::new("127.0.0.1", self.port))
    }

    fn count(&self, code: u8) -> usize {
        self.state.lock().unwrap().count(code)
    }

    fn last_body(&self, code: u8) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        let found = state.log.iter().rev().find(|(logged, _)| *logged == code);
        found.map(|(_, body)| body.clone()).unwrap_or_default()
    }

    fn script_stops(&self, stops: &[u16]) {
        self.state.lock().unwrap().stops.extend(stops);
    }
}

async fn next(backend: &mut Backend) -> Option<DebugEvent> {
    tokio::time::timeout(Duration::from_secs(5), backend.next_event())
        .await
        .expect("timed out waiting for an event")
}

fn breakpoints(addresses: &[u16]) -> Breakpoints {
    addresses.iter().map(|&addr| Breakpoint::new(addr)).collect()
}

//===========================================================================//

#[tokio::test]
async fn connect_and_read_registers() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    backend.init().await.unwrap();
    assert_eq!(fake.count(0x83), 1);
    assert_eq!(fake.count(0x82), 1);
    assert_eq!(fake.count(0x14), 1);

    let state = backend.cpu_state().await.unwrap();
    assert_eq!(state.registers.a, 0x05);
    assert_eq!(state.registers.pc, 0xc000);
    assert_eq!(state.registers.s, 0xf6);
}

#[tokio::test]
async fn client_helpers() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let (client, _events) =
        MonitorClient::connect(MonitorConfig::new("127.0.0.1", fake.port))
            .await
            .unwrap();
    client.ping().await.unwrap();
    client.registers_set(&[("a", 0x42), ("PC", 0x1000)]).await.unwrap();
    assert_eq!(fake.last_body(0x32), vec![0, 2, 0, 3, 0, 0x42, 0, 3, 3, 0x00, 0x10]);
    assert!(matches!(
        client.registers_set(&[("q", 1)]).await,
        Err(MonitorError::UnknownRegister(_))
    ));

    let checkpoint = client.checkpoint_set(0xc000, 0xc00f, false).await.unwrap();
    assert_eq!((checkpoint.start, checkpoint.end), (0xc000, 0xc00f));
    assert_eq!(client.checkpoint_list().await.unwrap(), vec![checkpoint.clone()]);
    client.checkpoint_delete(checkpoint.id).await.unwrap();
    assert!(client.checkpoint_list().await.unwrap().is_empty());
    assert!(matches!(
        client.checkpoint_delete(checkpoint.id).await,
        Err(MonitorError::Remote { command: 0x13, code: 0x01 })
    ));
    // The failed request did not disturb the connection.
    client.ping().await.unwrap();
}

#[tokio::test]
async fn concurrent_requests_are_matched_to_replies() {
    let mut state = FakeState::new();
    state.memory[0x0400] = 0x99;
    let fake = FakeMonitor::start(state).await;
    let (client, _events) =
        MonitorClient::connect(MonitorConfig::new("127.0.0.1", fake.port))
            .await
            .unwrap();
    let (memory, registers, checkpoints) = tokio::join!(
        client.memory_get(0x0400, 0x0401, MemoryKind::Default),
        client.registers_get(),
        client.checkpoint_list(),
    );
    assert_eq!(memory.unwrap(), vec![0x99, 0x00]);
    assert_eq!(registers.unwrap().registers.pc, 0xc000);
    assert!(checkpoints.unwrap().is_empty());
}

#[tokio::test]
async fn breakpoint_sync_only_changes_differences() {
    let mut state = FakeState::new();
    // Left behind by someone else.
    state.add_checkpoint(0x2000, 0x2000, false);
    state.add_checkpoint(0x3000, 0x3000, true);
    let fake = FakeMonitor::start(state).await;
    let mut backend = Backend::remote(fake.config());
    backend.set_breakpoints(breakpoints(&[0xc000, 0xc010])).await.unwrap();
    backend.init().await.unwrap();
    assert_eq!(fake.count(0x12), 2);
    assert_eq!(fake.count(0x13), 1);

    backend.set_breakpoints(breakpoints(&[0xc000, 0xc010])).await.unwrap();
    assert_eq!(fake.count(0x14), 2);
    assert_eq!(fake.count(0x12), 2);
    assert_eq!(fake.count(0x13), 1);

    let mut changed = breakpoints(&[0xc010]);
    changed.insert(Breakpoint::new(0xc020).with_enabled(false));
    backend.set_breakpoints(changed).await.unwrap();
    assert_eq!(fake.count(0x12), 2);
    assert_eq!(fake.count(0x13), 2);
    let remaining: Vec<u16> = fake
        .state
        .lock()
        .unwrap()
        .checkpoints
        .values()
        .map(|cp| cp.start)
        .collect();
    assert_eq!(remaining, vec![0x3000, 0xc010]);
}

#[tokio::test]
async fn checkpoint_hit_reports_breakpoint() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    backend.set_breakpoints(breakpoints(&[0xc010])).await.unwrap();
    backend.init().await.unwrap();
    fake.script_stops(&[0xc010]);
    backend.start().await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Breakpoint(Breakpoint::new(0xc010)))
    );
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Breakpoint))
    );
    assert!(!backend.is_running());
}

#[tokio::test]
async fn logpoint_logs_and_keeps_running() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    let logpoint = Breakpoint::new(0xc010).with_log_message("A={a}");
    backend
        .set_breakpoints([logpoint.clone()].into_iter().collect())
        .await
        .unwrap();
    backend.init().await.unwrap();
    fake.script_stops(&[0xc010]);
    backend.start().await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Logpoint { breakpoint: logpoint, message: "A=$05".to_string() })
    );
    assert!(backend.is_running());
    // One exit to start, one to continue past the logpoint.
    assert_eq!(fake.count(0xaa), 2);
}

#[tokio::test]
async fn step_in_advances_past_unmapped_code() {
    let mut lines = LineTable::new();
    lines.add_line(0xc000, 0xc001, Some("main.s"), 1);
    lines.add_line(0xc005, 0xc007, Some("main.s"), 2);
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    backend.set_debug_info(Some(Arc::new(lines)));
    backend.init().await.unwrap();
    backend.cpu_state().await.unwrap();

    fake.script_stops(&[0xc002, 0xc005]);
    backend.step(StepKind::In).await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Breakpoint))
    );
    assert_eq!(fake.count(0x71), 2);
    // The first advance steps in; the one out of unmapped code steps over.
    let state = fake.state.lock().unwrap();
    let advances: Vec<u8> = state
        .log
        .iter()
        .filter(|(code, _)| *code == 0x71)
        .map(|(_, body)| body[0])
        .collect();
    assert_eq!(advances, vec![0, 1]);
}

#[tokio::test]
async fn step_budget_fails_the_step() {
    let mut lines = LineTable::new();
    lines.add_line(0xc000, 0xc000, None, 1);
    let fake = FakeMonitor::start(FakeState::new()).await;
    let config = fake.config().with_unmapped_step_budget(Some(3));
    let mut backend = Backend::remote(config);
    backend.set_debug_info(Some(Arc::new(lines)));
    backend.init().await.unwrap();
    backend.step(StepKind::In).await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Failed))
    );
    assert_eq!(fake.count(0x71), 4);
}

#[tokio::test]
async fn run_to_address_uses_temporary_checkpoint() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    backend.init().await.unwrap();
    fake.script_stops(&[0xc123]);
    backend.step(StepKind::ToAddress(0xc123)).await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Breakpoint))
    );
    assert_eq!(fake.last_body(0x12)[7], 1);
    assert!(fake.state.lock().unwrap().checkpoints.is_empty());
}

#[tokio::test]
async fn interrupted_run_to_address_removes_its_checkpoint() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    backend.set_breakpoints(breakpoints(&[0xc050])).await.unwrap();
    backend.init().await.unwrap();
    fake.script_stops(&[0xc050]);
    backend.step(StepKind::ToAddress(0xc123)).await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Breakpoint(Breakpoint::new(0xc050)))
    );
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Breakpoint))
    );
    let remaining: Vec<u16> = fake
        .state
        .lock()
        .unwrap()
        .checkpoints
        .values()
        .map(|cp| cp.start)
        .collect();
    assert_eq!(remaining, vec![0xc050]);

    // Running past the old target does not stop there.
    fake.script_stops(&[0xc123, 0xc050]);
    backend.resume().await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Breakpoint(Breakpoint::new(0xc050)))
    );
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Breakpoint))
    );
}

#[tokio::test]
async fn run_to_breakpoint_address_reports_the_breakpoint() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    backend.set_breakpoints(breakpoints(&[0xc123])).await.unwrap();
    backend.init().await.unwrap();
    fake.script_stops(&[0xc123]);
    backend.step(StepKind::ToAddress(0xc123)).await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Breakpoint(Breakpoint::new(0xc123)))
    );
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Breakpoint))
    );
    // The temporary checkpoint went away when it was hit.
    assert_eq!(fake.count(0x13), 0);
    assert_eq!(fake.state.lock().unwrap().checkpoints.len(), 1);
}

#[tokio::test]
async fn stop_while_halted_sends_nothing() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    backend.init().await.unwrap();
    let reads = fake.count(0x31);
    backend.stop().await.unwrap();
    assert_eq!(fake.count(0x31), reads);

    backend.start().await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    backend.stop().await.unwrap();
    assert_eq!(fake.count(0x31), reads + 1);
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Interrupted))
    );
}

#[tokio::test]
async fn pause_stops_a_running_target() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    backend.init().await.unwrap();
    backend.start().await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    backend.pause().await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Break(0xc000)));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Pause))
    );
}

#[tokio::test]
async fn memory_is_cached_until_the_target_runs() {
    let mut state = FakeState::new();
    state.memory[0xc000] = 0xa9;
    state.memory[0xc001] = 0x05;
    let fake = FakeMonitor::start(state).await;
    let mut backend = Backend::remote(fake.config());
    backend.init().await.unwrap();

    assert_eq!(backend.read(0xc000, 2).await.unwrap(), 0x05a9);
    assert_eq!(backend.read(0xc001, 1).await.unwrap(), 0x05);
    assert_eq!(fake.count(0x01), 1);

    backend.write(0xc001, 0x07).await.unwrap();
    assert_eq!(fake.count(0x02), 1);
    assert_eq!(
        backend.read_memory(0xc000, 0xc001, MemoryKind::Default).await.unwrap(),
        vec![0xa9, 0x07]
    );
    assert_eq!(fake.count(0x01), 1);

    // Banked reads always go to the monitor.
    backend.read_memory(0xc000, 0xc001, MemoryKind::Ram).await.unwrap();
    assert_eq!(fake.count(0x01), 2);
    assert_eq!(&fake.last_body(0x01)[6..8], &[0x01, 0x00]);

    backend.start().await.unwrap();
    backend.read(0xc000, 1).await.unwrap();
    assert_eq!(fake.count(0x01), 3);

    assert!(matches!(
        backend.read(0x10000, 1).await,
        Err(DebugError::IllegalAddress(0x10000))
    ));
    assert!(matches!(
        backend.read(0xffff, 2).await,
        Err(DebugError::IllegalAddress(0x10000))
    ));
}

#[tokio::test]
async fn lost_connection_fails_the_session() {
    let fake = FakeMonitor::start(FakeState::new()).await;
    let mut backend = Backend::remote(fake.config());
    backend.init().await.unwrap();
    backend.start().await.unwrap();
    assert_eq!(next(&mut backend).await, Some(DebugEvent::Started));
    fake.hang_up.notify_one();
    assert!(matches!(next(&mut backend).await, Some(DebugEvent::Error(_))));
    assert_eq!(
        next(&mut backend).await,
        Some(DebugEvent::Stopped(StopReason::Failed))
    );
    assert_eq!(next(&mut backend).await, None);
    assert!(matches!(
        backend.cpu_state().await,
        Err(DebugError::NotConnected)
    ));
}

#[tokio::test]
async fn connect_gives_up_after_timeout() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = MonitorConfig::new("127.0.0.1", port)
        .with_connect_timeout(Duration::from_millis(200))
        .with_retry_interval(Duration::from_millis(50));
    let result = MonitorClient::connect(config).await;
    assert!(matches!(result, Err(MonitorError::ConnectTimeout { .. })));
}

//===========================================================================//
