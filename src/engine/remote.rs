use super::lifecycle::Lifecycle;
use crate::config::RemoteConfig;
use crate::debug::{
    Breakpoint, Breakpoints, CpuState, DebugEvent, DebugInfo, MemoryKind,
    RunFlags, StepKind, StopReason,
};
use crate::error::{DebugError, MonitorError, Result};
use crate::monitor::{Checkpoint, MonitorClient, MonitorEvent, Response};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

//===========================================================================//

const MEMORY_SIZE: usize = 0x10000;

//===========================================================================//

/// A backend that drives an external emulator through its binary monitor.
///
/// The emulator does the executing; this engine translates breakpoints into
/// checkpoints, and implements source-level stepping by classifying each
/// stop the monitor reports and issuing further single-instruction advances
/// until the step is complete.
pub struct RemoteEngine {
    config: RemoteConfig,
    client: Option<MonitorClient>,
    monitor_events: Option<mpsc::UnboundedReceiver<MonitorEvent>>,
    debug_info: Option<Arc<dyn DebugInfo>>,
    breakpoints: Breakpoints,
    lifecycle: Lifecycle,
    // True while the target is inside the monitor.
    stopped: bool,
    // True while the session wants the target to run freely.
    want_running: bool,
    active_breakpoint: Option<Breakpoint>,
    run_flags: Option<RunFlags>,
    // The temporary checkpoint of an unfinished run-to-address step.
    run_to_checkpoint: Option<u32>,
    pause_requested: bool,
    memory_cache: Option<Box<[u8; MEMORY_SIZE]>>,
}

impl RemoteEngine {
    /// Creates an unconnected engine.
    pub fn new(config: RemoteConfig) -> RemoteEngine {
        RemoteEngine {
            config,
            client: None,
            monitor_events: None,
            debug_info: None,
            breakpoints: Breakpoints::new(),
            lifecycle: Lifecycle::new(),
            stopped: false,
            want_running: false,
            active_breakpoint: None,
            run_flags: None,
            run_to_checkpoint: None,
            pause_requested: false,
            memory_cache: None,
        }
    }

    /// Connects to the monitor and applies the current breakpoint set.
    #[instrument(skip(self))]
    pub async fn init(&mut self) -> Result<()> {
        let (client, events) =
            MonitorClient::connect(self.config.monitor.clone()).await?;
        self.client = Some(client);
        self.monitor_events = Some(events);
        self.stopped = true;
        self.want_running = false;
        self.run_flags = None;
        self.run_to_checkpoint = None;
        self.active_breakpoint = None;
        self.memory_cache = None;
        self.sync_breakpoints().await
    }

    /// Returns the monitor connection, if there is one.
    pub fn client(&self) -> Option<&MonitorClient> {
        self.client.as_ref()
    }

    fn connection(&self) -> Result<&MonitorClient> {
        self.client.as_ref().ok_or(DebugError::NotConnected)
    }

    /// Returns true while the engine is running or stepping.
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Attaches source line information used by stepping.
    pub fn set_debug_info(&mut self, debug_info: Option<Arc<dyn DebugInfo>>) {
        self.debug_info = debug_info;
    }

    /// Replaces the breakpoint set and brings the monitor's checkpoints in
    /// line with it.
    pub async fn set_breakpoints(&mut self, breakpoints: Breakpoints) -> Result<()> {
        self.breakpoints = breakpoints;
        if self.client.is_some() {
            self.sync_breakpoints().await?;
        }
        Ok(())
    }

    /// Returns the current breakpoint set.
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    #[instrument(skip(self), fields(count = self.breakpoints.len()))]
    async fn sync_breakpoints(&mut self) -> Result<()> {
        let client = self.connection()?;
        let mut present = BTreeSet::new();
        for checkpoint in client.checkpoint_list().await? {
            if checkpoint.temporary {
                continue;
            }
            let wanted = self.breakpoints.get(checkpoint.start).is_some_and(|bp| {
                bp.enabled && bp.end() == checkpoint.end
            });
            if wanted && present.insert(checkpoint.start) {
                continue;
            }
            debug!(id = checkpoint.id, start = checkpoint.start, "deleting checkpoint");
            client.checkpoint_delete(checkpoint.id).await?;
        }
        for breakpoint in self.breakpoints.iter() {
            if !breakpoint.enabled || present.contains(&breakpoint.address) {
                continue;
            }
            let checkpoint = client
                .checkpoint_set(breakpoint.address, breakpoint.end(), false)
                .await?;
            debug!(id = checkpoint.id, start = checkpoint.start, "created checkpoint");
        }
        // Talking to the monitor halted the target.
        if self.want_running {
            self.stopped = false;
            self.connection()?.exit().await?;
        }
        Ok(())
    }

    /// Runs the target.
    pub async fn start(&mut self) -> Result<()> {
        self.resume().await
    }

    /// Resumes the target.
    pub async fn resume(&mut self) -> Result<()> {
        self.run_flags = None;
        self.pause_requested = false;
        self.active_breakpoint = None;
        self.want_running = true;
        self.lifecycle.started();
        self.invalidate_cache();
        self.drop_run_to().await?;
        self.stopped = false;
        self.connection()?.exit().await?;
        Ok(())
    }

    /// Begins a step of the given kind.
    pub async fn step(&mut self, kind: StepKind) -> Result<()> {
        let pc = self.connection()?.cpu_state()?.registers.pc;
        let start_line = self.debug_info.as_ref().and_then(|info| info.address_info(pc));
        debug!(?kind, pc, "step");
        self.run_flags = Some(RunFlags::new(kind, 0, start_line));
        self.pause_requested = false;
        self.active_breakpoint = None;
        self.want_running = false;
        self.lifecycle.started();
        self.invalidate_cache();
        self.drop_run_to().await?;
        self.stopped = false;
        match kind {
            StepKind::Out => self.connection()?.execute_until_return().await?,
            StepKind::ToAddress(addr) => {
                let client = self.connection()?;
                let checkpoint = client.checkpoint_set(addr, addr, true).await?;
                self.run_to_checkpoint = Some(checkpoint.id);
                self.connection()?.exit().await?;
            }
            StepKind::In | StepKind::Over => {
                self.connection()?.advance(kind != StepKind::In, 1).await?;
            }
        }
        Ok(())
    }

    /// Halts the target.  Completes (with `break` and `stopped(pause)`) once
    /// the target stops at an address with a source mapping.
    pub async fn pause(&mut self) -> Result<()> {
        if !self.lifecycle.is_running() {
            return Ok(());
        }
        self.want_running = false;
        self.pause_requested = true;
        self.run_flags = Some(RunFlags::new(StepKind::In, 0, None));
        self.drop_run_to().await?;
        if self.stopped {
            // Nothing will report a stop, so handle the current one.
            let pc = self.connection()?.cpu_state()?.registers.pc;
            return self.target_stopped(pc).await;
        }
        // Any command halts a running target.
        self.connection()?.registers_get().await?;
        Ok(())
    }

    /// Halts the target and reports `stopped(interrupted)`.
    pub async fn stop(&mut self) -> Result<()> {
        self.want_running = false;
        self.pause_requested = false;
        self.run_flags = None;
        self.drop_run_to().await?;
        if !self.stopped {
            if let Some(client) = &self.client {
                client.registers_get().await?;
            }
        }
        if self.lifecycle.is_running() {
            self.lifecycle.stopped(StopReason::Interrupted);
        }
        Ok(())
    }

    /// Removes all checkpoints, resumes the target, and disconnects.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.monitor_events = None;
        self.memory_cache = None;
        self.run_to_checkpoint = None;
        if let Some(client) = self.client.take() {
            client.disconnect().await?;
        }
        Ok(())
    }

    /// Reads the processor registers from the target.
    pub async fn cpu_state(&mut self) -> Result<CpuState> {
        Ok(self.connection()?.registers_get().await?)
    }

    /// Resets the target and autostarts a program file.  Entry point
    /// selection is left to the emulator.
    #[instrument(skip(self))]
    pub async fn load_program(
        &mut self,
        path: &Path,
        auto_offset_correction: bool,
        forced_start: Option<u16>,
    ) -> Result<()> {
        if forced_start.is_some() || !auto_offset_correction {
            debug!("entry point options are ignored by autostart");
        }
        let client = self.connection()?;
        client.reset(false).await?;
        client.autostart(&path.to_string_lossy(), true).await?;
        self.stopped = false;
        self.want_running = true;
        self.invalidate_cache();
        info!(path = %path.display(), "autostarted program");
        Ok(())
    }

    /// Reads a little-endian value of `size` bytes (1 or 2) at `addr`.
    pub async fn read(&mut self, addr: u32, size: usize) -> Result<u16> {
        let size = size.clamp(1, 2);
        let start = checked_index(addr)?;
        checked_index(addr + size as u32 - 1)?;
        let memory = self.cached_memory().await?;
        let value = memory[start..start + size]
            .iter()
            .rev()
            .fold(0u16, |value, &byte| (value << 8) | u16::from(byte));
        Ok(value)
    }

    /// Writes one byte.
    pub async fn write(&mut self, addr: u32, value: u8) -> Result<()> {
        let index = checked_index(addr)?;
        self.connection()?.memory_set(index as u16, vec![value]).await?;
        if let Some(cache) = self.memory_cache.as_mut() {
            cache[index] = value;
        }
        Ok(())
    }

    /// Reads `start..=end`.  The default (CPU) view is served from the
    /// memory cache; other kinds are read from their monitor bank.
    pub async fn read_memory(
        &mut self,
        start: u32,
        end: u32,
        kind: MemoryKind,
    ) -> Result<Vec<u8>> {
        let first = checked_index(start)?;
        let last = checked_index(end)?;
        if last < first {
            return Err(DebugError::IllegalAddress(end));
        }
        match kind {
            MemoryKind::Default | MemoryKind::Cpu => {
                let memory = self.cached_memory().await?;
                Ok(memory[first..=last].to_vec())
            }
            _ => Ok(self
                .connection()?
                .memory_get(first as u16, last as u16, kind)
                .await?),
        }
    }

    async fn cached_memory(&mut self) -> Result<&[u8; MEMORY_SIZE]> {
        if self.memory_cache.is_none() {
            let data = self
                .connection()?
                .memory_get(0x0000, 0xffff, MemoryKind::Default)
                .await?;
            if data.len() != MEMORY_SIZE {
                warn!(len = data.len(), "short memory snapshot");
            }
            let mut cache = Box::new([0u8; MEMORY_SIZE]);
            let len = data.len().min(MEMORY_SIZE);
            cache[..len].copy_from_slice(&data[..len]);
            self.memory_cache = Some(cache);
        }
        self.memory_cache.as_deref().ok_or(DebugError::NotConnected)
    }

    fn invalidate_cache(&mut self) {
        self.memory_cache = None;
    }

    /// Deletes the checkpoint of a run-to-address step that ended somewhere
    /// else.
    async fn drop_run_to(&mut self) -> Result<()> {
        let Some(id) = self.run_to_checkpoint.take() else {
            return Ok(());
        };
        let Some(client) = &self.client else {
            return Ok(());
        };
        debug!(id, "deleting run-to checkpoint");
        match client.checkpoint_delete(id).await {
            // Already gone.
            Ok(()) | Err(MonitorError::Remote { .. }) => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    fn is_mapped(&self, pc: u16) -> bool {
        match &self.debug_info {
            Some(info) if info.has_addresses() => info.address_info(pc).is_some(),
            _ => true,
        }
    }

    /// Returns the next event, processing monitor traffic until one is
    /// available.  Returns `None` once the connection is gone and every
    /// event has been delivered.
    pub async fn next_event(&mut self) -> Option<DebugEvent> {
        loop {
            if let Some(event) = self.lifecycle.next() {
                return Some(event);
            }
            let message = self.monitor_events.as_mut()?.recv().await;
            let result = match message {
                Some(MonitorEvent::Message(response)) => self.handle(response).await,
                Some(MonitorEvent::Closed { error }) => {
                    self.connection_lost(error);
                    Ok(())
                }
                None => {
                    self.connection_lost(None);
                    Ok(())
                }
            };
            if let Err(error) = result {
                warn!(%error, "monitor command failed");
                self.lifecycle.emit(DebugEvent::Error(error.to_string()));
                self.run_flags = None;
                self.lifecycle.stopped(StopReason::Failed);
                if let Err(error) = self.drop_run_to().await {
                    debug!(%error, "could not delete run-to checkpoint");
                }
            }
        }
    }

    fn connection_lost(&mut self, error: Option<String>) {
        let message = match error {
            Some(error) => format!("monitor connection lost: {error}"),
            None => "monitor connection closed".to_string(),
        };
        self.client = None;
        self.monitor_events = None;
        self.memory_cache = None;
        self.run_flags = None;
        self.run_to_checkpoint = None;
        self.lifecycle.emit(DebugEvent::Error(message));
        self.lifecycle.stopped(StopReason::Failed);
    }

    async fn handle(&mut self, response: Response) -> Result<()> {
        match response {
            Response::Checkpoint(checkpoint) => self.checkpoint_hit(checkpoint),
            Response::Resumed(_) => {
                self.stopped = false;
                self.invalidate_cache();
            }
            Response::Jam(pc) => {
                self.stopped = true;
                self.run_flags = None;
                self.lifecycle.emit(DebugEvent::Break(pc));
                self.lifecycle.stopped(StopReason::Break);
            }
            Response::Stopped(pc) => {
                self.stopped = true;
                self.invalidate_cache();
                self.target_stopped(pc).await?;
            }
            other => debug!(?other, "ignoring monitor message"),
        }
        Ok(())
    }

    fn checkpoint_hit(&mut self, checkpoint: Checkpoint) {
        if !checkpoint.currently_hit {
            return;
        }
        self.invalidate_cache();
        if self.run_to_checkpoint == Some(checkpoint.id) {
            // Temporary checkpoints are removed once hit.
            self.run_to_checkpoint = None;
        }
        let covering = self
            .breakpoints
            .find_covering(checkpoint.start)
            .filter(|bp| bp.enabled)
            .cloned();
        match covering {
            Some(breakpoint) => {
                debug!(id = checkpoint.id, address = checkpoint.start, "checkpoint hit");
                self.active_breakpoint = Some(breakpoint);
            }
            None => {
                debug!(id = checkpoint.id, address = checkpoint.start, "foreign checkpoint");
            }
        }
    }

    async fn log_hit(&mut self, breakpoint: Breakpoint) -> Result<()> {
        let state = self.connection()?.registers_get().await?;
        let message = breakpoint.format_message(&state).unwrap_or_default();
        self.lifecycle.emit(DebugEvent::Logpoint { breakpoint, message });
        Ok(())
    }

    async fn target_stopped(&mut self, pc: u16) -> Result<()> {
        let hit = self.active_breakpoint.take();
        let mapped = self.is_mapped(pc);
        if let Some(flags) = self.run_flags.as_mut() {
            if flags.policy_satisfied(pc, None) && mapped {
                self.run_flags = None;
                self.drop_run_to().await?;
                if std::mem::take(&mut self.pause_requested) {
                    self.lifecycle.emit(DebugEvent::Break(pc));
                    self.lifecycle.stopped(StopReason::Pause);
                    return Ok(());
                }
                match hit {
                    Some(breakpoint) if breakpoint.is_logpoint() => {
                        self.log_hit(breakpoint).await?;
                    }
                    Some(breakpoint) => {
                        self.lifecycle.emit(DebugEvent::Breakpoint(breakpoint));
                    }
                    None => {}
                }
                self.lifecycle.stopped(StopReason::Breakpoint);
                return Ok(());
            }
        }
        if let Some(breakpoint) = hit {
            if breakpoint.is_logpoint() {
                self.log_hit(breakpoint).await?;
            } else {
                self.run_flags = None;
                self.pause_requested = false;
                self.want_running = false;
                self.drop_run_to().await?;
                self.lifecycle.emit(DebugEvent::Breakpoint(breakpoint));
                self.lifecycle.stopped(StopReason::Breakpoint);
                return Ok(());
            }
        }
        if let Some(flags) = self.run_flags.as_mut() {
            let step_over = !mapped || flags.kind() != StepKind::In;
            if !mapped && flags.note_unmapped_step(self.config.unmapped_step_budget) {
                warn!(pc, "gave up looking for a mapped address");
                self.run_flags = None;
                self.pause_requested = false;
                self.drop_run_to().await?;
                self.lifecycle.stopped(StopReason::Failed);
                return Ok(());
            }
            self.stopped = false;
            self.connection()?.advance(step_over, 1).await?;
        } else if self.want_running {
            self.stopped = false;
            self.connection()?.exit().await?;
        } else if self.lifecycle.is_running() {
            self.lifecycle.stopped(StopReason::Unknown);
        }
        Ok(())
    }
}

fn checked_index(addr: u32) -> Result<usize> {
    if addr as usize >= MEMORY_SIZE {
        return Err(DebugError::IllegalAddress(addr));
    }
    Ok(addr as usize)
}

//===========================================================================//
