use super::lifecycle::Lifecycle;
use crate::bus::{C64Bus, Ram64k, SimBus};
use crate::config::{LocalConfig, Machine};
use crate::debug::{
    AddressInfo, Breakpoints, CpuState, DebugEvent, DebugInfo, MemoryKind,
    RunFlags, StepKind, StopReason,
};
use crate::error::{DebugError, Result};
use crate::prg::ProgramImage;
use crate::proc::Mos6502;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

//===========================================================================//

/// A handle for asking a running [`LocalEngine`] to pause or stop from
/// another task.  Requests take effect at the next instruction boundary.
#[derive(Debug, Default)]
pub struct EngineControl {
    pause: AtomicBool,
    stop: AtomicBool,
}

impl EngineControl {
    /// Asks the engine to pause.
    pub fn request_pause(&self) {
        self.pause.store(true, Ordering::SeqCst);
    }

    /// Asks the engine to stop.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn reset(&self) {
        self.pause.store(false, Ordering::SeqCst);
        self.stop.store(false, Ordering::SeqCst);
    }
}

//===========================================================================//

struct RunState {
    flags: Option<RunFlags>,
    // Set for the first instruction after a resume or step, so that the
    // breakpoint the engine stopped at does not fire again immediately.
    skip_breakpoint: bool,
}

//===========================================================================//

/// A backend that runs the program on the built-in 6502 interpreter.
///
/// Execution is cooperative: [`LocalEngine::next_event`] runs the processor
/// in bounded slices and yields between them, so a long-running program
/// never blocks the caller's executor.
pub struct LocalEngine {
    config: LocalConfig,
    cpu: Mos6502,
    bus: Box<dyn SimBus + Send>,
    breakpoints: Breakpoints,
    debug_info: Option<Arc<dyn DebugInfo>>,
    lifecycle: Lifecycle,
    run: Option<RunState>,
    control: Arc<EngineControl>,
}

impl LocalEngine {
    /// Creates an engine for the configured machine.
    pub fn new(config: LocalConfig) -> LocalEngine {
        let bus: Box<dyn SimBus + Send> = match &config.machine {
            Machine::Flat => Box::new(Ram64k::new()),
            Machine::C64(roms) => Box::new(C64Bus::new(roms.clone())),
        };
        LocalEngine {
            config,
            cpu: Mos6502::new(),
            bus,
            breakpoints: Breakpoints::new(),
            debug_info: None,
            lifecycle: Lifecycle::new(),
            run: None,
            control: Arc::new(EngineControl::default()),
        }
    }

    /// Powers the machine on and resets the processor through its reset
    /// vector.
    pub fn init(&mut self) {
        self.run = None;
        self.lifecycle.clear();
        self.control.reset();
        self.bus.power_on(None);
        self.cpu.reset(&mut *self.bus, None);
        debug!(machine = %self.bus.description(), "initialized");
    }

    /// Returns a description of the simulated machine.
    pub fn description(&self) -> String {
        self.bus.description()
    }

    /// Returns a handle for pausing or stopping the engine from elsewhere.
    pub fn control(&self) -> Arc<EngineControl> {
        Arc::clone(&self.control)
    }

    /// Returns true while the engine is running or stepping.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Attaches source line information used by stepping.
    pub fn set_debug_info(&mut self, debug_info: Option<Arc<dyn DebugInfo>>) {
        self.debug_info = debug_info;
    }

    /// Replaces the breakpoint set.
    pub fn set_breakpoints(&mut self, breakpoints: Breakpoints) {
        debug!(count = breakpoints.len(), "breakpoints updated");
        self.breakpoints = breakpoints;
    }

    /// Returns the current breakpoint set.
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// Starts running from the current program counter.  A breakpoint at
    /// that address fires immediately.
    pub fn start(&mut self) {
        self.begin(None, false);
    }

    /// Continues running, without re-triggering a breakpoint at the current
    /// program counter.
    pub fn resume(&mut self) {
        self.begin(None, true);
    }

    /// Begins a step of the given kind.
    pub fn step(&mut self, kind: StepKind) {
        let pc = self.cpu.pc();
        let flags = RunFlags::new(kind, self.cpu.call_depth(), self.line_at(pc));
        debug!(?kind, pc, depth = self.cpu.call_depth(), "step");
        self.begin(Some(flags), true);
    }

    fn begin(&mut self, flags: Option<RunFlags>, skip_breakpoint: bool) {
        self.control.reset();
        self.run = Some(RunState { flags, skip_breakpoint });
        self.lifecycle.started();
    }

    /// Pauses immediately if running.
    pub fn pause(&mut self) {
        if self.run.is_some() {
            self.lifecycle.emit(DebugEvent::Break(self.cpu.pc()));
            self.finish(StopReason::Pause);
        }
    }

    /// Stops immediately if running.
    pub fn stop(&mut self) {
        if self.run.is_some() {
            self.finish(StopReason::Interrupted);
        }
    }

    fn finish(&mut self, reason: StopReason) {
        self.run = None;
        self.lifecycle.stopped(reason);
    }

    /// Returns the next event, running the processor as needed to produce
    /// one.  Returns `None` once the engine is stopped and every event has
    /// been delivered.
    pub async fn next_event(&mut self) -> Option<DebugEvent> {
        loop {
            if let Some(event) = self.lifecycle.next() {
                return Some(event);
            }
            self.run.as_ref()?;
            self.run_slice();
            if self.run.is_some() && !self.lifecycle.has_events() {
                tokio::time::sleep(self.config.slice_sleep).await;
            }
        }
    }

    /// Like [`LocalEngine::next_event`], but runs at most one slice and
    /// never sleeps.
    pub fn poll_event(&mut self) -> Option<DebugEvent> {
        if !self.lifecycle.has_events() && self.run.is_some() {
            self.run_slice();
        }
        self.lifecycle.next()
    }

    fn run_slice(&mut self) {
        let started = Instant::now();
        let check_interval = u64::from(self.config.slice_check_interval.max(1));
        let mut steps: u64 = 0;
        while self.run.is_some() {
            if let Some(reason) = self.check_control().or_else(|| self.tick()) {
                self.finish(reason);
                return;
            }
            steps += 1;
            if self.config.slice_max_steps.is_some_and(|max| steps >= max) {
                return;
            }
            if steps % check_interval == 0
                && started.elapsed() >= self.config.slice_time
            {
                return;
            }
        }
    }

    fn check_control(&mut self) -> Option<StopReason> {
        if self.control.stop.swap(false, Ordering::SeqCst) {
            return Some(StopReason::Interrupted);
        }
        if self.control.pause.swap(false, Ordering::SeqCst) {
            self.lifecycle.emit(DebugEvent::Break(self.cpu.pc()));
            return Some(StopReason::Pause);
        }
        None
    }

    /// Executes one instruction, returning why the engine should stop, if
    /// it should.
    fn tick(&mut self) -> Option<StopReason> {
        let pc = self.cpu.pc();
        let run = self.run.as_mut()?;
        let skip = run.skip_breakpoint;
        run.skip_breakpoint = false;
        let stop_address = run.flags.as_ref().and_then(RunFlags::stop_address);
        if !skip {
            if let Some(breakpoint) = self.breakpoints.triggered_at(pc) {
                if breakpoint.is_logpoint() {
                    let message = breakpoint
                        .format_message(&self.cpu.state())
                        .unwrap_or_default();
                    self.lifecycle.emit(DebugEvent::Logpoint {
                        breakpoint: breakpoint.clone(),
                        message,
                    });
                } else {
                    self.lifecycle.emit(DebugEvent::Breakpoint(breakpoint.clone()));
                    return Some(StopReason::Breakpoint);
                }
            }
            if stop_address == Some(pc) {
                return Some(StopReason::Breakpoint);
            }
        }

        if let Err(halt) = self.cpu.step(&mut *self.bus) {
            debug!(?halt, pc, "processor break");
            self.lifecycle.emit(DebugEvent::Break(pc));
            return Some(StopReason::Break);
        }
        if self.cpu.return_reached() {
            return Some(StopReason::Exit);
        }

        let pc = self.cpu.pc();
        let depth = self.cpu.call_depth();
        let mapped = self.is_mapped(pc);
        let budget = self.config.unmapped_step_budget;
        let flags = self.run.as_mut()?.flags.as_mut()?;
        if flags.stop_address().is_some() || !flags.policy_satisfied(pc, Some(depth))
        {
            return None;
        }
        if mapped {
            return Some(StopReason::Breakpoint);
        }
        if flags.note_unmapped_step(budget) {
            warn!(pc, "gave up looking for a mapped address");
            return Some(StopReason::Failed);
        }
        None
    }

    fn line_at(&self, pc: u16) -> Option<AddressInfo> {
        self.debug_info.as_ref()?.address_info(pc)
    }

    fn is_mapped(&self, pc: u16) -> bool {
        match &self.debug_info {
            Some(info) if info.has_addresses() => info.address_info(pc).is_some(),
            _ => true,
        }
    }

    /// Returns a snapshot of the processor state.
    pub fn cpu_state(&self) -> CpuState {
        let mut state = self.cpu.state();
        if matches!(self.config.machine, Machine::C64(_)) {
            state.info.zero0 = Some(self.bus.peek_ram(0x0000));
            state.info.zero1 = Some(self.bus.peek_ram(0x0001));
        }
        state
    }

    /// Sets a register by name (A, X, Y, P, S or PC).  Returns false if there
    /// is no such register.
    pub fn set_register(&mut self, name: &str, value: u32) -> bool {
        self.cpu.set_register(name, value)
    }

    /// Reads a little-endian value of `size` bytes (1 or 2) at `addr`,
    /// without side effects.
    pub fn read(&self, addr: u32, size: usize) -> Result<u16> {
        let size = size.clamp(1, 2) as u32;
        let addr = checked_address(addr)?;
        checked_address(u32::from(addr) + size - 1)?;
        let lo = self.bus.peek_byte(addr);
        if size == 1 {
            return Ok(u16::from(lo));
        }
        let hi = self.bus.peek_byte(addr + 1);
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Writes one byte.
    pub fn write(&mut self, addr: u32, value: u8) -> Result<()> {
        let addr = checked_address(addr)?;
        self.bus.write_byte(addr, value);
        Ok(())
    }

    /// Reads `start..=end`.  [`MemoryKind::Ram`] sees the RAM under any ROM
    /// overlays; every other kind sees what the processor sees.
    pub fn read_memory(
        &self,
        start: u32,
        end: u32,
        kind: MemoryKind,
    ) -> Result<Vec<u8>> {
        let start = checked_address(start)?;
        let end = checked_address(end)?;
        if end < start {
            return Err(DebugError::IllegalAddress(u32::from(end)));
        }
        let bytes = (start..=end)
            .map(|addr| match kind {
                MemoryKind::Ram => self.bus.peek_ram(addr),
                _ => self.bus.peek_byte(addr),
            })
            .collect();
        Ok(bytes)
    }

    /// Loads a program file and resets the processor to its entry point.
    /// Returns the entry point.
    pub fn load_program(
        &mut self,
        path: &Path,
        auto_offset_correction: bool,
        forced_start: Option<u16>,
    ) -> Result<u16> {
        let file = File::open(path)?;
        let image = ProgramImage::read_from(BufReader::new(file)).map_err(
            |error| match error.kind() {
                io::ErrorKind::InvalidData => {
                    DebugError::InvalidProgram(format!("{}: {error}", path.display()))
                }
                _ => DebugError::Io(error),
            },
        )?;
        Ok(self.load_image(&image, auto_offset_correction, forced_start))
    }

    /// Places an already-parsed program into freshly powered-on memory and
    /// resets the processor to its entry point.  Returns the entry point.
    pub fn load_image(
        &mut self,
        image: &ProgramImage,
        auto_offset_correction: bool,
        forced_start: Option<u16>,
    ) -> u16 {
        let entry = image.entry_point(auto_offset_correction, forced_start);
        self.run = None;
        self.control.reset();
        self.bus.power_on(Some(entry));
        let mut addr = image.load_address();
        for &byte in image.data() {
            self.bus.write_byte(addr, byte);
            addr = addr.wrapping_add(1);
        }
        self.cpu.reset(&mut *self.bus, Some(entry));
        info!(
            load = image.load_address(),
            len = image.data().len(),
            entry,
            "loaded program"
        );
        entry
    }
}

fn checked_address(addr: u32) -> Result<u16> {
    u16::try_from(addr).map_err(|_| DebugError::IllegalAddress(addr))
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::LocalEngine;
    use crate::config::LocalConfig;
    use crate::debug::{DebugEvent, MemoryKind, StopReason};
    use crate::error::DebugError;
    use crate::prg::ProgramImage;

    fn engine_with(load: u16, code: &[u8]) -> LocalEngine {
        let mut engine = LocalEngine::new(LocalConfig::default());
        let image = ProgramImage::new(load, code.to_vec()).unwrap();
        engine.load_image(&image, false, None);
        engine
    }

    fn drain(engine: &mut LocalEngine) -> Vec<DebugEvent> {
        let mut events = Vec::new();
        while let Some(event) = engine.poll_event() {
            events.push(event);
        }
        events
    }

    #[test]
    fn illegal_addresses() {
        let mut engine = engine_with(0xc000, &[0x60]);
        assert!(matches!(
            engine.read(0x10000, 1),
            Err(DebugError::IllegalAddress(0x10000))
        ));
        assert!(matches!(engine.read(0xffff, 2), Err(DebugError::IllegalAddress(_))));
        assert!(matches!(
            engine.write(0x12345, 0),
            Err(DebugError::IllegalAddress(0x12345))
        ));
        assert!(engine.read_memory(0xc000, 0x10000, MemoryKind::Default).is_err());
    }

    #[test]
    fn read_and_write() {
        let mut engine = engine_with(0xc000, &[0x34, 0x12]);
        assert_eq!(engine.read(0xc000, 2).unwrap(), 0x1234);
        assert_eq!(engine.read(0xc001, 1).unwrap(), 0x12);
        engine.write(0xc002, 0x56).unwrap();
        assert_eq!(
            engine.read_memory(0xc000, 0xc002, MemoryKind::Ram).unwrap(),
            vec![0x34, 0x12, 0x56]
        );
        // Load wrote the reset vector.
        assert_eq!(engine.read(0xfffc, 2).unwrap(), 0xc000);
    }

    #[test]
    fn pause_and_stop_are_immediate() {
        // An infinite loop.
        let mut engine = engine_with(0xc000, &[0x4c, 0x00, 0xc0]);
        engine.start();
        engine.pause();
        assert_eq!(
            drain(&mut engine),
            vec![
                DebugEvent::Started,
                DebugEvent::Break(0xc000),
                DebugEvent::Stopped(StopReason::Pause),
            ]
        );
        engine.resume();
        engine.stop();
        assert_eq!(
            drain(&mut engine),
            vec![DebugEvent::Started, DebugEvent::Stopped(StopReason::Interrupted)]
        );
        // Stopping when already stopped does nothing.
        engine.stop();
        assert!(engine.poll_event().is_none());
    }

    #[test]
    fn control_handle_stops_running_engine() {
        let mut engine = LocalEngine::new(
            LocalConfig::default().with_slice_max_steps(10),
        );
        let image = ProgramImage::new(0xc000, vec![0x4c, 0x00, 0xc0]).unwrap();
        engine.load_image(&image, false, None);
        engine.start();
        assert_eq!(engine.poll_event(), Some(DebugEvent::Started));
        // A slice ran out of steps without stopping.
        assert_eq!(engine.poll_event(), None);
        assert!(engine.is_running());
        engine.control().request_stop();
        assert_eq!(
            engine.poll_event(),
            Some(DebugEvent::Stopped(StopReason::Interrupted))
        );
        assert!(!engine.is_running());
    }
}

//===========================================================================//
