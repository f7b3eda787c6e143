//! Execution backends.  Both present the same contract to a debug session:
//! run control, stepping, breakpoints, memory access, and a stream of
//! [`DebugEvent`]s.

mod lifecycle;
mod local;
mod remote;

pub use lifecycle::Lifecycle;
pub use local::{EngineControl, LocalEngine};
pub use remote::RemoteEngine;

use crate::config::{LocalConfig, RemoteConfig};
use crate::debug::{Breakpoints, CpuState, DebugEvent, DebugInfo, MemoryKind, StepKind};
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;

//===========================================================================//

/// The active execution backend of a debug session.
pub enum Backend {
    /// The built-in interpreter.
    Local(LocalEngine),
    /// An external emulator reached through its binary monitor.
    Remote(RemoteEngine),
}

impl Backend {
    /// Returns a local backend.
    pub fn local(config: LocalConfig) -> Backend {
        Backend::Local(LocalEngine::new(config))
    }

    /// Returns an unconnected remote backend.
    pub fn remote(config: RemoteConfig) -> Backend {
        Backend::Remote(RemoteEngine::new(config))
    }

    /// Prepares the backend: powers on the local machine, or connects to the
    /// monitor.
    pub async fn init(&mut self) -> Result<()> {
        match self {
            Backend::Local(engine) => {
                engine.init();
                Ok(())
            }
            Backend::Remote(engine) => engine.init().await,
        }
    }

    /// Starts running.
    pub async fn start(&mut self) -> Result<()> {
        match self {
            Backend::Local(engine) => {
                engine.start();
                Ok(())
            }
            Backend::Remote(engine) => engine.start().await,
        }
    }

    /// Continues running after a stop.
    pub async fn resume(&mut self) -> Result<()> {
        match self {
            Backend::Local(engine) => {
                engine.resume();
                Ok(())
            }
            Backend::Remote(engine) => engine.resume().await,
        }
    }

    /// Asks the backend to pause.
    pub async fn pause(&mut self) -> Result<()> {
        match self {
            Backend::Local(engine) => {
                engine.pause();
                Ok(())
            }
            Backend::Remote(engine) => engine.pause().await,
        }
    }

    /// Asks the backend to stop.
    pub async fn stop(&mut self) -> Result<()> {
        match self {
            Backend::Local(engine) => {
                engine.stop();
                Ok(())
            }
            Backend::Remote(engine) => engine.stop().await,
        }
    }

    /// Begins a step.
    pub async fn step(&mut self, kind: StepKind) -> Result<()> {
        match self {
            Backend::Local(engine) => {
                engine.step(kind);
                Ok(())
            }
            Backend::Remote(engine) => engine.step(kind).await,
        }
    }

    /// Reads a little-endian value of 1 or 2 bytes.
    pub async fn read(&mut self, addr: u32, size: usize) -> Result<u16> {
        match self {
            Backend::Local(engine) => engine.read(addr, size),
            Backend::Remote(engine) => engine.read(addr, size).await,
        }
    }

    /// Writes one byte.
    pub async fn write(&mut self, addr: u32, value: u8) -> Result<()> {
        match self {
            Backend::Local(engine) => engine.write(addr, value),
            Backend::Remote(engine) => engine.write(addr, value).await,
        }
    }

    /// Reads `start..=end` as seen through `kind`.
    pub async fn read_memory(
        &mut self,
        start: u32,
        end: u32,
        kind: MemoryKind,
    ) -> Result<Vec<u8>> {
        match self {
            Backend::Local(engine) => engine.read_memory(start, end, kind),
            Backend::Remote(engine) => engine.read_memory(start, end, kind).await,
        }
    }

    /// Replaces the breakpoint set.
    pub async fn set_breakpoints(&mut self, breakpoints: Breakpoints) -> Result<()> {
        match self {
            Backend::Local(engine) => {
                engine.set_breakpoints(breakpoints);
                Ok(())
            }
            Backend::Remote(engine) => engine.set_breakpoints(breakpoints).await,
        }
    }

    /// Returns the processor state.
    pub async fn cpu_state(&mut self) -> Result<CpuState> {
        match self {
            Backend::Local(engine) => Ok(engine.cpu_state()),
            Backend::Remote(engine) => engine.cpu_state().await,
        }
    }

    /// Loads a program file.
    pub async fn load_program(
        &mut self,
        path: &Path,
        auto_offset_correction: bool,
        forced_start: Option<u16>,
    ) -> Result<()> {
        match self {
            Backend::Local(engine) => engine
                .load_program(path, auto_offset_correction, forced_start)
                .map(drop),
            Backend::Remote(engine) => {
                engine
                    .load_program(path, auto_offset_correction, forced_start)
                    .await
            }
        }
    }

    /// Attaches source line information used by stepping.
    pub fn set_debug_info(&mut self, debug_info: Option<Arc<dyn DebugInfo>>) {
        match self {
            Backend::Local(engine) => engine.set_debug_info(debug_info),
            Backend::Remote(engine) => engine.set_debug_info(debug_info),
        }
    }

    /// Returns true while the backend is running or stepping.
    pub fn is_running(&self) -> bool {
        match self {
            Backend::Local(engine) => engine.is_running(),
            Backend::Remote(engine) => engine.is_running(),
        }
    }

    /// Waits for the next event.  A local backend returns `None` once it is
    /// stopped with nothing left to report; a remote backend keeps waiting on
    /// the monitor and returns `None` only after the connection is gone.
    pub async fn next_event(&mut self) -> Option<DebugEvent> {
        match self {
            Backend::Local(engine) => engine.next_event().await,
            Backend::Remote(engine) => engine.next_event().await,
        }
    }

    /// Releases the backend's connection, if it has one.
    pub async fn disconnect(&mut self) -> Result<()> {
        match self {
            Backend::Local(_) => Ok(()),
            Backend::Remote(engine) => engine.disconnect().await,
        }
    }
}

//===========================================================================//
