//! The engine-neutral data model shared by the local and remote backends.

mod breakpoint;
mod event;
mod info;
mod state;
mod step;

pub use breakpoint::{Breakpoint, Breakpoints};
pub use event::{DebugEvent, EventQueue, StopReason};
pub use info::{AddressInfo, DebugInfo, LineTable};
pub use state::{CpuFlags, CpuInfo, CpuRegisters, CpuState};
pub use step::{RunFlags, StepKind};

//===========================================================================//

/// Which view of the address space a memory read should see.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum MemoryKind {
    /// Whatever the backend considers the normal view (the CPU view).
    #[default]
    Default,
    /// Memory as the CPU currently sees it, with ROM and I/O overlays.
    Cpu,
    /// The underlying RAM, bypassing all overlays.
    Ram,
    /// ROM banks.
    Rom,
    /// The I/O area.
    Io,
    /// Cartridge memory.
    Cartridge,
}

impl MemoryKind {
    /// Returns the name of the remote monitor bank that holds this kind of
    /// memory, or `None` for the default CPU bank.
    pub fn bank_name(self) -> Option<&'static str> {
        match self {
            MemoryKind::Default | MemoryKind::Cpu => None,
            MemoryKind::Ram => Some("ram"),
            MemoryKind::Rom => Some("rom"),
            MemoryKind::Io => Some("io"),
            MemoryKind::Cartridge => Some("cart"),
        }
    }
}

//===========================================================================//


//===========================================================================//
