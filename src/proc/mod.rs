//! Facilities for simulating a 6502-family processor.

mod mos6502;

pub use mos6502::{CALL_STACK_CAPACITY, Mos6502};

//===========================================================================//

/// A condition that pauses or halts the simulation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SimBreak {
    /// The processor executed a BRK instruction.  The interrupt sequence has
    /// already run, so the program counter now points at the IRQ handler.
    Break,
    /// The processor executed an instruction (with the given mnemonic and
    /// opcode) that halts the processor, and now the processor cannot continue
    /// until a reset and/or interrupt occurs.
    HaltOpcode(&'static str, u8),
}

//===========================================================================//
