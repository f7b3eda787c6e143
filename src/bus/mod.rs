//! Facilities for simulating the memory bus seen by a 6502/6510 processor.

mod c64;
mod ram;

pub use c64::{C64Bus, RomSet};
pub use ram::Ram64k;

//===========================================================================//

/// A simulated 16-bit memory bus.
///
/// Addresses are `u16`, so every value is a valid location; range checking
/// for wider addresses coming from a debug session happens in the engines
/// before the bus is touched.
pub trait SimBus {
    /// Returns a human-readable description of this simulated memory bus.
    fn description(&self) -> String;

    /// Returns the value of a single byte in memory, if the processor were to
    /// read it, but without performing any side effects that would occur if
    /// the processor actually read the byte.
    fn peek_byte(&self, addr: u16) -> u8;

    /// Returns the byte stored in the underlying RAM at the given address,
    /// ignoring any ROM or I/O that is currently mapped over it.
    fn peek_ram(&self, addr: u16) -> u8 {
        self.peek_byte(addr)
    }

    /// Reads a single byte from memory.
    ///
    /// Note that this is a `&mut self` method, since some hardware registers
    /// may have side effects when read.
    fn read_byte(&mut self, addr: u16) -> u8;

    /// Writes a single byte to memory.
    fn write_byte(&mut self, addr: u16, data: u8);

    /// Puts memory into its power-on state.  If a start address is given and
    /// the machine has a writable reset vector, the vector is pointed at it.
    fn power_on(&mut self, start: Option<u16>);
}

//===========================================================================//

pub(crate) fn describe_size(size: usize, kind: &str) -> String {
    if size < 1024 {
        format!("{size}B {kind}")
    } else if size < 1024 * 1024 {
        format!("{}kB {kind}", size >> 10)
    } else {
        format!("{}MB {kind}", size >> 20)
    }
}

//===========================================================================//


//===========================================================================//
