use std::fmt;

//===========================================================================//

/// The architectural registers of a 6502.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CpuRegisters {
    /// The program counter.
    pub pc: u16,
    /// The accumulator.
    pub a: u8,
    /// The X index register.
    pub x: u8,
    /// The Y index register.
    pub y: u8,
    /// The stack pointer (an offset into page $01).
    pub s: u8,
}

//===========================================================================//

/// The processor status flags of a 6502, unpacked.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CpuFlags {
    /// Negative.
    pub n: bool,
    /// Zero.
    pub z: bool,
    /// Carry.
    pub c: bool,
    /// Overflow.
    pub v: bool,
    /// Interrupt disable.
    pub i: bool,
    /// Decimal mode.
    pub d: bool,
    /// Break.
    pub b: bool,
}

impl CpuFlags {
    /// Unpacks a P register value.
    pub fn from_bits(bits: u8) -> CpuFlags {
        CpuFlags {
            n: (bits & 0x80) != 0,
            v: (bits & 0x40) != 0,
            b: (bits & 0x10) != 0,
            d: (bits & 0x08) != 0,
            i: (bits & 0x04) != 0,
            z: (bits & 0x02) != 0,
            c: (bits & 0x01) != 0,
        }
    }

    /// Packs these flags into a P register value.  The unused bit 5 is
    /// always set, as it is whenever the 6502 pushes P.
    pub fn bits(&self) -> u8 {
        let mut bits = 0x20;
        for (flag, mask) in [
            (self.n, 0x80),
            (self.v, 0x40),
            (self.b, 0x10),
            (self.d, 0x08),
            (self.i, 0x04),
            (self.z, 0x02),
            (self.c, 0x01),
        ] {
            if flag {
                bits |= mask;
            }
        }
        bits
    }
}

impl fmt::Display for CpuFlags {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        for (flag, set, clear) in [
            (self.n, 'N', 'n'),
            (self.v, 'V', 'v'),
            (self.b, 'B', 'b'),
            (self.d, 'D', 'd'),
            (self.i, 'I', 'i'),
            (self.z, 'Z', 'z'),
            (self.c, 'C', 'c'),
        ] {
            write!(formatter, "{}", if flag { set } else { clear })?;
        }
        Ok(())
    }
}

//===========================================================================//

/// Everything about the processor beyond its registers and flags.  The
/// machine-specific fields are only filled in by backends that can supply
/// them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CpuInfo {
    /// True if the IRQ line is asserted.
    pub irq: bool,
    /// True if the NMI line is asserted.
    pub nmi: bool,
    /// The opcode at the program counter.
    pub opcode: u8,
    /// The cumulative cycle count.
    pub cycles: u64,
    /// The shadow call stack of return addresses, oldest first.
    pub call_stack: Vec<u16>,
    /// The 6510 data direction register at $00.
    pub zero0: Option<u8>,
    /// The 6510 I/O port at $01.
    pub zero1: Option<u8>,
    /// The current raster line.
    pub raster_line: Option<u16>,
    /// The current cycle within the raster line.
    pub raster_cycle: Option<u16>,
}

//===========================================================================//

/// An immutable snapshot of the processor state.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CpuState {
    /// The registers.
    pub registers: CpuRegisters,
    /// The status flags.
    pub flags: CpuFlags,
    /// Additional information.
    pub info: CpuInfo,
}

impl fmt::Display for CpuState {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let regs = &self.registers;
        write!(
            formatter,
            "PC=${:04x} A=${:02x} X=${:02x} Y=${:02x} S=${:02x} P={} \
             cycles={}",
            regs.pc, regs.a, regs.x, regs.y, regs.s, self.flags,
            self.info.cycles
        )
    }
}

//===========================================================================//


//===========================================================================//
