use super::SimBreak;
use crate::bus::SimBus;
use crate::debug::{CpuFlags, CpuInfo, CpuRegisters, CpuState};

//===========================================================================//

const PROC_FLAG_N: u8 = 0b1000_0000;
const PROC_FLAG_V: u8 = 0b0100_0000;
const PROC_FLAG_U: u8 = 0b0010_0000;
const PROC_FLAG_B: u8 = 0b0001_0000;
const PROC_FLAG_D: u8 = 0b0000_1000;
const PROC_FLAG_I: u8 = 0b0000_0100;
const PROC_FLAG_Z: u8 = 0b0000_0010;
const PROC_FLAG_C: u8 = 0b0000_0001;

// The P register in the 6502 only has six physical bits that can be set; any
// others will be discarded by the PLP instruction.
const REG_P_MASK: u8 = PROC_FLAG_N
    | PROC_FLAG_V
    | PROC_FLAG_D
    | PROC_FLAG_I
    | PROC_FLAG_Z
    | PROC_FLAG_C;

const NMI_VECTOR: u16 = 0xfffa;
const RESET_VECTOR: u16 = 0xfffc;
const IRQ_VECTOR: u16 = 0xfffe;

const OPCODE_JSR: u8 = 0x20;
const OPCODE_RTS: u8 = 0x60;

// Magic constant used by the unstable ANE and LXA opcodes.
const UNSTABLE_MAGIC: u8 = 0xee;

/// The maximum number of return addresses tracked by the shadow call stack.
pub const CALL_STACK_CAPACITY: usize = 128;

// Base cycle counts for each opcode on an NMOS 6502, not including penalties
// for page crossings or taken branches.  JAM opcodes cost nothing since they
// never complete.
#[rustfmt::skip]
const CYCLES: [u8; 256] = [
    7, 6, 0, 8, 3, 3, 5, 5, 3, 2, 2, 2, 4, 4, 6, 6, // 0x
    2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 1x
    6, 6, 0, 8, 3, 3, 5, 5, 4, 2, 2, 2, 4, 4, 6, 6, // 2x
    2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 3x
    6, 6, 0, 8, 3, 3, 5, 5, 3, 2, 2, 2, 3, 4, 6, 6, // 4x
    2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 5x
    6, 6, 0, 8, 3, 3, 5, 5, 4, 2, 2, 2, 5, 4, 6, 6, // 6x
    2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 7x
    2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4, // 8x
    2, 6, 0, 6, 4, 4, 4, 4, 2, 5, 2, 5, 5, 5, 5, 5, // 9x
    2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4, // Ax
    2, 5, 0, 5, 4, 4, 4, 4, 2, 4, 2, 4, 4, 4, 4, 4, // Bx
    2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6, // Cx
    2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // Dx
    2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6, // Ex
    2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // Fx
];

//===========================================================================//

/// An instruction addressing mode (for a 6502 processor).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum AddrMode {
    Immediate,
    Absolute,
    AbsoluteIndirect,
    XIndexedAbsolute,
    YIndexedAbsolute,
    ZeroPage,
    XIndexedZeroPage,
    YIndexedZeroPage,
    XIndexedZeroPageIndirect,
    ZeroPageIndirectYIndexed,
}

//===========================================================================//

/// A simulated MOS 6502/6510 processor.
///
/// Besides the architectural registers, the simulation keeps a cycle counter
/// and a shadow call stack of return addresses (pushed by `JSR`, popped by
/// `RTS`) that debuggers use to implement step-over and step-out.
pub struct Mos6502 {
    pc: u16,
    reg_s: u8,
    reg_p: u8,
    reg_a: u8,
    reg_x: u8,
    reg_y: u8,
    break_flag: bool,
    opcode: u8,
    cycles: u64,
    call_stack: Vec<u16>,
    return_reached: bool,
    irq_line: bool,
    nmi_line: bool,
    nmi_pending: bool,
    page_crossed: bool,
}

impl Mos6502 {
    /// Returns a new simulated processor.  Call [`Mos6502::reset`] before
    /// stepping it to load the program counter from the reset vector.
    pub fn new() -> Mos6502 {
        Mos6502 {
            pc: 0,
            reg_s: 0xff,
            reg_p: 0,
            reg_a: 0,
            reg_x: 0,
            reg_y: 0,
            break_flag: false,
            opcode: 0,
            cycles: 0,
            call_stack: Vec::with_capacity(CALL_STACK_CAPACITY),
            return_reached: false,
            irq_line: false,
            nmi_line: false,
            nmi_pending: false,
            page_crossed: false,
        }
    }

    /// Resets the processor.  The program counter is loaded from the reset
    /// vector, unless a start address is given.  All registers are zeroed
    /// except the stack pointer, which is set to $FF.
    pub fn reset(&mut self, bus: &mut dyn SimBus, start: Option<u16>) {
        self.reg_a = 0;
        self.reg_x = 0;
        self.reg_y = 0;
        self.reg_p = 0;
        self.reg_s = 0xff;
        self.break_flag = false;
        self.cycles = 0;
        self.call_stack.clear();
        self.return_reached = false;
        self.nmi_pending = false;
        self.pc = match start {
            Some(addr) => addr,
            None => self.read_vector(bus, RESET_VECTOR),
        };
        self.opcode = bus.peek_byte(self.pc);
    }

    /// Returns the current address of the program counter.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Sets the current address of the program counter.
    pub fn set_pc(&mut self, addr: u16) {
        self.pc = addr;
    }

    /// Returns the number of cycles executed since the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Returns the shadow call stack, oldest entry first.
    pub fn call_stack(&self) -> &[u16] {
        &self.call_stack
    }

    /// Returns the number of entries on the shadow call stack.
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Returns true if the last instruction was an `RTS` executed with an
    /// empty hardware stack, i.e. the program returned from its entry point.
    pub fn return_reached(&self) -> bool {
        self.return_reached
    }

    /// Returns true if a BRK has been executed and not yet returned from.
    pub fn break_flag(&self) -> bool {
        self.break_flag
    }

    /// Sets the level of the IRQ input line.  While asserted, an interrupt is
    /// taken before the next instruction whenever the I flag is clear.
    pub fn set_irq(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    /// Sets the level of the NMI input line.  A non-maskable interrupt is
    /// taken on each transition from deasserted to asserted.
    pub fn set_nmi(&mut self, asserted: bool) {
        if asserted && !self.nmi_line {
            self.nmi_pending = true;
        }
        self.nmi_line = asserted;
    }

    /// Returns the names of the registers accepted by
    /// [`Mos6502::get_register`] and [`Mos6502::set_register`].
    pub fn register_names(&self) -> &'static [&'static str] {
        &["A", "X", "Y", "P", "S", "PC"]
    }

    /// Returns the value of the named register, if it exists.
    pub fn get_register(&self, name: &str) -> Option<u32> {
        match name {
            "A" => Some(u32::from(self.reg_a)),
            "X" => Some(u32::from(self.reg_x)),
            "Y" => Some(u32::from(self.reg_y)),
            "P" => Some(u32::from(self.reg_p)),
            "S" => Some(u32::from(self.reg_s)),
            "PC" => Some(u32::from(self.pc)),
            _ => None,
        }
    }

    /// Sets the value of the named register.  Returns false if there is no
    /// such register.
    pub fn set_register(&mut self, name: &str, value: u32) -> bool {
        match name {
            "A" => self.reg_a = (value & 0xff) as u8,
            "X" => self.reg_x = (value & 0xff) as u8,
            "Y" => self.reg_y = (value & 0xff) as u8,
            "P" => self.reg_p = (value & u32::from(REG_P_MASK)) as u8,
            "S" => self.reg_s = (value & 0xff) as u8,
            "PC" => self.pc = (value & 0xffff) as u16,
            _ => return false,
        };
        true
    }

    /// Returns a snapshot of the processor state.
    pub fn state(&self) -> CpuState {
        let mut flags = CpuFlags::from_bits(self.reg_p);
        flags.b = self.break_flag;
        CpuState {
            registers: CpuRegisters {
                pc: self.pc,
                a: self.reg_a,
                x: self.reg_x,
                y: self.reg_y,
                s: self.reg_s,
            },
            flags,
            info: CpuInfo {
                irq: self.irq_line,
                nmi: self.nmi_line,
                opcode: self.opcode,
                cycles: self.cycles,
                call_stack: self.call_stack.clone(),
                ..CpuInfo::default()
            },
        }
    }

    /// Advances this processor by one instruction, or services a pending
    /// interrupt.
    pub fn step(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.return_reached = false;
        let result = if self.nmi_pending {
            self.nmi_pending = false;
            self.interrupt(bus, NMI_VECTOR);
            Ok(())
        } else if self.irq_line && !self.get_flag(PROC_FLAG_I) {
            self.interrupt(bus, IRQ_VECTOR);
            Ok(())
        } else {
            self.execute(bus)
        };
        self.opcode = bus.peek_byte(self.pc);
        result
    }

    fn execute(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        let opcode = bus.read_byte(self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.cycles += u64::from(CYCLES[opcode as usize]);
        if opcode == OPCODE_JSR && self.call_stack.len() < CALL_STACK_CAPACITY
        {
            // PC is past the opcode; the JSR operand is two more bytes.
            self.call_stack.push(self.pc.wrapping_add(2));
        }
        let result = self.dispatch(bus, opcode);
        if opcode == OPCODE_RTS {
            self.call_stack.pop();
        }
        result
    }

    fn interrupt(&mut self, bus: &mut dyn SimBus, vector: u16) {
        self.push_word(bus, self.pc);
        self.push_byte(bus, (self.reg_p | PROC_FLAG_U) & !PROC_FLAG_B);
        self.reg_p |= PROC_FLAG_I;
        self.pc = self.read_vector(bus, vector);
        self.cycles += 7;
    }

    fn op_sbc(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs = self.read_mode_data(bus, mode)?;
        self.subtract_from(rhs);
        Ok(())
    }

    fn op_adc(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs = self.read_mode_data(bus, mode)?;
        self.add_to(rhs);
        Ok(())
    }

    fn op_and(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        self.reg_a &= rhs;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_asl(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let lhs: u8 = bus.read_byte(addr);
        let result: u8 = self.shift_left(lhs, false);
        bus.write_byte(addr, result);
        Ok(())
    }

    fn op_asl_a(&mut self) -> Result<(), SimBreak> {
        self.reg_a = self.shift_left(self.reg_a, false);
        Ok(())
    }

    fn op_bcc(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.branch_if(bus, !self.get_flag(PROC_FLAG_C))
    }

    fn op_bcs(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.branch_if(bus, self.get_flag(PROC_FLAG_C))
    }

    fn op_beq(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.branch_if(bus, self.get_flag(PROC_FLAG_Z))
    }

    fn op_bmi(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.branch_if(bus, self.get_flag(PROC_FLAG_N))
    }

    fn op_bne(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.branch_if(bus, !self.get_flag(PROC_FLAG_Z))
    }

    fn op_bpl(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.branch_if(bus, !self.get_flag(PROC_FLAG_N))
    }

    fn op_brk(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.read_immediate_byte(bus); // the 6502 reads and ignores this byte
        self.push_word(bus, self.pc);
        // Bits that don't actually exist in the P register are set to 1 on the
        // stack by the BRK instruction.
        self.push_byte(bus, self.reg_p | !REG_P_MASK);
        self.reg_p |= PROC_FLAG_I;
        self.break_flag = true;
        self.pc = self.read_vector(bus, IRQ_VECTOR);
        Err(SimBreak::Break)
    }

    fn op_bvc(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.branch_if(bus, !self.get_flag(PROC_FLAG_V))
    }

    fn op_bvs(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.branch_if(bus, self.get_flag(PROC_FLAG_V))
    }

    fn op_bit(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let data: u8 = self.read_mode_data(bus, mode)?;
        self.reg_p &= !(PROC_FLAG_N | PROC_FLAG_V | PROC_FLAG_Z);
        self.reg_p |= data & (PROC_FLAG_N | PROC_FLAG_V);
        if data & self.reg_a == 0 {
            self.reg_p |= PROC_FLAG_Z;
        }
        Ok(())
    }

    fn op_clc(&mut self) -> Result<(), SimBreak> {
        self.reg_p &= !PROC_FLAG_C;
        Ok(())
    }

    fn op_cld(&mut self) -> Result<(), SimBreak> {
        self.reg_p &= !PROC_FLAG_D;
        Ok(())
    }

    fn op_cli(&mut self) -> Result<(), SimBreak> {
        self.reg_p &= !PROC_FLAG_I;
        Ok(())
    }

    fn op_clv(&mut self) -> Result<(), SimBreak> {
        self.reg_p &= !PROC_FLAG_V;
        Ok(())
    }

    fn op_cmp(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.compare_to(bus, self.reg_a, mode)
    }

    fn op_cpx(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.compare_to(bus, self.reg_x, mode)
    }

    fn op_cpy(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.compare_to(bus, self.reg_y, mode)
    }

    fn op_dec(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let data: u8 = bus.read_byte(addr).wrapping_sub(1);
        self.set_nz_flags(data);
        bus.write_byte(addr, data);
        Ok(())
    }

    fn op_dex(&mut self) -> Result<(), SimBreak> {
        self.reg_x = self.reg_x.wrapping_sub(1);
        self.set_nz_flags(self.reg_x);
        Ok(())
    }

    fn op_dey(&mut self) -> Result<(), SimBreak> {
        self.reg_y = self.reg_y.wrapping_sub(1);
        self.set_nz_flags(self.reg_y);
        Ok(())
    }

    fn op_eor(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        self.reg_a ^= rhs;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_inc(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let data: u8 = bus.read_byte(addr).wrapping_add(1);
        self.set_nz_flags(data);
        bus.write_byte(addr, data);
        Ok(())
    }

    fn op_inx(&mut self) -> Result<(), SimBreak> {
        self.reg_x = self.reg_x.wrapping_add(1);
        self.set_nz_flags(self.reg_x);
        Ok(())
    }

    fn op_iny(&mut self) -> Result<(), SimBreak> {
        self.reg_y = self.reg_y.wrapping_add(1);
        self.set_nz_flags(self.reg_y);
        Ok(())
    }

    fn op_jmp(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.pc = self.read_mode_addr(bus, mode)?;
        Ok(())
    }

    fn op_jsr(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let dest: u16 = self.read_mode_addr(bus, mode)?;
        let ret: u16 = self.pc.wrapping_sub(1);
        self.push_word(bus, ret);
        self.pc = dest;
        Ok(())
    }

    fn op_lda(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.reg_a = self.read_mode_data(bus, mode)?;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_ldx(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.reg_x = self.read_mode_data(bus, mode)?;
        self.set_nz_flags(self.reg_x);
        Ok(())
    }

    fn op_ldy(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.reg_y = self.read_mode_data(bus, mode)?;
        self.set_nz_flags(self.reg_y);
        Ok(())
    }

    fn op_lsr(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let lhs: u8 = bus.read_byte(addr);
        let result: u8 = self.shift_right(lhs, false);
        bus.write_byte(addr, result);
        Ok(())
    }

    fn op_lsr_a(&mut self) -> Result<(), SimBreak> {
        self.reg_a = self.shift_right(self.reg_a, false);
        Ok(())
    }

    fn op_nop(&mut self) -> Result<(), SimBreak> {
        Ok(())
    }

    fn op_ora(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        self.reg_a |= rhs;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_pla(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.reg_a = self.pull_byte(bus);
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_plp(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.reg_p = self.pull_byte(bus) & REG_P_MASK;
        Ok(())
    }

    fn op_pha(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.push_byte(bus, self.reg_a);
        Ok(())
    }

    fn op_php(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        // Bits that don't actually exist in the P register are set to 1 on the
        // stack by the PHP instruction.
        self.push_byte(bus, self.reg_p | !REG_P_MASK);
        Ok(())
    }

    fn op_rol(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let lhs: u8 = bus.read_byte(addr);
        let carry_in = self.get_flag(PROC_FLAG_C);
        let result: u8 = self.shift_left(lhs, carry_in);
        bus.write_byte(addr, result);
        Ok(())
    }

    fn op_rol_a(&mut self) -> Result<(), SimBreak> {
        let carry_in = self.get_flag(PROC_FLAG_C);
        self.reg_a = self.shift_left(self.reg_a, carry_in);
        Ok(())
    }

    fn op_ror(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let lhs: u8 = bus.read_byte(addr);
        let carry_in = self.get_flag(PROC_FLAG_C);
        let result: u8 = self.shift_right(lhs, carry_in);
        bus.write_byte(addr, result);
        Ok(())
    }

    fn op_ror_a(&mut self) -> Result<(), SimBreak> {
        let carry_in = self.get_flag(PROC_FLAG_C);
        self.reg_a = self.shift_right(self.reg_a, carry_in);
        Ok(())
    }

    fn op_rti(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        self.reg_p = self.pull_byte(bus) & REG_P_MASK;
        self.pc = self.pull_word(bus);
        self.break_flag = false;
        Ok(())
    }

    fn op_rts(&mut self, bus: &mut dyn SimBus) -> Result<(), SimBreak> {
        if self.reg_s == 0xff {
            self.return_reached = true;
        }
        let addr: u16 = self.pull_word(bus);
        self.pc = addr.wrapping_add(1);
        Ok(())
    }

    fn op_sec(&mut self) -> Result<(), SimBreak> {
        self.reg_p |= PROC_FLAG_C;
        Ok(())
    }

    fn op_sed(&mut self) -> Result<(), SimBreak> {
        self.reg_p |= PROC_FLAG_D;
        Ok(())
    }

    fn op_sei(&mut self) -> Result<(), SimBreak> {
        self.reg_p |= PROC_FLAG_I;
        Ok(())
    }

    fn op_sta(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        bus.write_byte(addr, self.reg_a);
        Ok(())
    }

    fn op_stx(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        bus.write_byte(addr, self.reg_x);
        Ok(())
    }

    fn op_sty(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        bus.write_byte(addr, self.reg_y);
        Ok(())
    }

    fn op_tax(&mut self) -> Result<(), SimBreak> {
        self.reg_x = self.reg_a;
        self.set_nz_flags(self.reg_x);
        Ok(())
    }

    fn op_tay(&mut self) -> Result<(), SimBreak> {
        self.reg_y = self.reg_a;
        self.set_nz_flags(self.reg_y);
        Ok(())
    }

    fn op_tsx(&mut self) -> Result<(), SimBreak> {
        self.reg_x = self.reg_s;
        self.set_nz_flags(self.reg_x);
        Ok(())
    }

    fn op_txa(&mut self) -> Result<(), SimBreak> {
        self.reg_a = self.reg_x;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_txs(&mut self) -> Result<(), SimBreak> {
        self.reg_s = self.reg_x;
        Ok(()) // TXS does not update processor flags
    }

    fn op_tya(&mut self) -> Result<(), SimBreak> {
        self.reg_a = self.reg_y;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_undocumented_alr(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        self.reg_a = self.shift_right(self.reg_a & rhs, false);
        Ok(())
    }

    fn op_undocumented_anc(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        self.reg_a &= rhs;
        self.set_nz_flags(self.reg_a);
        self.set_flag(PROC_FLAG_C, (self.reg_a & 0x80) != 0);
        Ok(())
    }

    fn op_undocumented_ane(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        self.reg_a = (self.reg_a | UNSTABLE_MAGIC) & self.reg_x & rhs;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_undocumented_arr(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        let carry_in: u8 = if self.get_flag(PROC_FLAG_C) { 0x80 } else { 0 };
        self.reg_a = ((self.reg_a & rhs) >> 1) | carry_in;
        self.set_nz_flags(self.reg_a);
        // ARR takes C from bit 6 of the result, and V from bit 6 XOR bit 5.
        let bit6 = (self.reg_a & 0x40) != 0;
        let bit5 = (self.reg_a & 0x20) != 0;
        self.set_flag(PROC_FLAG_C, bit6);
        self.set_flag(PROC_FLAG_V, bit6 != bit5);
        Ok(())
    }

    fn op_undocumented_dcp(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let data: u8 = bus.read_byte(addr).wrapping_sub(1);
        bus.write_byte(addr, data);
        self.set_flag(PROC_FLAG_C, self.reg_a >= data);
        self.set_nz_flags(self.reg_a.wrapping_sub(data));
        Ok(())
    }

    fn op_undocumented_isc(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let data: u8 = bus.read_byte(addr).wrapping_add(1);
        bus.write_byte(addr, data);
        self.subtract_from(data);
        Ok(())
    }

    fn op_undocumented_jam(&mut self, opcode: u8) -> Result<(), SimBreak> {
        self.pc = self.pc.wrapping_sub(1); // keep PC at JAM instruction
        Err(SimBreak::HaltOpcode("JAM", opcode))
    }

    fn op_undocumented_las(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let data: u8 = self.read_mode_data(bus, mode)? & self.reg_s;
        self.reg_a = data;
        self.reg_x = data;
        self.reg_s = data;
        self.set_nz_flags(data);
        Ok(())
    }

    fn op_undocumented_lax(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.reg_a = self.read_mode_data(bus, mode)?;
        self.reg_x = self.reg_a;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_undocumented_lxa(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        self.reg_a = (self.reg_a | UNSTABLE_MAGIC) & rhs;
        self.reg_x = self.reg_a;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_undocumented_nop(
        &mut self,
        bus: &mut dyn SimBus,
        opt_mode: Option<AddrMode>,
    ) -> Result<(), SimBreak> {
        if let Some(mode) = opt_mode {
            self.read_mode_data(bus, mode)?; // ignore the result
        }
        Ok(())
    }

    fn op_undocumented_rla(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let lhs: u8 = bus.read_byte(addr);
        let carry_in = self.get_flag(PROC_FLAG_C);
        let result: u8 = self.shift_left(lhs, carry_in);
        bus.write_byte(addr, result);
        self.reg_a &= result;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_undocumented_rra(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let lhs: u8 = bus.read_byte(addr);
        let carry_in = self.get_flag(PROC_FLAG_C);
        let result: u8 = self.shift_right(lhs, carry_in);
        bus.write_byte(addr, result);
        self.add_to(result);
        Ok(())
    }

    fn op_undocumented_sax(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        bus.write_byte(addr, self.reg_a & self.reg_x);
        Ok(())
    }

    fn op_undocumented_sbc(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.op_sbc(bus, mode)
    }

    fn op_undocumented_sbx(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        let lhs: u8 = self.reg_a & self.reg_x;
        self.reg_x = lhs.wrapping_sub(rhs);
        self.set_flag(PROC_FLAG_C, lhs >= rhs);
        self.set_nz_flags(self.reg_x);
        Ok(())
    }

    /// Shared by SHA, SHX, SHY and TAS, which store a register value ANDed
    /// with the high byte of the target address plus one.
    fn store_and_high(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
        value: u8,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let high: u8 = ((addr >> 8) as u8).wrapping_add(1);
        bus.write_byte(addr, value & high);
        Ok(())
    }

    fn op_undocumented_sha(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.store_and_high(bus, mode, self.reg_a & self.reg_x)
    }

    fn op_undocumented_shx(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.store_and_high(bus, mode, self.reg_x)
    }

    fn op_undocumented_shy(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.store_and_high(bus, mode, self.reg_y)
    }

    fn op_undocumented_slo(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let lhs: u8 = bus.read_byte(addr);
        let result: u8 = self.shift_left(lhs, false);
        bus.write_byte(addr, result);
        self.reg_a |= result;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_undocumented_sre(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let addr: u16 = self.read_mode_addr(bus, mode)?;
        let lhs: u8 = bus.read_byte(addr);
        let result: u8 = self.shift_right(lhs, false);
        bus.write_byte(addr, result);
        self.reg_a ^= result;
        self.set_nz_flags(self.reg_a);
        Ok(())
    }

    fn op_undocumented_tas(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        self.reg_s = self.reg_a & self.reg_x;
        self.store_and_high(bus, mode, self.reg_s)
    }

    fn add_to(&mut self, rhs: u8) {
        let lhs: u8 = self.reg_a;
        let carry: u16 = if self.get_flag(PROC_FLAG_C) { 1 } else { 0 };
        let binary: u16 = (lhs as u16) + (rhs as u16) + carry;
        if self.get_flag(PROC_FLAG_D) {
            // NMOS decimal mode: Z comes from the binary sum, while N and V
            // come from the high nibble before it is corrected.
            let mut lo: u16 = ((lhs & 0x0f) as u16) + ((rhs & 0x0f) as u16) + carry;
            if lo > 0x09 {
                lo += 0x06;
            }
            let mut hi: u16 =
                ((lhs >> 4) as u16) + ((rhs >> 4) as u16) + (lo > 0x0f) as u16;
            self.set_flag(PROC_FLAG_Z, (binary & 0xff) == 0);
            self.set_flag(PROC_FLAG_N, (hi & 0x08) != 0);
            let uncorrected = (hi << 4) as u8;
            self.set_flag(
                PROC_FLAG_V,
                (!(lhs ^ rhs) & (lhs ^ uncorrected) & 0x80) != 0,
            );
            if hi > 0x09 {
                hi += 0x06;
            }
            self.set_flag(PROC_FLAG_C, hi > 0x0f);
            self.reg_a = (((hi << 4) | (lo & 0x0f)) & 0xff) as u8;
        } else {
            let sum: u8 = (binary & 0xff) as u8;
            self.set_flag(PROC_FLAG_C, binary >= 0x100);
            self.set_flag(PROC_FLAG_V, ((lhs ^ sum) & (rhs ^ sum) & 0x80) != 0);
            self.reg_a = sum;
            self.set_nz_flags(self.reg_a);
        }
    }

    fn subtract_from(&mut self, rhs: u8) {
        if !self.get_flag(PROC_FLAG_D) {
            self.add_to(!rhs);
            return;
        }
        // NMOS decimal mode: all flags are set exactly as in binary mode;
        // only the accumulator gets the nibble-wise correction.
        let lhs: u8 = self.reg_a;
        let borrow: i16 = if self.get_flag(PROC_FLAG_C) { 0 } else { 1 };
        let binary: i16 = (lhs as i16) - (rhs as i16) - borrow;
        let mut lo: i16 = ((lhs & 0x0f) as i16) - ((rhs & 0x0f) as i16) - borrow;
        if lo < 0 {
            lo -= 0x06;
        }
        let mut hi: i16 =
            ((lhs >> 4) as i16) - ((rhs >> 4) as i16) - (lo < 0) as i16;
        if hi < 0 {
            hi -= 0x06;
        }
        let result = (binary & 0xff) as u8;
        self.set_flag(PROC_FLAG_C, binary >= 0);
        self.set_flag(PROC_FLAG_V, ((lhs ^ rhs) & (lhs ^ result) & 0x80) != 0);
        self.set_nz_flags(result);
        self.reg_a = (((hi << 4) | (lo & 0x0f)) & 0xff) as u8;
    }

    fn branch_if(
        &mut self,
        bus: &mut dyn SimBus,
        condition: bool,
    ) -> Result<(), SimBreak> {
        let offset: i8 = self.read_immediate_byte(bus) as i8;
        if condition {
            let dest = self.pc.wrapping_add(offset as u16);
            self.cycles += if (dest & 0xff00) != (self.pc & 0xff00) {
                2
            } else {
                1
            };
            self.pc = dest;
        }
        Ok(())
    }

    fn compare_to(
        &mut self,
        bus: &mut dyn SimBus,
        lhs: u8,
        mode: AddrMode,
    ) -> Result<(), SimBreak> {
        let rhs: u8 = self.read_mode_data(bus, mode)?;
        self.set_flag(PROC_FLAG_C, lhs >= rhs);
        self.set_nz_flags(lhs.wrapping_sub(rhs));
        Ok(())
    }

    fn pull_byte(&mut self, bus: &mut dyn SimBus) -> u8 {
        self.reg_s = self.reg_s.wrapping_add(1);
        bus.read_byte(0x0100 | (self.reg_s as u16))
    }

    fn pull_word(&mut self, bus: &mut dyn SimBus) -> u16 {
        let lo: u8 = self.pull_byte(bus);
        let hi: u8 = self.pull_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn push_byte(&mut self, bus: &mut dyn SimBus, data: u8) {
        bus.write_byte(0x0100 | (self.reg_s as u16), data);
        self.reg_s = self.reg_s.wrapping_sub(1);
    }

    fn push_word(&mut self, bus: &mut dyn SimBus, data: u16) {
        let [lo, hi] = data.to_le_bytes();
        self.push_byte(bus, hi);
        self.push_byte(bus, lo);
    }

    fn shift_left(&mut self, lhs: u8, carry_in: bool) -> u8 {
        self.set_flag(PROC_FLAG_C, (lhs & 0x80) != 0);
        let mut result: u8 = lhs << 1;
        if carry_in {
            result |= 0x01;
        }
        self.set_nz_flags(result);
        result
    }

    fn shift_right(&mut self, lhs: u8, carry_in: bool) -> u8 {
        self.set_flag(PROC_FLAG_C, (lhs & 0x01) != 0);
        let mut result: u8 = lhs >> 1;
        if carry_in {
            result |= 0x80;
        }
        self.set_nz_flags(result);
        result
    }

    fn read_vector(&mut self, bus: &mut dyn SimBus, vector: u16) -> u16 {
        let lo = bus.read_byte(vector);
        let hi = bus.read_byte(vector.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn read_immediate_byte(&mut self, bus: &mut dyn SimBus) -> u8 {
        let value = bus.read_byte(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn read_immediate_word(&mut self, bus: &mut dyn SimBus) -> u16 {
        let lo = self.read_immediate_byte(bus);
        let hi = self.read_immediate_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn read_zeropage_word(&mut self, bus: &mut dyn SimBus, addr: u8) -> u16 {
        let lo = bus.read_byte(addr as u16);
        let hi = bus.read_byte(addr.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }

    fn index_absolute(&mut self, base: u16, index: u8) -> u16 {
        let addr = base.wrapping_add(index as u16);
        self.page_crossed = (addr & 0xff00) != (base & 0xff00);
        addr
    }

    fn read_mode_addr(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<u16, SimBreak> {
        self.page_crossed = false;
        match mode {
            AddrMode::Immediate => {
                let addr: u16 = self.pc;
                self.pc = self.pc.wrapping_add(1);
                Ok(addr)
            }
            AddrMode::Absolute => Ok(self.read_immediate_word(bus)),
            AddrMode::AbsoluteIndirect => {
                let lo_ptr: u16 = self.read_immediate_word(bus);
                // The 6502 doesn't perform the carry when adding 1 to the base
                // address to read the hi byte of the pointer.  Therefore, for
                // example, JMP ($xxFF) will read the destination address from
                // $xxFF and $xx00.
                let hi_ptr: u16 =
                    (lo_ptr & 0xff00) | (lo_ptr.wrapping_add(1) & 0x00ff);
                let lo = bus.read_byte(lo_ptr);
                let hi = bus.read_byte(hi_ptr);
                Ok(u16::from_le_bytes([lo, hi]))
            }
            AddrMode::XIndexedAbsolute => {
                let base: u16 = self.read_immediate_word(bus);
                // The value at the base address, ignoring the index offset, is
                // read and discarded before the final address is read. This
                // may cause side effects in hardware registers.
                bus.read_byte(base);
                Ok(self.index_absolute(base, self.reg_x))
            }
            AddrMode::YIndexedAbsolute => {
                let base: u16 = self.read_immediate_word(bus);
                bus.read_byte(base);
                Ok(self.index_absolute(base, self.reg_y))
            }
            AddrMode::ZeroPage => Ok(self.read_immediate_byte(bus) as u16),
            AddrMode::XIndexedZeroPage => {
                let base: u8 = self.read_immediate_byte(bus);
                Ok(base.wrapping_add(self.reg_x) as u16)
            }
            AddrMode::YIndexedZeroPage => {
                let base: u8 = self.read_immediate_byte(bus);
                Ok(base.wrapping_add(self.reg_y) as u16)
            }
            AddrMode::XIndexedZeroPageIndirect => {
                let base: u8 = self.read_immediate_byte(bus);
                let ptr: u8 = base.wrapping_add(self.reg_x);
                Ok(self.read_zeropage_word(bus, ptr))
            }
            AddrMode::ZeroPageIndirectYIndexed => {
                let ptr: u8 = self.read_immediate_byte(bus);
                let base: u16 = self.read_zeropage_word(bus, ptr);
                Ok(self.index_absolute(base, self.reg_y))
            }
        }
    }

    /// Like `read_mode_addr`, but also reads the operand, charging the extra
    /// cycle that read instructions take when indexing crosses a page.
    fn read_mode_data(
        &mut self,
        bus: &mut dyn SimBus,
        mode: AddrMode,
    ) -> Result<u8, SimBreak> {
        let addr = self.read_mode_addr(bus, mode)?;
        if self.page_crossed {
            self.cycles += 1;
        }
        Ok(bus.read_byte(addr))
    }

    fn get_flag(&self, flag: u8) -> bool {
        (self.reg_p & flag) != 0
    }

    fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.reg_p |= flag;
        } else {
            self.reg_p &= !flag;
        }
    }

    fn set_nz_flags(&mut self, value: u8) {
        self.reg_p &= !(PROC_FLAG_N | PROC_FLAG_Z);
        if value == 0 {
            self.reg_p |= PROC_FLAG_Z;
        }
        if value >= 0x80 {
            self.reg_p |= PROC_FLAG_N;
        }
    }

    fn dispatch(
        &mut self,
        bus: &mut dyn SimBus,
        opcode: u8,
    ) -> Result<(), SimBreak> {
        use AddrMode::*;
        match opcode {
            0x00 => self.op_brk(bus),
            0x01 => self.op_ora(bus, XIndexedZeroPageIndirect),
            0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92
            | 0xb2 | 0xd2 | 0xf2 => self.op_undocumented_jam(opcode),
            0x03 => self.op_undocumented_slo(bus, XIndexedZeroPageIndirect),
            0x04 | 0x44 | 0x64 => self.op_undocumented_nop(bus, Some(ZeroPage)),
            0x05 => self.op_ora(bus, ZeroPage),
            0x06 => self.op_asl(bus, ZeroPage),
            0x07 => self.op_undocumented_slo(bus, ZeroPage),
            0x08 => self.op_php(bus),
            0x09 => self.op_ora(bus, Immediate),
            0x0a => self.op_asl_a(),
            0x0b | 0x2b => self.op_undocumented_anc(bus, Immediate),
            0x0c => self.op_undocumented_nop(bus, Some(Absolute)),
            0x0d => self.op_ora(bus, Absolute),
            0x0e => self.op_asl(bus, Absolute),
            0x0f => self.op_undocumented_slo(bus, Absolute),
            0x10 => self.op_bpl(bus),
            0x11 => self.op_ora(bus, ZeroPageIndirectYIndexed),
            0x13 => self.op_undocumented_slo(bus, ZeroPageIndirectYIndexed),
            0x14 | 0x34 | 0x54 | 0x74 | 0xd4 | 0xf4 => {
                self.op_undocumented_nop(bus, Some(XIndexedZeroPage))
            }
            0x15 => self.op_ora(bus, XIndexedZeroPage),
            0x16 => self.op_asl(bus, XIndexedZeroPage),
            0x17 => self.op_undocumented_slo(bus, XIndexedZeroPage),
            0x18 => self.op_clc(),
            0x19 => self.op_ora(bus, YIndexedAbsolute),
            0x1a | 0x3a | 0x5a | 0x7a | 0xda | 0xfa => {
                self.op_undocumented_nop(bus, None)
            }
            0x1b => self.op_undocumented_slo(bus, YIndexedAbsolute),
            0x1c | 0x3c | 0x5c | 0x7c | 0xdc | 0xfc => {
                self.op_undocumented_nop(bus, Some(XIndexedAbsolute))
            }
            0x1d => self.op_ora(bus, XIndexedAbsolute),
            0x1e => self.op_asl(bus, XIndexedAbsolute),
            0x1f => self.op_undocumented_slo(bus, XIndexedAbsolute),
            0x20 => self.op_jsr(bus, Absolute),
            0x21 => self.op_and(bus, XIndexedZeroPageIndirect),
            0x23 => self.op_undocumented_rla(bus, XIndexedZeroPageIndirect),
            0x24 => self.op_bit(bus, ZeroPage),
            0x25 => self.op_and(bus, ZeroPage),
            0x26 => self.op_rol(bus, ZeroPage),
            0x27 => self.op_undocumented_rla(bus, ZeroPage),
            0x28 => self.op_plp(bus),
            0x29 => self.op_and(bus, Immediate),
            0x2a => self.op_rol_a(),
            0x2c => self.op_bit(bus, Absolute),
            0x2d => self.op_and(bus, Absolute),
            0x2e => self.op_rol(bus, Absolute),
            0x2f => self.op_undocumented_rla(bus, Absolute),
            0x30 => self.op_bmi(bus),
            0x31 => self.op_and(bus, ZeroPageIndirectYIndexed),
            0x33 => self.op_undocumented_rla(bus, ZeroPageIndirectYIndexed),
            0x35 => self.op_and(bus, XIndexedZeroPage),
            0x36 => self.op_rol(bus, XIndexedZeroPage),
            0x37 => self.op_undocumented_rla(bus, XIndexedZeroPage),
            0x38 => self.op_sec(),
            0x39 => self.op_and(bus, YIndexedAbsolute),
            0x3b => self.op_undocumented_rla(bus, YIndexedAbsolute),
            0x3d => self.op_and(bus, XIndexedAbsolute),
            0x3e => self.op_rol(bus, XIndexedAbsolute),
            0x3f => self.op_undocumented_rla(bus, XIndexedAbsolute),
            0x40 => self.op_rti(bus),
            0x41 => self.op_eor(bus, XIndexedZeroPageIndirect),
            0x43 => self.op_undocumented_sre(bus, XIndexedZeroPageIndirect),
            0x45 => self.op_eor(bus, ZeroPage),
            0x46 => self.op_lsr(bus, ZeroPage),
            0x47 => self.op_undocumented_sre(bus, ZeroPage),
            0x48 => self.op_pha(bus),
            0x49 => self.op_eor(bus, Immediate),
            0x4a => self.op_lsr_a(),
            0x4b => self.op_undocumented_alr(bus, Immediate),
            0x4c => self.op_jmp(bus, Absolute),
            0x4d => self.op_eor(bus, Absolute),
            0x4e => self.op_lsr(bus, Absolute),
            0x4f => self.op_undocumented_sre(bus, Absolute),
            0x50 => self.op_bvc(bus),
            0x51 => self.op_eor(bus, ZeroPageIndirectYIndexed),
            0x53 => self.op_undocumented_sre(bus, ZeroPageIndirectYIndexed),
            0x55 => self.op_eor(bus, XIndexedZeroPage),
            0x56 => self.op_lsr(bus, XIndexedZeroPage),
            0x57 => self.op_undocumented_sre(bus, XIndexedZeroPage),
            0x58 => self.op_cli(),
            0x59 => self.op_eor(bus, YIndexedAbsolute),
            0x5b => self.op_undocumented_sre(bus, YIndexedAbsolute),
            0x5d => self.op_eor(bus, XIndexedAbsolute),
            0x5e => self.op_lsr(bus, XIndexedAbsolute),
            0x5f => self.op_undocumented_sre(bus, XIndexedAbsolute),
            0x60 => self.op_rts(bus),
            0x61 => self.op_adc(bus, XIndexedZeroPageIndirect),
            0x63 => self.op_undocumented_rra(bus, XIndexedZeroPageIndirect),
            0x65 => self.op_adc(bus, ZeroPage),
            0x66 => self.op_ror(bus, ZeroPage),
            0x67 => self.op_undocumented_rra(bus, ZeroPage),
            0x68 => self.op_pla(bus),
            0x69 => self.op_adc(bus, Immediate),
            0x6a => self.op_ror_a(),
            0x6b => self.op_undocumented_arr(bus, Immediate),
            0x6c => self.op_jmp(bus, AbsoluteIndirect),
            0x6d => self.op_adc(bus, Absolute),
            0x6e => self.op_ror(bus, Absolute),
            0x6f => self.op_undocumented_rra(bus, Absolute),
            0x70 => self.op_bvs(bus),
            0x71 => self.op_adc(bus, ZeroPageIndirectYIndexed),
            0x73 => self.op_undocumented_rra(bus, ZeroPageIndirectYIndexed),
            0x75 => self.op_adc(bus, XIndexedZeroPage),
            0x76 => self.op_ror(bus, XIndexedZeroPage),
            0x77 => self.op_undocumented_rra(bus, XIndexedZeroPage),
            0x78 => self.op_sei(),
            0x79 => self.op_adc(bus, YIndexedAbsolute),
            0x7b => self.op_undocumented_rra(bus, YIndexedAbsolute),
            0x7d => self.op_adc(bus, XIndexedAbsolute),
            0x7e => self.op_ror(bus, XIndexedAbsolute),
            0x7f => self.op_undocumented_rra(bus, XIndexedAbsolute),
            0x80 | 0x82 | 0x89 | 0xc2 | 0xe2 => {
                self.op_undocumented_nop(bus, Some(Immediate))
            }
            0x81 => self.op_sta(bus, XIndexedZeroPageIndirect),
            0x83 => self.op_undocumented_sax(bus, XIndexedZeroPageIndirect),
            0x84 => self.op_sty(bus, ZeroPage),
            0x85 => self.op_sta(bus, ZeroPage),
            0x86 => self.op_stx(bus, ZeroPage),
            0x87 => self.op_undocumented_sax(bus, ZeroPage),
            0x88 => self.op_dey(),
            0x8a => self.op_txa(),
            0x8b => self.op_undocumented_ane(bus, Immediate),
            0x8c => self.op_sty(bus, Absolute),
            0x8d => self.op_sta(bus, Absolute),
            0x8e => self.op_stx(bus, Absolute),
            0x8f => self.op_undocumented_sax(bus, Absolute),
            0x90 => self.op_bcc(bus),
            0x91 => self.op_sta(bus, ZeroPageIndirectYIndexed),
            0x93 => self.op_undocumented_sha(bus, ZeroPageIndirectYIndexed),
            0x94 => self.op_sty(bus, XIndexedZeroPage),
            0x95 => self.op_sta(bus, XIndexedZeroPage),
            0x96 => self.op_stx(bus, YIndexedZeroPage),
            0x97 => self.op_undocumented_sax(bus, YIndexedZeroPage),
            0x98 => self.op_tya(),
            0x99 => self.op_sta(bus, YIndexedAbsolute),
            0x9a => self.op_txs(),
            0x9b => self.op_undocumented_tas(bus, YIndexedAbsolute),
            0x9c => self.op_undocumented_shy(bus, XIndexedAbsolute),
            0x9d => self.op_sta(bus, XIndexedAbsolute),
            0x9e => self.op_undocumented_shx(bus, YIndexedAbsolute),
            0x9f => self.op_undocumented_sha(bus, YIndexedAbsolute),
            0xa0 => self.op_ldy(bus, Immediate),
            0xa1 => self.op_lda(bus, XIndexedZeroPageIndirect),
            0xa2 => self.op_ldx(bus, Immediate),
            0xa3 => self.op_undocumented_lax(bus, XIndexedZeroPageIndirect),
            0xa4 => self.op_ldy(bus, ZeroPage),
            0xa5 => self.op_lda(bus, ZeroPage),
            0xa6 => self.op_ldx(bus, ZeroPage),
            0xa7 => self.op_undocumented_lax(bus, ZeroPage),
            0xa8 => self.op_tay(),
            0xa9 => self.op_lda(bus, Immediate),
            0xaa => self.op_tax(),
            0xab => self.op_undocumented_lxa(bus, Immediate),
            0xac => self.op_ldy(bus, Absolute),
            0xad => self.op_lda(bus, Absolute),
            0xae => self.op_ldx(bus, Absolute),
            0xaf => self.op_undocumented_lax(bus, Absolute),
            0xb0 => self.op_bcs(bus),
            0xb1 => self.op_lda(bus, ZeroPageIndirectYIndexed),
            0xb3 => self.op_undocumented_lax(bus, ZeroPageIndirectYIndexed),
            0xb4 => self.op_ldy(bus, XIndexedZeroPage),
            0xb5 => self.op_lda(bus, XIndexedZeroPage),
            0xb6 => self.op_ldx(bus, YIndexedZeroPage),
            0xb7 => self.op_undocumented_lax(bus, YIndexedZeroPage),
            0xb8 => self.op_clv(),
            0xb9 => self.op_lda(bus, YIndexedAbsolute),
            0xba => self.op_tsx(),
            0xbb => self.op_undocumented_las(bus, YIndexedAbsolute),
            0xbc => self.op_ldy(bus, XIndexedAbsolute),
            0xbd => self.op_lda(bus, XIndexedAbsolute),
            0xbe => self.op_ldx(bus, YIndexedAbsolute),
            0xbf => self.op_undocumented_lax(bus, YIndexedAbsolute),
            0xc0 => self.op_cpy(bus, Immediate),
            0xc1 => self.op_cmp(bus, XIndexedZeroPageIndirect),
            0xc3 => self.op_undocumented_dcp(bus, XIndexedZeroPageIndirect),
            0xc4 => self.op_cpy(bus, ZeroPage),
            0xc5 => self.op_cmp(bus, ZeroPage),
            0xc6 => self.op_dec(bus, ZeroPage),
            0xc7 => self.op_undocumented_dcp(bus, ZeroPage),
            0xc8 => self.op_iny(),
            0xc9 => self.op_cmp(bus, Immediate),
            0xca => self.op_dex(),
            0xcb => self.op_undocumented_sbx(bus, Immediate),
            0xcc => self.op_cpy(bus, Absolute),
            0xcd => self.op_cmp(bus, Absolute),
            0xce => self.op_dec(bus, Absolute),
            0xcf => self.op_undocumented_dcp(bus, Absolute),
            0xd0 => self.op_bne(bus),
            0xd1 => self.op_cmp(bus, ZeroPageIndirectYIndexed),
            0xd3 => self.op_undocumented_dcp(bus, ZeroPageIndirectYIndexed),
            0xd5 => self.op_cmp(bus, XIndexedZeroPage),
            0xd6 => self.op_dec(bus, XIndexedZeroPage),
            0xd7 => self.op_undocumented_dcp(bus, XIndexedZeroPage),
            0xd8 => self.op_cld(),
            0xd9 => self.op_cmp(bus, YIndexedAbsolute),
            0xdb => self.op_undocumented_dcp(bus, YIndexedAbsolute),
            0xdd => self.op_cmp(bus, XIndexedAbsolute),
            0xde => self.op_dec(bus, XIndexedAbsolute),
            0xdf => self.op_undocumented_dcp(bus, XIndexedAbsolute),
            0xe0 => self.op_cpx(bus, Immediate),
            0xe1 => self.op_sbc(bus, XIndexedZeroPageIndirect),
            0xe3 => self.op_undocumented_isc(bus, XIndexedZeroPageIndirect),
            0xe4 => self.op_cpx(bus, ZeroPage),
            0xe5 => self.op_sbc(bus, ZeroPage),
            0xe6 => self.op_inc(bus, ZeroPage),
            0xe7 => self.op_undocumented_isc(bus, ZeroPage),
            0xe8 => self.op_inx(),
            0xe9 => self.op_sbc(bus, Immediate),
            0xea => self.op_nop(),
            0xeb => self.op_undocumented_sbc(bus, Immediate),
            0xec => self.op_cpx(bus, Absolute),
            0xed => self.op_sbc(bus, Absolute),
            0xee => self.op_inc(bus, Absolute),
            0xef => self.op_undocumented_isc(bus, Absolute),
            0xf0 => self.op_beq(bus),
            0xf1 => self.op_sbc(bus, ZeroPageIndirectYIndexed),
            0xf3 => self.op_undocumented_isc(bus, ZeroPageIndirectYIndexed),
            0xf5 => self.op_sbc(bus, XIndexedZeroPage),
            0xf6 => self.op_inc(bus, XIndexedZeroPage),
            0xf7 => self.op_undocumented_isc(bus, XIndexedZeroPage),
            0xf8 => self.op_sed(),
            0xf9 => self.op_sbc(bus, YIndexedAbsolute),
            0xfb => self.op_undocumented_isc(bus, YIndexedAbsolute),
            0xfd => self.op_sbc(bus, XIndexedAbsolute),
            0xfe => self.op_inc(bus, XIndexedAbsolute),
            0xff => self.op_undocumented_isc(bus, XIndexedAbsolute),
        }
    }
}

impl Default for Mos6502 {
    fn default() -> Mos6502 {
        Mos6502::new()
    }
}

//===========================================================================//


//===========================================================================//
