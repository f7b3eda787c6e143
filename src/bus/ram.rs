use super::{SimBus, describe_size};

//===========================================================================//

/// A flat 64kB RAM bus with no memory-mapped hardware.
pub struct Ram64k {
    ram: Box<[u8; 0x10000]>,
}

impl Ram64k {
    /// Returns a new simulated RAM bus with all bytes zeroed.
    pub fn new() -> Ram64k {
        Ram64k { ram: Box::new([0u8; 0x10000]) }
    }

    /// Returns a new simulated RAM bus using the given byte array as the
    /// contents of RAM.
    pub fn with_contents(ram: Box<[u8; 0x10000]>) -> Ram64k {
        Ram64k { ram }
    }
}

impl Default for Ram64k {
    fn default() -> Ram64k {
        Ram64k::new()
    }
}

impl SimBus for Ram64k {
    fn description(&self) -> String {
        describe_size(self.ram.len(), "RAM")
    }

    fn peek_byte(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn read_byte(&mut self, addr: u16) -> u8 {
        self.peek_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, data: u8) {
        self.ram[addr as usize] = data;
    }

    fn power_on(&mut self, start: Option<u16>) {
        self.ram.fill(0);
        if let Some(start) = start {
            let [lo, hi] = start.to_le_bytes();
            self.ram[0xfffc] = lo;
            self.ram[0xfffd] = hi;
        }
    }
}

//===========================================================================//


//===========================================================================//
