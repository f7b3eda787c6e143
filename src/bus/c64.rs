use super::{SimBus, describe_size};
use std::fs;
use std::io;
use std::path::Path;

//===========================================================================//

const BASIC_ROM_SIZE: usize = 0x2000;
const KERNAL_ROM_SIZE: usize = 0x2000;
const CHAR_ROM_SIZE: usize = 0x1000;

// Bits of the 6510 I/O port at $0001 that control bank switching.
const PORT_LORAM: u8 = 0b0000_0001;
const PORT_HIRAM: u8 = 0b0000_0010;
const PORT_CHAREN: u8 = 0b0000_0100;

//===========================================================================//

/// The ROM images that can be mapped into a C64's address space.  Any image
/// that is absent leaves the RAM underneath it visible.
#[derive(Clone, Debug, Default)]
pub struct RomSet {
    /// BASIC interpreter ROM, mapped at $A000-$BFFF.
    pub basic: Option<Box<[u8]>>,
    /// KERNAL ROM, mapped at $E000-$FFFF.
    pub kernal: Option<Box<[u8]>>,
    /// Character generator ROM, mapped at $D000-$DFFF.
    pub chargen: Option<Box<[u8]>>,
}

impl RomSet {
    /// Loads `basic.bin`, `kernal.bin` and `chargen.bin` from the given
    /// directory.  Missing files are skipped; files of the wrong size are
    /// rejected.
    pub fn load_dir(dir: &Path) -> io::Result<RomSet> {
        Ok(RomSet {
            basic: load_rom(&dir.join("basic.bin"), BASIC_ROM_SIZE)?,
            kernal: load_rom(&dir.join("kernal.bin"), KERNAL_ROM_SIZE)?,
            chargen: load_rom(&dir.join("chargen.bin"), CHAR_ROM_SIZE)?,
        })
    }
}

fn load_rom(path: &Path, size: usize) -> io::Result<Option<Box<[u8]>>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(path)?;
    if data.len() != size {
        invalid_data!(
            "{} is {} bytes, expected {}",
            path.display(),
            data.len(),
            size
        );
    }
    Ok(Some(data.into_boxed_slice()))
}

//===========================================================================//

/// A simulated C64 memory bus: 64kB of RAM with BASIC, KERNAL and character
/// ROMs banked in and out by the 6510's on-chip I/O port.
pub struct C64Bus {
    ram: Box<[u8; 0x10000]>,
    roms: RomSet,
}

impl C64Bus {
    /// Returns a new simulated C64 bus using the given ROM images.
    pub fn new(roms: RomSet) -> C64Bus {
        let mut bus = C64Bus { ram: Box::new([0u8; 0x10000]), roms };
        bus.power_on(None);
        bus
    }

    fn rom_byte(&self, addr: u16) -> Option<u8> {
        let port = self.ram[0x0001];
        let (rom, base) = if addr >= 0xe000 && port & PORT_HIRAM != 0 {
            (&self.roms.kernal, 0xe000)
        } else if (0xd000..0xe000).contains(&addr) && port & PORT_CHAREN == 0
        {
            (&self.roms.chargen, 0xd000)
        } else if (0xa000..0xc000).contains(&addr) && port & PORT_LORAM != 0 {
            (&self.roms.basic, 0xa000)
        } else {
            return None;
        };
        rom.as_ref().map(|rom| rom[(addr - base) as usize])
    }
}

impl SimBus for C64Bus {
    fn description(&self) -> String {
        let mut desc = format!("C64 {}", describe_size(self.ram.len(), "RAM"));
        for (name, rom) in [
            ("BASIC", &self.roms.basic),
            ("KERNAL", &self.roms.kernal),
            ("CHARGEN", &self.roms.chargen),
        ] {
            if rom.is_some() {
                desc.push_str(" + ");
                desc.push_str(name);
            }
        }
        desc
    }

    fn peek_byte(&self, addr: u16) -> u8 {
        self.rom_byte(addr).unwrap_or(self.ram[addr as usize])
    }

    fn peek_ram(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn read_byte(&mut self, addr: u16) -> u8 {
        self.peek_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, data: u8) {
        // Writes to ROM-shadowed addresses land in the RAM underneath.
        self.ram[addr as usize] = data;
    }

    fn power_on(&mut self, start: Option<u16>) {
        self.ram.fill(0);
        self.ram[0x0000] = 0xff;
        self.ram[0x0001] = 0xff;
        if let Some(start) = start {
            let [lo, hi] = start.to_le_bytes();
            self.ram[0xfffc] = lo;
            self.ram[0xfffd] = hi;
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{C64Bus, RomSet};
    use crate::bus::SimBus;

    fn test_roms() -> RomSet {
        RomSet {
            basic: Some(vec![0xba; 0x2000].into_boxed_slice()),
            kernal: Some(vec![0xe0; 0x2000].into_boxed_slice()),
            chargen: Some(vec![0xcc; 0x1000].into_boxed_slice()),
        }
    }

    #[test]
    fn description() {
        assert_eq!(C64Bus::new(RomSet::default()).description(), "C64 64kB RAM");
        assert_eq!(
            C64Bus::new(test_roms()).description(),
            "C64 64kB RAM + BASIC + KERNAL + CHARGEN"
        );
    }

    #[test]
    fn power_on_maps_all_roms() {
        let bus = C64Bus::new(test_roms());
        assert_eq!(bus.peek_byte(0x0001), 0xff);
        assert_eq!(bus.peek_byte(0xa000), 0xba);
        assert_eq!(bus.peek_byte(0xe123), 0xe0);
        // CHAREN set means I/O, not character ROM.
        assert_eq!(bus.peek_byte(0xd000), 0x00);
        assert_eq!(bus.peek_byte(0xc000), 0x00);
    }

    #[test]
    fn bank_switching() {
        let mut bus = C64Bus::new(test_roms());
        bus.write_byte(0xa000, 0x12);
        bus.write_byte(0xe000, 0x34);
        assert_eq!(bus.peek_byte(0xa000), 0xba);
        assert_eq!(bus.peek_ram(0xa000), 0x12);
        bus.write_byte(0x0001, 0b000);
        assert_eq!(bus.peek_byte(0xa000), 0x12);
        assert_eq!(bus.peek_byte(0xe000), 0x34);
        assert_eq!(bus.peek_byte(0xd000), 0xcc);
        bus.write_byte(0x0001, 0b010);
        assert_eq!(bus.peek_byte(0xa000), 0x12);
        assert_eq!(bus.peek_byte(0xe000), 0xe0);
    }

    #[test]
    fn missing_roms_leave_ram_visible() {
        let mut bus = C64Bus::new(RomSet::default());
        bus.write_byte(0xfffc, 0x00);
        bus.write_byte(0xfffd, 0xc0);
        assert_eq!(bus.read_byte(0xfffd), 0xc0);
    }
}

//===========================================================================//
