//! Loading of program images: a little-endian load address followed by the
//! bytes to place there.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

//===========================================================================//

// A BASIC stub longer than this is not treated as a SYS launcher.
const MAX_HEADER_BYTES: usize = 32;
const BASIC_TOKEN_SYS: u8 = 0x9e;

//===========================================================================//

/// A program image ready to be placed into memory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgramImage {
    load_address: u16,
    data: Vec<u8>,
}

impl ProgramImage {
    /// Creates an image from a load address and its contents.  Fails if the
    /// contents would extend past $FFFF.
    pub fn new(load_address: u16, data: Vec<u8>) -> io::Result<ProgramImage> {
        let end = usize::from(load_address) + data.len();
        if end > 0x10000 {
            invalid_data!(
                "program of {} bytes at ${:04x} extends past $ffff",
                data.len(),
                load_address
            );
        }
        Ok(ProgramImage { load_address, data })
    }

    /// Reads an image: two bytes of load address, then the contents.
    pub fn read_from<R: Read>(mut reader: R) -> io::Result<ProgramImage> {
        let load_address = match reader.read_u16::<LittleEndian>() {
            Ok(addr) => addr,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                invalid_data!("program file is too short for a load address");
            }
            Err(error) => return Err(error),
        };
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        ProgramImage::new(load_address, data)
    }

    /// Parses an image from a byte slice.
    pub fn parse(bytes: &[u8]) -> io::Result<ProgramImage> {
        ProgramImage::read_from(bytes)
    }

    /// Returns the address the contents are placed at.
    pub fn load_address(&self) -> u16 {
        self.load_address
    }

    /// Returns the contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the address of the last byte of the contents, or `None` if the
    /// image is empty.
    pub fn end_address(&self) -> Option<u16> {
        let len = u16::try_from(self.data.len()).ok()?;
        len.checked_sub(1).map(|last| self.load_address.wrapping_add(last))
    }

    /// Looks for a one-line BASIC launcher (`10 SYS 2062`) at the start of
    /// the image and returns the address it calls.
    pub fn sys_address(&self) -> Option<u16> {
        let data = &self.data;
        let next_line =
            u16::from_le_bytes([*data.first()?, *data.get(1)?]);
        let delta = next_line.wrapping_sub(self.load_address);
        if delta == 0 || usize::from(delta) >= MAX_HEADER_BYTES {
            return None;
        }
        let header = &data[..data.len().min(MAX_HEADER_BYTES)];
        let sys = header.iter().skip(2).position(|&b| b == BASIC_TOKEN_SYS)?;
        let digits = header[sys + 3..]
            .iter()
            .skip_while(|&&b| b == b' ')
            .take_while(|b| b.is_ascii_digit());
        let mut address: u32 = 0;
        let mut any = false;
        for &digit in digits {
            address = address * 10 + u32::from(digit - b'0');
            if address > 0xffff {
                return None;
            }
            any = true;
        }
        if any { u16::try_from(address).ok() } else { None }
    }

    /// Chooses where execution starts: the forced address if given, then
    /// the BASIC launcher's target if offset correction is enabled, then the
    /// load address.
    pub fn entry_point(
        &self,
        auto_offset_correction: bool,
        forced_start: Option<u16>,
    ) -> u16 {
        if let Some(start) = forced_start {
            return start;
        }
        if auto_offset_correction {
            if let Some(addr) = self.sys_address() {
                return addr;
            }
        }
        self.load_address
    }
}

//===========================================================================//


//===========================================================================//
