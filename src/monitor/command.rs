use super::frame::FrameHeader;
use byteorder::{LittleEndian, WriteBytesExt};
use std::fmt;
use std::io::{self, Write};

//===========================================================================//

/// Binary monitor message types.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MessageType {
    /// Read memory.
    MemoryGet,
    /// Write memory.
    MemorySet,
    /// Get one checkpoint; also the type of every checkpoint record,
    /// including unsolicited checkpoint hits.
    CheckpointGet,
    /// Create a checkpoint.
    CheckpointSet,
    /// Delete a checkpoint.
    CheckpointDelete,
    /// List all checkpoints.
    CheckpointList,
    /// Enable or disable a checkpoint.
    CheckpointToggle,
    /// Read registers.
    RegistersGet,
    /// Write registers.
    RegistersSet,
    /// Execute a number of instructions.
    AdvanceInstructions,
    /// Type text on the emulated keyboard.
    KeyboardFeed,
    /// Run until the current subroutine returns.
    ExecuteUntilReturn,
    /// No-op round trip.
    Ping,
    /// List memory banks.
    BanksAvailable,
    /// List registers.
    RegistersAvailable,
    /// Unsolicited: the CPU jammed.
    Jam,
    /// Unsolicited: the emulator entered the monitor.
    Stopped,
    /// Unsolicited: the emulator resumed.
    Resumed,
    /// Leave the monitor and resume emulation.
    Exit,
    /// Quit the emulator.
    Quit,
    /// Reset the machine.
    Reset,
    /// Load and optionally run a program.
    Autostart,
}

impl MessageType {
    const ALL: [MessageType; 22] = [
        MessageType::MemoryGet,
        MessageType::MemorySet,
        MessageType::CheckpointGet,
        MessageType::CheckpointSet,
        MessageType::CheckpointDelete,
        MessageType::CheckpointList,
        MessageType::CheckpointToggle,
        MessageType::RegistersGet,
        MessageType::RegistersSet,
        MessageType::AdvanceInstructions,
        MessageType::KeyboardFeed,
        MessageType::ExecuteUntilReturn,
        MessageType::Ping,
        MessageType::BanksAvailable,
        MessageType::RegistersAvailable,
        MessageType::Jam,
        MessageType::Stopped,
        MessageType::Resumed,
        MessageType::Exit,
        MessageType::Quit,
        MessageType::Reset,
        MessageType::Autostart,
    ];

    /// Returns the one-byte wire code.
    pub fn code(self) -> u8 {
        match self {
            MessageType::MemoryGet => 0x01,
            MessageType::MemorySet => 0x02,
            MessageType::CheckpointGet => 0x11,
            MessageType::CheckpointSet => 0x12,
            MessageType::CheckpointDelete => 0x13,
            MessageType::CheckpointList => 0x14,
            MessageType::CheckpointToggle => 0x15,
            MessageType::RegistersGet => 0x31,
            MessageType::RegistersSet => 0x32,
            MessageType::AdvanceInstructions => 0x71,
            MessageType::KeyboardFeed => 0x72,
            MessageType::ExecuteUntilReturn => 0x73,
            MessageType::Ping => 0x81,
            MessageType::BanksAvailable => 0x82,
            MessageType::RegistersAvailable => 0x83,
            MessageType::Jam => 0x61,
            MessageType::Stopped => 0x62,
            MessageType::Resumed => 0x63,
            MessageType::Exit => 0xaa,
            MessageType::Quit => 0xbb,
            MessageType::Reset => 0xcc,
            MessageType::Autostart => 0xdd,
        }
    }

    /// Looks up a wire code.
    pub fn from_code(code: u8) -> Option<MessageType> {
        MessageType::ALL.into_iter().find(|ty| ty.code() == code)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{:?} (0x{:02x})", self, self.code())
    }
}

//===========================================================================//

/// Checkpoint trigger operations (a bit set).
pub const CHECKPOINT_OP_LOAD: u8 = 0x01;
/// See [`CHECKPOINT_OP_LOAD`].
pub const CHECKPOINT_OP_STORE: u8 = 0x02;
/// See [`CHECKPOINT_OP_LOAD`].
pub const CHECKPOINT_OP_EXEC: u8 = 0x04;

/// The main CPU memory space.
pub const MEMSPACE_MAIN: u8 = 0x00;

//===========================================================================//

/// A request to the binary monitor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Read `start..=end`.
    MemoryGet {
        /// Whether the read may trigger I/O side effects.
        side_effects: bool,
        /// First address.
        start: u16,
        /// Last address (inclusive).
        end: u16,
        /// Memory space.
        memspace: u8,
        /// Bank id.
        bank: u16,
    },
    /// Write `data` starting at `start`.
    MemorySet {
        /// Whether the write may trigger I/O side effects.
        side_effects: bool,
        /// First address.
        start: u16,
        /// Memory space.
        memspace: u8,
        /// Bank id.
        bank: u16,
        /// Bytes to write; must not be empty.
        data: Vec<u8>,
    },
    /// Fetch one checkpoint.
    CheckpointGet(u32),
    /// Create a checkpoint.
    CheckpointSet {
        /// First address.
        start: u16,
        /// Last address (inclusive).
        end: u16,
        /// Whether hitting it enters the monitor.
        stop_when_hit: bool,
        /// Whether it starts enabled.
        enabled: bool,
        /// Trigger operations, e.g. [`CHECKPOINT_OP_EXEC`].
        operation: u8,
        /// Whether it deletes itself after the first hit.
        temporary: bool,
    },
    /// Delete a checkpoint.
    CheckpointDelete(u32),
    /// List every checkpoint.
    CheckpointList,
    /// Enable or disable a checkpoint.
    CheckpointToggle {
        /// The checkpoint.
        id: u32,
        /// New state.
        enabled: bool,
    },
    /// Read all registers of a memory space.
    RegistersGet {
        /// Memory space.
        memspace: u8,
    },
    /// Write registers, given as (register id, value) pairs.
    RegistersSet {
        /// Memory space.
        memspace: u8,
        /// Registers to write.
        values: Vec<(u8, u16)>,
    },
    /// Execute `count` instructions.
    AdvanceInstructions {
        /// Treat subroutine calls as one instruction.
        step_over: bool,
        /// Instructions to execute.
        count: u16,
    },
    /// Type PETSCII text.
    KeyboardFeed(Vec<u8>),
    /// Run until the current subroutine returns.
    ExecuteUntilReturn,
    /// Round trip.
    Ping,
    /// List memory banks.
    BanksAvailable,
    /// List registers of a memory space.
    RegistersAvailable {
        /// Memory space.
        memspace: u8,
    },
    /// Resume emulation.
    Exit,
    /// Quit the emulator.
    Quit,
    /// Reset the machine.
    Reset {
        /// Hard (power cycle) rather than soft reset.
        hard: bool,
    },
    /// Load a file from the host, optionally running it.
    Autostart {
        /// Run after loading.
        run: bool,
        /// File index within a disk image.
        index: u16,
        /// Host file name.
        filename: String,
    },
}

impl Command {
    /// Returns this command's message type.
    pub fn message_type(&self) -> MessageType {
        match self {
            Command::MemoryGet { .. } => MessageType::MemoryGet,
            Command::MemorySet { .. } => MessageType::MemorySet,
            Command::CheckpointGet(_) => MessageType::CheckpointGet,
            Command::CheckpointSet { .. } => MessageType::CheckpointSet,
            Command::CheckpointDelete(_) => MessageType::CheckpointDelete,
            Command::CheckpointList => MessageType::CheckpointList,
            Command::CheckpointToggle { .. } => MessageType::CheckpointToggle,
            Command::RegistersGet { .. } => MessageType::RegistersGet,
            Command::RegistersSet { .. } => MessageType::RegistersSet,
            Command::AdvanceInstructions { .. } => {
                MessageType::AdvanceInstructions
            }
            Command::KeyboardFeed(_) => MessageType::KeyboardFeed,
            Command::ExecuteUntilReturn => MessageType::ExecuteUntilReturn,
            Command::Ping => MessageType::Ping,
            Command::BanksAvailable => MessageType::BanksAvailable,
            Command::RegistersAvailable { .. } => {
                MessageType::RegistersAvailable
            }
            Command::Exit => MessageType::Exit,
            Command::Quit => MessageType::Quit,
            Command::Reset { .. } => MessageType::Reset,
            Command::Autostart { .. } => MessageType::Autostart,
        }
    }

    /// Writes this command's body.
    pub fn write_body<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Command::MemoryGet { side_effects, start, end, memspace, bank } => {
                writer.write_u8(*side_effects as u8)?;
                writer.write_u16::<LittleEndian>(*start)?;
                writer.write_u16::<LittleEndian>(*end)?;
                writer.write_u8(*memspace)?;
                writer.write_u16::<LittleEndian>(*bank)?;
            }
            Command::MemorySet { side_effects, start, memspace, bank, data } => {
                let Some(last) = data.len().checked_sub(1) else {
                    return Err(invalid_input("memory set with no data"));
                };
                let end = u16::try_from(usize::from(*start) + last)
                    .map_err(|_| invalid_input("memory set past $ffff"))?;
                writer.write_u8(*side_effects as u8)?;
                writer.write_u16::<LittleEndian>(*start)?;
                writer.write_u16::<LittleEndian>(end)?;
                writer.write_u8(*memspace)?;
                writer.write_u16::<LittleEndian>(*bank)?;
                writer.write_all(data)?;
            }
            Command::CheckpointGet(id) | Command::CheckpointDelete(id) => {
                writer.write_u32::<LittleEndian>(*id)?;
            }
            Command::CheckpointSet {
                start,
                end,
                stop_when_hit,
                enabled,
                operation,
                temporary,
            } => {
                writer.write_u16::<LittleEndian>(*start)?;
                writer.write_u16::<LittleEndian>(*end)?;
                writer.write_u8(*stop_when_hit as u8)?;
                writer.write_u8(*enabled as u8)?;
                writer.write_u8(*operation)?;
                writer.write_u8(*temporary as u8)?;
                writer.write_u8(MEMSPACE_MAIN)?;
            }
            Command::CheckpointToggle { id, enabled } => {
                writer.write_u32::<LittleEndian>(*id)?;
                writer.write_u8(*enabled as u8)?;
            }
            Command::RegistersGet { memspace }
            | Command::RegistersAvailable { memspace } => {
                writer.write_u8(*memspace)?;
            }
            Command::RegistersSet { memspace, values } => {
                let count = u16::try_from(values.len())
                    .map_err(|_| invalid_input("too many registers"))?;
                writer.write_u8(*memspace)?;
                writer.write_u16::<LittleEndian>(count)?;
                for &(id, value) in values {
                    writer.write_u8(3)?; // item size, excluding this byte
                    writer.write_u8(id)?;
                    writer.write_u16::<LittleEndian>(value)?;
                }
            }
            Command::AdvanceInstructions { step_over, count } => {
                writer.write_u8(*step_over as u8)?;
                writer.write_u16::<LittleEndian>(*count)?;
            }
            Command::KeyboardFeed(text) => {
                write_short_bytes(writer, text)?;
            }
            Command::Reset { hard } => {
                writer.write_u8(*hard as u8)?;
            }
            Command::Autostart { run, index, filename } => {
                writer.write_u8(*run as u8)?;
                writer.write_u16::<LittleEndian>(*index)?;
                write_short_bytes(writer, filename.as_bytes())?;
            }
            Command::CheckpointList
            | Command::ExecuteUntilReturn
            | Command::Ping
            | Command::BanksAvailable
            | Command::Exit
            | Command::Quit => {}
        }
        Ok(())
    }

    /// Serializes this command as a complete request message.
    pub fn encode(&self, request_id: u32) -> io::Result<Vec<u8>> {
        let mut body = Vec::new();
        self.write_body(&mut body)?;
        let header = FrameHeader {
            body_len: body.len() as u32,
            message_type: self.message_type().code(),
            error: 0,
            request_id,
        };
        let mut bytes = Vec::with_capacity(super::frame::HEADER_LEN + body.len());
        header.write_to(&mut bytes)?;
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }
}

fn write_short_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    let len = u8::try_from(bytes.len())
        .map_err(|_| invalid_input("string longer than 255 bytes"))?;
    writer.write_u8(len)?;
    writer.write_all(bytes)
}

fn invalid_input(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

//===========================================================================//


//===========================================================================//
