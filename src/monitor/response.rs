use super::command::MessageType;
use crate::error::{MonitorError, MonitorResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};

//===========================================================================//

/// A checkpoint as recorded by the monitor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    /// Monitor-assigned id.
    pub id: u32,
    /// True if this record reports that the checkpoint just triggered.
    pub currently_hit: bool,
    /// First address.
    pub start: u16,
    /// Last address (inclusive).
    pub end: u16,
    /// Whether hitting it enters the monitor.
    pub stop_when_hit: bool,
    /// Whether it is enabled.
    pub enabled: bool,
    /// Trigger operations.
    pub operation: u8,
    /// Whether it deletes itself after the first hit.
    pub temporary: bool,
    /// Number of hits so far.
    pub hit_count: u32,
    /// Number of hits still to be ignored.
    pub ignore_count: u32,
    /// Whether a condition is attached.
    pub has_condition: bool,
    /// Memory space.
    pub memspace: u8,
}

impl Checkpoint {
    /// Writes this checkpoint in the layout of a checkpoint reply body.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.id)?;
        writer.write_u8(self.currently_hit as u8)?;
        writer.write_u16::<LittleEndian>(self.start)?;
        writer.write_u16::<LittleEndian>(self.end)?;
        writer.write_u8(self.stop_when_hit as u8)?;
        writer.write_u8(self.enabled as u8)?;
        writer.write_u8(self.operation)?;
        writer.write_u8(self.temporary as u8)?;
        writer.write_u32::<LittleEndian>(self.hit_count)?;
        writer.write_u32::<LittleEndian>(self.ignore_count)?;
        writer.write_u8(self.has_condition as u8)?;
        writer.write_u8(self.memspace)?;
        Ok(())
    }
}

/// One register value from a registers reply.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RegisterValue {
    /// Register id.
    pub id: u8,
    /// Value.
    pub value: u16,
}

/// A register description from a registers-available reply.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RegisterInfo {
    /// Register id.
    pub id: u8,
    /// Width in bits.
    pub bits: u8,
    /// Name.
    pub name: String,
}

/// A memory bank description from a banks-available reply.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BankInfo {
    /// Bank id.
    pub id: u16,
    /// Name.
    pub name: String,
}

//===========================================================================//

/// A decoded message from the monitor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    /// Memory contents.
    Memory(Vec<u8>),
    /// Register values.
    Registers(Vec<RegisterValue>),
    /// Available registers.
    RegistersAvailable(Vec<RegisterInfo>),
    /// Available banks.
    BanksAvailable(Vec<BankInfo>),
    /// A single checkpoint record.
    Checkpoint(Checkpoint),
    /// The trailer of a checkpoint list: the number of records sent.
    CheckpointCount(u32),
    /// A complete checkpoint list, assembled from the records that
    /// preceded its trailer.
    CheckpointList(Vec<Checkpoint>),
    /// The emulator entered the monitor with the CPU at this address.
    Stopped(u16),
    /// The emulator resumed at this address.
    Resumed(u16),
    /// The CPU jammed at this address.
    Jam(u16),
    /// A reply with nothing in it beyond its type.
    Ack(MessageType),
    /// A reply of a type this client does not decode.
    Other {
        /// The raw message type.
        message_type: u8,
        /// The raw body.
        body: Vec<u8>,
    },
}

impl Response {
    /// Decodes a message body of the given type.
    pub fn decode(message_type: u8, body: &[u8]) -> MonitorResult<Response> {
        let Some(ty) = MessageType::from_code(message_type) else {
            return Ok(Response::Other { message_type, body: body.to_vec() });
        };
        let mut reader = Cursor::new(body);
        let response = match ty {
            MessageType::MemoryGet => {
                let len = reader.read_u16::<LittleEndian>().map_err(short)?;
                let rest = &body[2..];
                let len = if len == 0 { rest.len() } else { usize::from(len) };
                let data = rest.get(..len).ok_or_else(|| {
                    MonitorError::Decode(format!(
                        "memory reply declares {len} bytes but has {}",
                        rest.len()
                    ))
                })?;
                Response::Memory(data.to_vec())
            }
            MessageType::RegistersGet | MessageType::RegistersSet => {
                let items = read_items(&mut reader, |item| {
                    let id = item.read_u8()?;
                    let value = item.read_u16::<LittleEndian>()?;
                    Ok(RegisterValue { id, value })
                })?;
                Response::Registers(items)
            }
            MessageType::RegistersAvailable => {
                let items = read_items(&mut reader, |item| {
                    let id = item.read_u8()?;
                    let bits = item.read_u8()?;
                    let name = read_name(item)?;
                    Ok(RegisterInfo { id, bits, name })
                })?;
                Response::RegistersAvailable(items)
            }
            MessageType::BanksAvailable => {
                let items = read_items(&mut reader, |item| {
                    let id = item.read_u16::<LittleEndian>()?;
                    let name = read_name(item)?;
                    Ok(BankInfo { id, name })
                })?;
                Response::BanksAvailable(items)
            }
            MessageType::CheckpointGet | MessageType::CheckpointSet => {
                Response::Checkpoint(read_checkpoint(&mut reader).map_err(short)?)
            }
            MessageType::CheckpointList => Response::CheckpointCount(
                reader.read_u32::<LittleEndian>().map_err(short)?,
            ),
            MessageType::Stopped => Response::Stopped(read_pc(&mut reader)?),
            MessageType::Resumed => Response::Resumed(read_pc(&mut reader)?),
            MessageType::Jam => Response::Jam(read_pc(&mut reader)?),
            MessageType::MemorySet
            | MessageType::CheckpointDelete
            | MessageType::CheckpointToggle
            | MessageType::AdvanceInstructions
            | MessageType::KeyboardFeed
            | MessageType::ExecuteUntilReturn
            | MessageType::Ping
            | MessageType::Exit
            | MessageType::Quit
            | MessageType::Reset
            | MessageType::Autostart => Response::Ack(ty),
        };
        Ok(response)
    }
}

//===========================================================================//

fn short(error: io::Error) -> MonitorError {
    MonitorError::Decode(error.to_string())
}

fn read_pc(reader: &mut Cursor<&[u8]>) -> MonitorResult<u16> {
    reader.read_u16::<LittleEndian>().map_err(short)
}

fn read_name(reader: &mut Cursor<&[u8]>) -> io::Result<String> {
    let len = reader.read_u8()?;
    let mut name = vec![0u8; usize::from(len)];
    reader.read_exact(&mut name)?;
    Ok(String::from_utf8_lossy(&name).to_lowercase())
}

/// Reads a `count u16` array of items, each prefixed with its size (not
/// counting the size byte itself).  Fields beyond what `read_item` consumes
/// are skipped.
fn read_items<T, F>(reader: &mut Cursor<&[u8]>, mut read_item: F) -> MonitorResult<Vec<T>>
where
    F: FnMut(&mut Cursor<&[u8]>) -> io::Result<T>,
{
    let count = reader.read_u16::<LittleEndian>().map_err(short)?;
    let mut items = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let size = reader.read_u8().map_err(short)?;
        let next = reader.position() + u64::from(size);
        items.push(read_item(reader).map_err(short)?);
        reader.set_position(next);
    }
    Ok(items)
}

fn read_checkpoint(reader: &mut Cursor<&[u8]>) -> io::Result<Checkpoint> {
    Ok(Checkpoint {
        id: reader.read_u32::<LittleEndian>()?,
        currently_hit: reader.read_u8()? != 0,
        start: reader.read_u16::<LittleEndian>()?,
        end: reader.read_u16::<LittleEndian>()?,
        stop_when_hit: reader.read_u8()? != 0,
        enabled: reader.read_u8()? != 0,
        operation: reader.read_u8()?,
        temporary: reader.read_u8()? != 0,
        hit_count: reader.read_u32::<LittleEndian>()?,
        ignore_count: reader.read_u32::<LittleEndian>()?,
        has_condition: reader.read_u8()? != 0,
        memspace: reader.read_u8()?,
    })
}

//===========================================================================//


//===========================================================================//
