//! A client for the VICE binary monitor protocol.
//!
//! Every message in either direction is a 12-byte header followed by a
//! type-specific body.  Requests carry an id that the reply echoes; replies
//! and unsolicited events share one byte stream.

mod client;
mod command;
mod frame;
mod response;
mod token;

pub use client::{Dispatcher, MonitorClient, MonitorEvent};
pub use command::{
    CHECKPOINT_OP_EXEC, CHECKPOINT_OP_LOAD, CHECKPOINT_OP_STORE, Command,
    MEMSPACE_MAIN, MessageType,
};
pub use frame::{
    EVENT_REQUEST_ID, Frame, FrameBuffer, FrameHeader, HEADER_LEN,
    PROTOCOL_VERSION, SYNC_BYTE,
};
pub use response::{BankInfo, Checkpoint, RegisterInfo, RegisterValue, Response};
pub use token::{ReplyReceiver, TokenTable};

//===========================================================================//
