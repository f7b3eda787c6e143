//! Error types.

use std::io;
use thiserror::Error;

//===========================================================================//

/// Result type for debugger backend operations.
pub type Result<T> = std::result::Result<T, DebugError>;

/// Result type for monitor client operations.
pub type MonitorResult<T> = std::result::Result<T, MonitorError>;

//===========================================================================//

/// A problem with the binary monitor's byte stream framing.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum FrameError {
    /// The first byte of a header was not the sync marker.
    #[error("bad sync byte 0x{0:02x}")]
    BadSync(u8),
    /// The header's protocol version is not supported.
    #[error("unsupported protocol version 0x{0:02x}")]
    BadVersion(u8),
    /// A message would not fit into the receive buffer.
    #[error("message of {needed} bytes exceeds receive buffer of {capacity}")]
    Overflow {
        /// Bytes required.
        needed: usize,
        /// Size of the buffer.
        capacity: usize,
    },
}

//===========================================================================//

/// An error from the binary monitor client.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The host name could not be resolved.  Connecting is not retried.
    #[error("cannot resolve {host}: {reason}")]
    Resolve {
        /// The host that was looked up.
        host: String,
        /// Why the lookup failed.
        reason: String,
    },
    /// Every connection attempt failed within the retry budget.
    #[error("timed out connecting to {host}:{port}")]
    ConnectTimeout {
        /// The host.
        host: String,
        /// The port.
        port: u16,
    },
    /// The monitor answered a command with a non-zero error code.
    #[error("monitor rejected command 0x{command:02x} with error 0x{code:02x}")]
    Remote {
        /// The message type of the command.
        command: u8,
        /// The error code from the response header.
        code: u8,
    },
    /// A register name that the monitor did not list as available.
    #[error("unknown register {0:?}")]
    UnknownRegister(String),
    /// The request was dropped from the pending-request table to make room
    /// for newer ones.
    #[error("request evicted before a response arrived")]
    Evicted,
    /// The connection is closed.
    #[error("not connected to monitor")]
    Disconnected,
    /// The incoming byte stream was corrupt.
    #[error("framing error: {0}")]
    Framing(#[from] FrameError),
    /// A response body did not have the expected layout.
    #[error("cannot decode response: {0}")]
    Decode(String),
    /// A socket error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

//===========================================================================//

/// An error from a debugger backend.
#[derive(Debug, Error)]
pub enum DebugError {
    /// A memory access outside the 64kB address space.  This indicates a bug
    /// in the caller, not a condition of the debugged program.
    #[error("illegal memory access at address 0x{0:x}")]
    IllegalAddress(u32),
    /// A program image could not be loaded.
    #[error("invalid program: {0}")]
    InvalidProgram(String),
    /// A remote operation was attempted without a connection.
    #[error("not connected")]
    NotConnected,
    /// The monitor client failed.
    #[error(transparent)]
    Monitor(#[from] MonitorError),
    /// A file could not be read.
    #[error(transparent)]
    Io(#[from] io::Error),
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{DebugError, FrameError, MonitorError};

    #[test]
    fn messages() {
        assert_eq!(
            DebugError::IllegalAddress(0x10000).to_string(),
            "illegal memory access at address 0x10000"
        );
        assert_eq!(
            MonitorError::Remote { command: 0x12, code: 0x8f }.to_string(),
            "monitor rejected command 0x12 with error 0x8f"
        );
        assert_eq!(
            MonitorError::from(FrameError::BadSync(0x41)).to_string(),
            "framing error: bad sync byte 0x41"
        );
    }

    #[test]
    fn monitor_errors_convert() {
        let error: DebugError = MonitorError::Disconnected.into();
        assert!(matches!(error, DebugError::Monitor(MonitorError::Disconnected)));
    }
}

//===========================================================================//
