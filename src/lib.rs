//! Debugger backends for 6502/6510 programs: a local instruction
//! interpreter, and a client for an emulator's binary monitor protocol.

#![warn(missing_docs)]

macro_rules! invalid_data {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         format!($fmt, $($arg)+)))
    };
}

pub mod bus;
pub mod config;
pub mod debug;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod prg;
pub mod proc;

pub use error::{DebugError, MonitorError, Result};
