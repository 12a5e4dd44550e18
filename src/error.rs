// This code is licensed under MIT license (see LICENSE for details)

//! Error type for Cricket

use crate::state::STACK_DEPTH;
use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Cricket.
///
/// Every fatal machine fault carries the program counter of the faulting
/// instruction, so a front end can report where the program went wrong.
#[derive(Debug, Error)]
pub enum Error {
    /// ROM image does not fit in program memory. Reported at load time; the
    /// machine never starts.
    #[error("rom is {len} bytes, but only {max} fit in program memory")]
    RomTooLarge {
        /// Size of the rejected image
        len: usize,
        /// Capacity of the program region
        max: usize,
    },
    /// A `call` would push a seventeenth return address
    #[error("call at {pc:03x} ({word:04x}) exceeds stack depth {STACK_DEPTH}")]
    StackOverflow {
        /// Address of the offending `call`
        pc: u16,
        /// The offending word
        word: u16,
    },
    /// A `ret` found the call stack empty
    #[error("return at {pc:03x} ({word:04x}) with empty call stack")]
    StackUnderflow {
        /// Address of the offending `ret`
        pc: u16,
        /// The offending word
        word: u16,
    },
    /// The word's family or sub-opcode matches no known instruction
    #[error("opcode {word:04x} at {pc:03x} not recognized")]
    InvalidOpcode {
        /// Address of the offending word
        pc: u16,
        /// The offending word
        word: u16,
    },
    /// A fetch or data access fell outside the 4096-byte memory.
    /// When the fetch itself faults, `addr` is the program counter.
    #[error("address {addr:04x} out of range at {pc:03x}")]
    MemoryOutOfRange {
        /// First address outside memory
        addr: usize,
        /// Address of the instruction that faulted
        pc: u16,
    },
    /// Error originated in [std::io]
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "minifb")]
    /// Error originated in [minifb]
    #[error(transparent)]
    MinifbError(#[from] minifb::Error),
}
