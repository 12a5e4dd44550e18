// This code is licensed under MIT license (see LICENSE for details)

//! This crate implements the Chip-8 instruction set as a plain state machine:
//! fetch a big-endian word, decode it into an [Insn], and let the handler
//! mutate a [State]. The host owns the window, the keyboard and the clock,
//! and drives the interpreter through the traits in [host].

pub mod cpu;
pub mod error;
pub mod host;
pub mod mem;
pub mod screen;
pub mod state;

pub use prelude::*;

/// Pairs a [CPU] with the [FrameBuffer] it draws to
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chip8 {
    pub cpu: cpu::CPU,
    pub screen: screen::FrameBuffer,
}

/// Common imports for cricket
pub mod prelude {
    pub use super::Chip8;
    pub use crate::cpu::{
        flags::Flags,
        instruction::{
            disassembler::{Dis, Disassembler},
            Insn, Word,
        },
        Status, CPU,
    };
    pub use crate::error::{Error, Result};
    pub use crate::host::{Clock, Events, Host, Input, Screen, WallClock};
    pub use crate::mem::{Mem, FONT_HEIGHT, FONT_START, MEM_SIZE, PROGRAM_START};
    pub use crate::screen::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
    pub use crate::state::{State, STACK_DEPTH};
}
