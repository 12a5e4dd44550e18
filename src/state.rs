// This code is licensed under MIT license (see LICENSE for details)

//! All mutable machine state in one owned value
//!
//! [State] is pure data: registers, memory, stack, timers, and the keypad
//! snapshot. The accessors preserve the machine's invariants (timers clamp
//! at zero, the keypad is a 16-bit mask) and everything else is mutated by
//! the opcode handlers in [crate::cpu]. Owning the whole machine as a value
//! keeps instances independent and tests deterministic.

use crate::{
    error::Result,
    host::Input,
    mem::{Mem, PROGRAM_START},
};

/// Maximum call depth. A seventeenth nested `call` is a fatal fault.
pub const STACK_DEPTH: usize = 16;

/// Registers, memory, stack, timers, and keypad of one machine
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    /// Main memory
    pub(crate) mem: Mem,
    /// General-purpose registers v0..=vF.
    /// vF doubles as the carry/borrow/collision flag and is clobbered by
    /// arithmetic and `draw`; programs use it as scratch at their own risk.
    pub(crate) v: [u8; 16],
    /// Index register. May be left out of range by program arithmetic;
    /// faults surface on the access, not the assignment.
    pub(crate) i: u16,
    /// Program counter
    pub(crate) pc: u16,
    /// Call stack, holding at most [STACK_DEPTH] return addresses
    pub(crate) stack: Vec<u16>,
    /// Delay timer
    pub(crate) delay: u8,
    /// Sound timer
    pub(crate) sound: u8,
    /// Keypad bitmask, bit n set while key n is held
    pub(crate) keys: u16,
}

impl State {
    /// Constructs a powered-on machine: font resident, PC at
    /// [PROGRAM_START], everything else zero.
    pub fn new() -> Self {
        State {
            mem: Mem::new(),
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            stack: Vec::with_capacity(STACK_DEPTH),
            delay: 0,
            sound: 0,
            keys: 0,
        }
    }

    /// Returns registers, stack, and timers to power-on values.
    /// Memory (and any loaded program) is untouched.
    pub fn reset(&mut self) {
        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_START;
        self.stack.clear();
        self.delay = 0;
        self.sound = 0;
        self.keys = 0;
    }

    /// Copies a program image into memory at [PROGRAM_START]
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.mem.load_rom(rom)?;
        Ok(self)
    }

    /// Decrements both timers, clamping at zero
    pub fn tick_timers(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Rebuilds the keypad mask from the host.
    /// Handlers read the snapshot, never the host, so one tick sees one
    /// consistent keypad.
    pub(crate) fn sync_keys(&mut self, input: &impl Input) {
        let mut keys = 0;
        for key in 0..16 {
            if input.is_key_down(key) {
                keys |= 1 << key;
            }
        }
        self.keys = keys;
    }

    /// Whether hex key `key` is held, per the last sync.
    /// Only the low nibble of `key` is meaningful.
    pub fn is_key_down(&self, key: u8) -> bool {
        self.keys >> (key & 0xf) & 1 != 0
    }

    /// Lowest-numbered held key, if any
    pub(crate) fn first_key(&self) -> Option<u8> {
        if self.keys == 0 {
            None
        } else {
            Some(self.keys.trailing_zeros() as u8)
        }
    }

    /// Gets the general-purpose registers
    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    /// Gets the program counter
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Gets the index register
    pub fn i(&self) -> u16 {
        self.i
    }

    /// Gets the delay timer
    pub fn delay(&self) -> u8 {
        self.delay
    }

    /// Gets the sound timer
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Gets the keypad snapshot
    pub fn keys(&self) -> u16 {
        self.keys
    }

    /// Gets the return-address stack
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }
}

impl Default for State {
    fn default() -> Self {
        State::new()
    }
}
