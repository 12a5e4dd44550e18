// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions


pub mod behavior;
pub mod flags;
pub mod instruction;

use self::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn, Word,
    },
};
use crate::{
    error::{Error, Result},
    host::{Host, Screen},
    state::State,
};
use owo_colors::OwoColorize;
use std::fmt::Debug;

type Reg = usize;
type Adr = u16;
type Nib = u8;

/// Execution status of the machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Fetching and executing instructions
    #[default]
    Running,
    /// `waitk` ran with no key held. The program counter already points past
    /// the instruction and stays put until the host reports a press, which
    /// lands in vX.
    WaitingForKey {
        /// Destination register for the awaited key
        x: Reg,
    },
    /// Terminal. Entered on a fatal fault or host quit; only [CPU::reset]
    /// leaves it.
    Halted,
}

/// Represents the internal state of the CPU interpreter
///
/// Owns the whole machine as a value: two instances are fully independent,
/// and tests never share or reset global state.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CPU {
    /// Flags that control how the CPU behaves, but which aren't inherent to
    /// the chip-8. Includes debug, pause, and the speed target.
    pub flags: Flags,
    state: State,
    status: Status,
    cycle: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    disassembler: Dis,
}

// public interface
impl CPU {
    /// Constructs a new CPU with the provided [Flags]
    /// # Examples
    /// ```rust
    /// # use cricket::*;
    /// let cpu = CPU::new(Flags { debug: true, ..Default::default() });
    /// assert!(cpu.flags.debug);
    /// ```
    pub fn new(flags: Flags) -> Self {
        CPU {
            flags,
            state: State::new(),
            status: Status::Running,
            cycle: 0,
            disassembler: Dis::default(),
        }
    }

    /// Loads a program from a file into the program space
    pub fn load_program(&mut self, rom: impl AsRef<std::path::Path>) -> Result<&mut Self> {
        self.load_rom(&std::fs::read(rom)?)
    }

    /// Loads program bytes into the program space
    /// # Examples
    /// ```rust
    /// # use cricket::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_rom(&[0x60, 0x05]).unwrap();
    /// assert!(cpu.load_rom(&[0; 4096]).is_err());
    /// ```
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.state.load_rom(rom)?;
        Ok(self)
    }

    /// Gets the execution [Status]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Gets a snapshot of the whole machine [State]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Gets a slice of the entire general purpose registers
    /// # Examples
    /// ```rust
    /// # use cricket::*;
    /// let cpu = CPU::default();
    /// assert_eq!(&[0; 16], cpu.v());
    /// ```
    pub fn v(&self) -> &[u8; 16] {
        self.state.v()
    }

    /// Gets the program counter
    /// # Examples
    /// ```rust
    /// # use cricket::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn pc(&self) -> Adr {
        self.state.pc()
    }

    /// Gets the I register
    /// # Examples
    /// ```rust
    /// # use cricket::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0, cpu.i());
    /// ```
    pub fn i(&self) -> Adr {
        self.state.i()
    }

    /// Gets the value in the Delay Timer register
    pub fn delay(&self) -> u8 {
        self.state.delay()
    }

    /// Gets the value in the Sound Timer register
    pub fn sound(&self) -> u8 {
        self.state.sound()
    }

    /// Gets the number of instructions the CPU has executed
    /// # Examples
    /// ```rust
    /// # use cricket::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x0, cpu.cycle());
    /// ```
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Resets the machine: registers, stack, timers, status, and cycle
    /// count return to power-on values. Memory, the loaded program, and
    /// [Flags] are untouched.
    /// # Examples
    /// ```rust
    /// # use cricket::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_rom(&[0x12, 0x00]).unwrap();
    /// let mut screen = FrameBuffer::new();
    /// cpu.step(&mut screen).unwrap();
    /// assert_eq!(1, cpu.cycle());
    /// cpu.reset();
    /// assert_eq!((0x200, 0), (cpu.pc(), cpu.cycle()));
    /// ```
    pub fn reset(&mut self) {
        self.state.reset();
        self.status = Status::Running;
        self.cycle = 0;
    }

    /// Fetches, decodes, and executes a single instruction against the
    /// provided screen, regardless of [Flags::pause].
    ///
    /// Does nothing unless the status is [Status::Running]: a machine
    /// waiting on a key has no instruction to execute, and a halted one
    /// never will. Timers, the keypad, and host events are the business of
    /// [CPU::tick]; this is the bare execution engine and the unit-test
    /// entry point.
    ///
    /// On a fatal fault the status becomes [Status::Halted] and the error
    /// is returned.
    /// # Examples
    /// ```rust
    /// # use cricket::*;
    /// let mut cpu = CPU::default();
    /// let mut screen = FrameBuffer::new();
    /// cpu.load_rom(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jmp 0x202 (pc)
    /// ]).unwrap();
    /// cpu.step(&mut screen).unwrap();
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycle());
    /// ```
    pub fn step(&mut self, screen: &mut impl Screen) -> Result<&mut Self> {
        if self.status != Status::Running {
            return Ok(self);
        }
        match self.advance(screen) {
            Ok(()) => Ok(self),
            Err(error) => {
                self.status = Status::Halted;
                Err(error)
            }
        }
    }

    /// Runs one full driver tick: polls host events, refreshes the keypad
    /// snapshot, ticks the timers when the [crate::host::Clock] says so,
    /// then executes at most one instruction.
    ///
    /// A quit event halts before anything executes, so no partial work is
    /// visible past it. While paused, nothing advances, timers included.
    /// While waiting for a key, the tick that delivers one stores it and
    /// returns; execution resumes on the next tick.
    pub fn tick<H: Host>(&mut self, host: &mut H) -> Result<&mut Self> {
        let events = host.poll_events();
        if events.quit {
            self.status = Status::Halted;
            return Ok(self);
        }
        if self.flags.pause || self.status == Status::Halted {
            return Ok(self);
        }
        self.state.sync_keys(&*host);
        if host.should_tick_timer() {
            self.state.tick_timers();
        }
        if let Status::WaitingForKey { x } = self.status {
            if let Some(key) = events.last_key_pressed {
                self.state.v[x] = key & 0xf;
                self.status = Status::Running;
            }
            return Ok(self);
        }
        self.step(host)
    }

    /// Runs [Flags::ipf] ticks: one rendered frame's worth of work.
    /// Stops early if the machine halts.
    pub fn run_frame<H: Host>(&mut self, host: &mut H) -> Result<&mut Self> {
        for _ in 0..self.flags.ipf.max(1) {
            self.tick(host)?;
            if self.status == Status::Halted {
                break;
            }
        }
        Ok(self)
    }

    /// Runs until the machine halts, by host quit or by fault.
    /// Headless drivers only; the front end paces its own frame loop.
    pub fn run<H: Host>(&mut self, host: &mut H) -> Result<&mut Self> {
        while self.status != Status::Halted {
            self.run_frame(host)?;
        }
        Ok(self)
    }

    /// Dumps the current state of all CPU registers, and the cycle count,
    /// to stderr
    /// # Examples
    /// ```rust
    /// # use cricket::*;
    /// let cpu = CPU::default();
    /// cpu.dump();
    /// ```
    /// outputs
    /// ```text
    /// PC: 0200, SP:    0, I: 0000
    /// v0: 00 v1: 00 v2: 00 v3: 00
    /// v4: 00 v5: 00 v6: 00 v7: 00
    /// v8: 00 v9: 00 vA: 00 vB: 00
    /// vC: 00 vD: 00 vE: 00 vF: 00
    /// DLY: 0, SND: 0, CYC:      0
    /// status: Running
    /// ```
    pub fn dump(&self) {
        std::eprintln!(
            "PC: {:04x}, SP: {:4}, I: {:04x}\n{}DLY: {}, SND: {}, CYC: {:6}\nstatus: {:?}",
            self.state.pc,
            self.state.stack.len(),
            self.state.i,
            self.state
                .v
                .into_iter()
                .enumerate()
                .map(|(i, gpr)| {
                    format!(
                        "v{i:X}: {gpr:02x} {}",
                        match i % 4 {
                            3 => "\n",
                            _ => "",
                        }
                    )
                })
                .collect::<String>(),
            self.state.delay,
            self.state.sound,
            self.cycle,
            self.status,
        );
    }
}

// private interface
impl CPU {
    /// Reads the big-endian word at PC and advances PC past it
    fn fetch(&mut self) -> Result<Word> {
        let pc = self.state.pc;
        match self.state.mem.get(pc as usize..pc as usize + 2) {
            Some(&[hi, lo]) => {
                self.state.pc = pc.wrapping_add(2);
                Ok(Word(u16::from_be_bytes([hi, lo])))
            }
            _ => Err(Error::MemoryOutOfRange {
                addr: pc as usize,
                pc,
            }),
        }
    }

    /// One fetch/decode/execute, faults unwrapped
    fn advance(&mut self, screen: &mut impl Screen) -> Result<()> {
        let pc = self.state.pc;
        let word = self.fetch()?;
        self.cycle += 1;

        // Print opcode disassembly:
        if self.flags.debug {
            std::println!(
                "{:3} {:03x}: {:<36}",
                self.cycle.bright_black(),
                pc,
                self.disassembler.once(word.raw())
            );
        }

        match Insn::decode(word) {
            Some(insn) => self.execute(insn, screen),
            None => Err(Error::InvalidOpcode {
                pc,
                word: word.raw(),
            }),
        }
    }
}

impl Debug for CPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPU")
            .field("flags", &self.flags)
            .field("status", &self.status)
            .field("state", &self.state)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl Default for CPU {
    /// Constructs a new CPU with sane defaults
    ///
    /// | value  | default | description
    /// |--------|---------|------------
    /// | pc     |`0x0200` | Start of the program region.
    /// | font   |`0x0050` | Location of the builtin character set.
    /// | ipf    |`12`     | Instructions per 60 Hz frame, ~720/s.
    ///
    /// # Examples
    /// ```rust
    /// use cricket::*;
    /// let mut cpu = CPU::default();
    /// ```
    fn default() -> Self {
        CPU::new(Flags::default())
    }
}
