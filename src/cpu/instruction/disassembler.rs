// This code is licensed under MIT license (see LICENSE for details)

//! A disassembler for Chip-8 opcodes, used by the debug trace

use super::{Insn, Word};
use owo_colors::{OwoColorize, Style};

/// Disassembles Chip-8 instructions
pub trait Disassembler {
    /// Disassemble a single instruction word
    fn once(&self, word: u16) -> String;
}

/// Disassembles Chip-8 instructions, printing them in the provided [owo_colors::Style]s
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dis {
    /// Styles words that decode to nothing
    pub invalid: Style,
    /// Styles valid instructions
    pub normal: Style,
}

impl Default for Dis {
    fn default() -> Self {
        Self {
            invalid: Style::new().bold().red(),
            normal: Style::new().green(),
        }
    }
}

impl Disassembler for Dis {
    fn once(&self, word: u16) -> String {
        match Insn::decode(Word(word)) {
            Some(insn) => format!("{}", insn.style(self.normal)),
            None => format!("{}", format_args!("inval  {word:04x}").style(self.invalid)),
        }
    }
}
