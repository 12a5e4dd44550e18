// This code is licensed under MIT license (see LICENSE for details)

//! Main memory of the virtual machine
//!
//! 4096 bytes, allocated once at construction and never resized. The low 512
//! bytes are reserved for the interpreter; the hexadecimal character set
//! lives at [FONT_START], and programs load at [PROGRAM_START].

use crate::error::{Error, Result};
use std::{
    fmt::{Debug, Formatter},
    slice::SliceIndex,
};

/// Total addressable memory, in bytes
pub const MEM_SIZE: usize = 4096;

/// Address where loaded programs begin
pub const PROGRAM_START: u16 = 0x200;

/// Address of the builtin hexadecimal character set
pub const FONT_START: u16 = 0x050;

/// Height of one character-set glyph, in bytes
pub const FONT_HEIGHT: u16 = 5;

/// The builtin character set: glyphs for digits 0..=F, 8x5 px, left-aligned
const FONT: [u8; 80] = [
    0xf0, 0x90, 0x90, 0x90, 0xf0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xf0, 0x10, 0xf0, 0x80, 0xf0, // 2
    0xf0, 0x10, 0xf0, 0x10, 0xf0, // 3
    0x90, 0x90, 0xf0, 0x10, 0x10, // 4
    0xf0, 0x80, 0xf0, 0x10, 0xf0, // 5
    0xf0, 0x80, 0xf0, 0x90, 0xf0, // 6
    0xf0, 0x10, 0x20, 0x40, 0x40, // 7
    0xf0, 0x90, 0xf0, 0x90, 0xf0, // 8
    0xf0, 0x90, 0xf0, 0x10, 0xf0, // 9
    0xf0, 0x90, 0xf0, 0x90, 0x90, // A
    0xe0, 0x90, 0xe0, 0x90, 0xe0, // B
    0xf0, 0x80, 0x80, 0x80, 0xf0, // C
    0xe0, 0x90, 0x90, 0x90, 0xe0, // D
    0xf0, 0x80, 0xf0, 0x80, 0xf0, // E
    0xf0, 0x80, 0xf0, 0x80, 0x80, // F
];

/// The machine's 4096 bytes of memory
///
/// All access is bounds-checked: the slice accessors return [None] past the
/// end of memory, and callers turn that into [Error::MemoryOutOfRange] with
/// the faulting address attached. Nothing here wraps silently.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mem {
    memory: Box<[u8]>,
}

impl Mem {
    /// Constructs memory with the character set resident and all else zeroed
    /// # Examples
    /// ```rust
    ///# use cricket::*;
    ///     let mem = Mem::new();
    ///     assert_eq!(MEM_SIZE, mem.len());
    ///     // glyph for 0 starts with a full top row
    ///     assert_eq!(Some(&0xf0), mem.get(FONT_START as usize));
    /// ```
    pub fn new() -> Self {
        let mut memory = vec![0; MEM_SIZE].into_boxed_slice();
        let font = FONT_START as usize;
        memory[font..font + FONT.len()].copy_from_slice(&FONT);
        Mem { memory }
    }

    /// Gets the length of the backing memory, which is always [MEM_SIZE]
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns true if the backing memory contains no elements (it never does)
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Gets a byte or slice of memory
    /// # Examples
    /// ```rust
    ///# use cricket::*;
    ///     let mem = Mem::new();
    ///     assert!(mem.get(0x200..0x204).is_some());
    ///     assert!(mem.get(0xfff..0x1001).is_none());
    /// ```
    #[inline(always)]
    pub fn get<I>(&self, index: I) -> Option<&<I as SliceIndex<[u8]>>::Output>
    where
        I: SliceIndex<[u8]>,
    {
        self.memory.get(index)
    }

    /// Gets a mutable byte or slice of memory
    #[inline(always)]
    pub fn get_mut<I>(&mut self, index: I) -> Option<&mut <I as SliceIndex<[u8]>>::Output>
    where
        I: SliceIndex<[u8]>,
    {
        self.memory.get_mut(index)
    }

    /// Address of the character-set glyph for a hex digit.
    /// Only the low nibble of `digit` selects the glyph.
    /// # Examples
    /// ```rust
    ///# use cricket::*;
    ///     assert_eq!(FONT_START, Mem::font_glyph(0x0));
    ///     assert_eq!(FONT_START + 5 * 0xf, Mem::font_glyph(0xf));
    ///     assert_eq!(Mem::font_glyph(0x3), Mem::font_glyph(0x13));
    /// ```
    pub const fn font_glyph(digit: u8) -> u16 {
        FONT_START + FONT_HEIGHT * (digit & 0xf) as u16
    }

    /// Copies a program image into memory at [PROGRAM_START], zeroing the
    /// rest of the program region first.
    ///
    /// Returns [Error::RomTooLarge] if the image exceeds the program region.
    /// # Examples
    /// ```rust
    ///# use cricket::*;
    ///# fn main() -> Result<()> {
    ///     let mut mem = Mem::new();
    ///     mem.load_rom(&[0x60, 0x05])?;
    ///     assert_eq!(Some([0x60, 0x05].as_slice()), mem.get(0x200..0x202));
    ///     assert!(mem.load_rom(&[0; 3585]).is_err());
    ///#    Ok(())
    ///# }
    /// ```
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<&mut Self> {
        let start = PROGRAM_START as usize;
        let max = MEM_SIZE - start;
        if rom.len() > max {
            return Err(Error::RomTooLarge {
                len: rom.len(),
                max,
            });
        }
        self.memory[start..].fill(0);
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        Ok(self)
    }
}

impl Default for Mem {
    fn default() -> Self {
        Mem::new()
    }
}

impl Debug for Mem {
    /// The full array is noise in test output, so Debug summarizes
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mem {{ {} bytes }}", self.len())
    }
}
