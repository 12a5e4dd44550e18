// This code is licensed under MIT license (see LICENSE for details)

//! Contains the definition of a Chip-8 [Insn], and the decoder that turns
//! raw words into them

pub mod disassembler;

use std::fmt::Display;

/// A raw 16-bit instruction word, split into its operand fields
///
/// Splitting is total: every word produces a structurally valid [Word].
/// Whether the fields name a real instruction is [Insn::decode]'s concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word(pub u16);

impl Word {
    /// The opcode family: the top nibble
    pub const fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }
    /// Everything but the family: the low 12 bits
    pub const fn operands(self) -> u16 {
        self.0 & 0x0fff
    }
    /// The raw word
    pub const fn raw(self) -> u16 {
        self.0
    }
    /// First register field: bits 8..12
    pub const fn x(self) -> usize {
        (self.0 >> 8 & 0xf) as usize
    }
    /// Second register field: bits 4..8
    pub const fn y(self) -> usize {
        (self.0 >> 4 & 0xf) as usize
    }
    /// Immediate nibble: bits 0..4
    pub const fn n(self) -> u8 {
        (self.0 & 0xf) as u8
    }
    /// Immediate byte: bits 0..8
    pub const fn byte(self) -> u8 {
        self.0 as u8
    }
    /// Immediate address: bits 0..12
    pub const fn addr(self) -> u16 {
        self.0 & 0x0fff
    }
}

impl From<u16> for Word {
    fn from(word: u16) -> Self {
        Word(word)
    }
}

#[allow(non_camel_case_types, non_snake_case, missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// One decoded Chip-8 instruction
pub enum Insn {
    /// | 0aaa | Machine-language routine call. Historically ignored;
    /// |      | executes as a no-op here (00e0/00ee take precedence)
    sys { A: u16 },
    /// | 00e0 | Clear screen memory to 0s
    cls,
    /// | 00ee | Return from subroutine
    ret,
    /// | 1aaa | Jumps to an absolute address
    jmp { A: u16 },
    /// | 2aaa | Pushes pc onto the stack, then jumps to a
    call { A: u16 },
    /// | 3xbb | Skips next instruction if register X == b
    seb { B: u8, x: usize },
    /// | 4xbb | Skips next instruction if register X != b
    sneb { B: u8, x: usize },
    /// | 5xy0 | Skip next instruction if vX == vY
    se { y: usize, x: usize },
    /// | 6xbb | Loads immediate byte b into register vX
    movb { B: u8, x: usize },
    /// | 7xbb | Adds immediate byte b to register vX (no flag)
    addb { B: u8, x: usize },
    /// | 8xy0 | Loads the value of y into x
    mov { x: usize, y: usize },
    /// | 8xy1 | Performs bitwise or of vX and vY, and stores the result in vX
    or { y: usize, x: usize },
    /// | 8xy2 | Performs bitwise and of vX and vY, and stores the result in vX
    and { y: usize, x: usize },
    /// | 8xy3 | Performs bitwise xor of vX and vY, and stores the result in vX
    xor { y: usize, x: usize },
    /// | 8xy4 | Performs addition of vX and vY, and stores the result in vX, carry in vF
    add { y: usize, x: usize },
    /// | 8xy5 | Performs subtraction of vX and vY, and stores the result in vX, !borrow in vF
    sub { y: usize, x: usize },
    /// | 8xy6 | Performs bitwise right shift of vX, shifted-out bit in vF
    shr { y: usize, x: usize },
    /// | 8xy7 | Performs subtraction of vY and vX, and stores the result in vX, !borrow in vF
    bsub { y: usize, x: usize },
    /// | 8xyE | Performs bitwise left shift of vX, shifted-out bit in vF
    shl { y: usize, x: usize },
    /// | 9xy0 | Skip next instruction if vX != vY
    sne { y: usize, x: usize },
    /// | Aaaa | Load address #a into register I
    movI { A: u16 },
    /// | Baaa | Jump to &adr + v0
    jmpr { A: u16 },
    /// | Cxbb | Stores a random number & the provided byte into vX
    rand { B: u8, x: usize },
    /// | Dxyn | Draws n-byte sprite to the screen at coordinates (vX, vY)
    draw { y: usize, x: usize, n: u8 },
    /// | eX9e | Skip next instruction if key == vX
    sek { x: usize },
    /// | eXa1 | Skip next instruction if key != vX
    snek { x: usize },
    /// | fX07 | Set vX to value in delay timer
    getdt { x: usize },
    /// | fX0a | Wait for input, store key in vX
    waitk { x: usize },
    /// | fX15 | Set delay timer to the value in vX
    setdt { x: usize },
    /// | fX18 | Set sound timer to the value in vX
    movst { x: usize },
    /// | fX1e | Add vX to I
    addI { x: usize },
    /// | fX29 | Load sprite for character vX into I
    font { x: usize },
    /// | fX33 | BCD convert vX into I[0..3]
    bcd { x: usize },
    /// | fX55 | DMA Stor from registers 0..=X to I
    dmao { x: usize },
    /// | fX65 | DMA Load from I to registers 0..=X
    dmai { x: usize },
}

impl Insn {
    /// Decodes a word into its instruction, or [None] if the word's family
    /// or sub-opcode names nothing.
    ///
    /// The two full-word matches (00e0, 00ee) come before family dispatch;
    /// any other family-0 word is a legal `sys` no-op.
    /// # Examples
    /// ```rust
    ///# use cricket::*;
    ///     assert_eq!(Some(Insn::movb { B: 0x05, x: 0 }), Insn::decode(Word(0x6005)));
    ///     assert_eq!(Some(Insn::sys { A: 0x123 }), Insn::decode(Word(0x0123)));
    ///     assert_eq!(None, Insn::decode(Word(0x800f)));
    /// ```
    #[allow(non_snake_case)]
    pub fn decode(word: Word) -> Option<Insn> {
        use Insn::*;
        let (x, y) = (word.x(), word.y());
        let (A, B, n) = (word.addr(), word.byte(), word.n());
        Some(match (word.family(), word.operands()) {
            (0x0, 0x0e0) => cls,
            (0x0, 0x0ee) => ret,
            (0x0, _) => sys { A },
            (0x1, _) => jmp { A },
            (0x2, _) => call { A },
            (0x3, _) => seb { B, x },
            (0x4, _) => sneb { B, x },
            (0x5, _) if n == 0 => se { y, x },
            (0x6, _) => movb { B, x },
            (0x7, _) => addb { B, x },
            (0x8, _) => match n {
                0x0 => mov { x, y },
                0x1 => or { y, x },
                0x2 => and { y, x },
                0x3 => xor { y, x },
                0x4 => add { y, x },
                0x5 => sub { y, x },
                0x6 => shr { y, x },
                0x7 => bsub { y, x },
                0xe => shl { y, x },
                _ => return None,
            },
            (0x9, _) if n == 0 => sne { y, x },
            (0xa, _) => movI { A },
            (0xb, _) => jmpr { A },
            (0xc, _) => rand { B, x },
            (0xd, _) => draw { y, x, n },
            (0xe, _) => match B {
                0x9e => sek { x },
                0xa1 => snek { x },
                _ => return None,
            },
            (0xf, _) => match B {
                0x07 => getdt { x },
                0x0a => waitk { x },
                0x15 => setdt { x },
                0x18 => movst { x },
                0x1e => addI { x },
                0x29 => font { x },
                0x33 => bcd { x },
                0x55 => dmao { x },
                0x65 => dmai { x },
                _ => return None,
            },
            _ => return None,
        })
    }

    /// Re-encodes the instruction into its word.
    /// Inverse of [Insn::decode] for every decodable word.
    /// # Examples
    /// ```rust
    ///# use cricket::*;
    ///     let insn = Insn::decode(Word(0x7a42)).unwrap();
    ///     assert_eq!(0x7a42, insn.encode());
    /// ```
    #[rustfmt::skip]
    pub fn encode(&self) -> u16 {
        use Insn::*;
        // operand field placers
        const fn vx(x: usize) -> u16 { (x as u16 & 0xf) << 8 }
        const fn vxy(x: usize, y: usize) -> u16 { vx(x) | (y as u16 & 0xf) << 4 }
        match *self {
            sys { A }           => A & 0xfff,
            cls                 => 0x00e0,
            ret                 => 0x00ee,
            jmp { A }           => 0x1000 | A & 0xfff,
            call { A }          => 0x2000 | A & 0xfff,
            seb { B, x }        => 0x3000 | vx(x) | B as u16,
            sneb { B, x }       => 0x4000 | vx(x) | B as u16,
            se { y, x }         => 0x5000 | vxy(x, y),
            movb { B, x }       => 0x6000 | vx(x) | B as u16,
            addb { B, x }       => 0x7000 | vx(x) | B as u16,
            mov { x, y }        => 0x8000 | vxy(x, y),
            or { y, x }         => 0x8001 | vxy(x, y),
            and { y, x }        => 0x8002 | vxy(x, y),
            xor { y, x }        => 0x8003 | vxy(x, y),
            add { y, x }        => 0x8004 | vxy(x, y),
            sub { y, x }        => 0x8005 | vxy(x, y),
            shr { y, x }        => 0x8006 | vxy(x, y),
            bsub { y, x }       => 0x8007 | vxy(x, y),
            shl { y, x }        => 0x800e | vxy(x, y),
            sne { y, x }        => 0x9000 | vxy(x, y),
            movI { A }          => 0xa000 | A & 0xfff,
            jmpr { A }          => 0xb000 | A & 0xfff,
            rand { B, x }       => 0xc000 | vx(x) | B as u16,
            draw { y, x, n }    => 0xd000 | vxy(x, y) | (n & 0xf) as u16,
            sek { x }           => 0xe09e | vx(x),
            snek { x }          => 0xe0a1 | vx(x),
            getdt { x }         => 0xf007 | vx(x),
            waitk { x }         => 0xf00a | vx(x),
            setdt { x }         => 0xf015 | vx(x),
            movst { x }         => 0xf018 | vx(x),
            addI { x }          => 0xf01e | vx(x),
            font { x }          => 0xf029 | vx(x),
            bcd { x }           => 0xf033 | vx(x),
            dmao { x }          => 0xf055 | vx(x),
            dmai { x }          => 0xf065 | vx(x),
        }
    }
}

impl Display for Insn {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insn::sys { A }         => write!(f, "sys    {A:03x}"),
            Insn::cls               => write!(f, "cls    "),
            Insn::ret               => write!(f, "ret    "),
            Insn::jmp { A }         => write!(f, "jmp    {A:03x}"),
            Insn::call { A }        => write!(f, "call   {A:03x}"),
            Insn::seb { B, x }      => write!(f, "se     #{B:02x}, v{x:X}"),
            Insn::sneb { B, x }     => write!(f, "sne    #{B:02x}, v{x:X}"),
            Insn::se { y, x }       => write!(f, "se     v{y:X}, v{x:X}"),
            Insn::movb { B, x }     => write!(f, "mov    #{B:02x}, v{x:X}"),
            Insn::addb { B, x }     => write!(f, "add    #{B:02x}, v{x:X}"),
            Insn::mov { x, y }      => write!(f, "mov    v{y:X}, v{x:X}"),
            Insn::or { y, x }       => write!(f, "or     v{y:X}, v{x:X}"),
            Insn::and { y, x }      => write!(f, "and    v{y:X}, v{x:X}"),
            Insn::xor { y, x }      => write!(f, "xor    v{y:X}, v{x:X}"),
            Insn::add { y, x }      => write!(f, "add    v{y:X}, v{x:X}"),
            Insn::sub { y, x }      => write!(f, "sub    v{y:X}, v{x:X}"),
            Insn::shr { y, x }      => write!(f, "shr    v{y:X}, v{x:X}"),
            Insn::bsub { y, x }     => write!(f, "bsub   v{y:X}, v{x:X}"),
            Insn::shl { y, x }      => write!(f, "shl    v{y:X}, v{x:X}"),
            Insn::sne { y, x }      => write!(f, "sne    v{y:X}, v{x:X}"),
            Insn::movI { A }        => write!(f, "mov    ${A:03x}, I"),
            Insn::jmpr { A }        => write!(f, "jmp    ${A:03x}+v0"),
            Insn::rand { B, x }     => write!(f, "rand   #{B:02x}, v{x:X}"),
            Insn::draw { y, x, n }  => write!(f, "draw   #{n:x}, v{x:X}, v{y:X}"),
            Insn::sek { x }         => write!(f, "sek    v{x:X}"),
            Insn::snek { x }        => write!(f, "snek   v{x:X}"),
            Insn::getdt { x }       => write!(f, "mov    DT, v{x:X}"),
            Insn::waitk { x }       => write!(f, "waitk  v{x:X}"),
            Insn::setdt { x }       => write!(f, "mov    v{x:X}, DT"),
            Insn::movst { x }       => write!(f, "mov    v{x:X}, ST"),
            Insn::addI { x }        => write!(f, "add    v{x:X}, I"),
            Insn::font { x }        => write!(f, "font   v{x:X}, I"),
            Insn::bcd { x }         => write!(f, "bcd    v{x:X}, &I"),
            Insn::dmao { x }        => write!(f, "dmao   v{x:X}"),
            Insn::dmai { x }        => write!(f, "dmai   v{x:X}"),
        }
    }
}
