// This code is licensed under MIT license (see LICENSE for details)

//! Contains implementations for each Chip-8 [Insn]

use super::*;
use crate::{mem::Mem, state::STACK_DEPTH};
use rand::random;

impl CPU {
    /// Executes a single [Insn], routing each variant to its handler.
    /// The match is exhaustive: adding a variant without a handler does not
    /// compile.
    #[rustfmt::skip]
    #[inline(always)]
    pub(super) fn execute(&mut self, insn: Insn, screen: &mut impl Screen) -> Result<()> {
        match insn {
            Insn::sys   {       A } => self.sys(A),
            Insn::cls               => self.clear_screen(screen),
            Insn::ret               => self.ret()?,
            Insn::jmp   {       A } => self.jump(A),
            Insn::call  {       A } => self.call(A)?,
            Insn::seb   {    x, B } => self.skip_equals_immediate(x, B),
            Insn::sneb  {    x, B } => self.skip_not_equals_immediate(x, B),
            Insn::se    { y, x    } => self.skip_equals(x, y),
            Insn::movb  {    x, B } => self.load_immediate(x, B),
            Insn::addb  {    x, B } => self.add_immediate(x, B),
            Insn::mov   { y, x    } => self.load(x, y),
            Insn::or    { y, x    } => self.or(x, y),
            Insn::and   { y, x    } => self.and(x, y),
            Insn::xor   { y, x    } => self.xor(x, y),
            Insn::add   { y, x    } => self.add(x, y),
            Insn::sub   { y, x    } => self.sub(x, y),
            Insn::shr   { y, x    } => self.shift_right(x, y),
            Insn::bsub  { y, x    } => self.backwards_sub(x, y),
            Insn::shl   { y, x    } => self.shift_left(x, y),
            Insn::sne   { y, x    } => self.skip_not_equals(x, y),
            Insn::movI  {       A } => self.load_i_immediate(A),
            Insn::jmpr  {       A } => self.jump_indexed(A),
            Insn::rand  {    x, B } => self.rand(x, B),
            Insn::draw  { y, x, n } => self.draw(x, y, n, screen)?,
            Insn::sek   {    x    } => self.skip_key_equals(x),
            Insn::snek  {    x    } => self.skip_key_not_equals(x),
            Insn::getdt {    x    } => self.load_delay_timer(x),
            Insn::waitk {    x    } => self.wait_for_key(x),
            Insn::setdt {    x    } => self.store_delay_timer(x),
            Insn::movst {    x    } => self.store_sound_timer(x),
            Insn::addI  {    x    } => self.add_i(x),
            Insn::font  {    x    } => self.load_sprite(x),
            Insn::bcd   {    x    } => self.bcd_convert(x)?,
            Insn::dmao  {    x    } => self.store_dma(x)?,
            Insn::dmai  {    x    } => self.load_dma(x)?,
        }
        Ok(())
    }

    /// Builds the out-of-range fault for a data access by the current
    /// instruction. PC has already advanced past it, so the faulting
    /// instruction sits at pc - 2.
    fn mem_fault(&self, addr: usize) -> Error {
        Error::MemoryOutOfRange {
            addr,
            pc: self.state.pc.wrapping_sub(2),
        }
    }
}

/// |`0aaa`| Issues a "System call" (ML routine)
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`00e0`| Clear screen memory to all 0       |
/// |`00ee`| Return from subroutine             |
/// |`0aaa`| Anything else: historical no-op    |
impl CPU {
    /// |`0aaa`| Machine-language call. No machine to run it, so this does
    /// nothing; old programs begin with one and must keep working.
    #[inline(always)]
    pub(super) fn sys(&mut self, _a: Adr) {}

    /// |`00e0`| Clears the screen memory to 0
    #[inline(always)]
    pub(super) fn clear_screen(&mut self, screen: &mut impl Screen) {
        screen.clear();
    }

    /// |`00ee`| Returns from subroutine, or faults if the stack is empty
    #[inline(always)]
    pub(super) fn ret(&mut self) -> Result<()> {
        match self.state.stack.pop() {
            Some(adr) => {
                self.state.pc = adr;
                Ok(())
            }
            None => Err(Error::StackUnderflow {
                pc: self.state.pc.wrapping_sub(2),
                word: 0x00ee,
            }),
        }
    }
}

/// |`1aaa`| Sets pc to an absolute address
impl CPU {
    /// |`1aaa`| Sets the program counter to an absolute address.
    /// A jump to itself is a legal idle loop, not a fault; the machine
    /// spins there until the host quits.
    #[inline(always)]
    pub(super) fn jump(&mut self, a: Adr) {
        self.state.pc = a;
    }
}

/// |`2aaa`| Pushes pc onto the stack, then jumps to a
impl CPU {
    /// |`2aaa`| Pushes pc onto the stack, then jumps to a.
    /// The sixteenth nested call fits; the seventeenth faults before
    /// mutating anything.
    #[inline(always)]
    pub(super) fn call(&mut self, a: Adr) -> Result<()> {
        if self.state.stack.len() >= STACK_DEPTH {
            return Err(Error::StackOverflow {
                pc: self.state.pc.wrapping_sub(2),
                word: 0x2000 | a & 0xfff,
            });
        }
        self.state.stack.push(self.state.pc);
        self.state.pc = a;
        Ok(())
    }
}

/// |`3xbb`| Skips next instruction if register X == b
impl CPU {
    /// |`3xbb`| Skips the next instruction if register X == b
    #[inline(always)]
    pub(super) fn skip_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.state.v[x] == b {
            self.state.pc = self.state.pc.wrapping_add(2);
        }
    }
}

/// |`4xbb`| Skips next instruction if register X != b
impl CPU {
    /// |`4xbb`| Skips the next instruction if register X != b
    #[inline(always)]
    pub(super) fn skip_not_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.state.v[x] != b {
            self.state.pc = self.state.pc.wrapping_add(2);
        }
    }
}

/// |`5xyn`| Performs a register-register comparison
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`5XY0`| Skip next instruction if vX == vY  |
impl CPU {
    /// |`5xy0`| Skips the next instruction if register X == register Y
    #[inline(always)]
    pub(super) fn skip_equals(&mut self, x: Reg, y: Reg) {
        if self.state.v[x] == self.state.v[y] {
            self.state.pc = self.state.pc.wrapping_add(2);
        }
    }
}

/// |`6xbb`| Loads immediate byte b into register vX
impl CPU {
    /// |`6xbb`| Loads immediate byte b into register vX
    #[inline(always)]
    pub(super) fn load_immediate(&mut self, x: Reg, b: u8) {
        self.state.v[x] = b;
    }
}

/// |`7xbb`| Adds immediate byte b to register vX
impl CPU {
    /// |`7xbb`| Adds immediate byte b to register vX, wrapping.
    /// Unlike `8xy4`, this leaves vF alone.
    #[inline(always)]
    pub(super) fn add_immediate(&mut self, x: Reg, b: u8) {
        self.state.v[x] = self.state.v[x].wrapping_add(b);
    }
}

/// |`8xyn`| Performs ALU operation
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`8xy0`| X = Y                              |
/// |`8xy1`| X = X | Y                          |
/// |`8xy2`| X = X & Y                          |
/// |`8xy3`| X = X ^ Y                          |
/// |`8xy4`| X = X + Y; Set vF=carry            |
/// |`8xy5`| X = X - Y; Set vF=!borrow          |
/// |`8xy6`| X = X >> 1; Set vF=shifted-out bit |
/// |`8xy7`| X = Y - X; Set vF=!borrow          |
/// |`8xyE`| X = X << 1; Set vF=shifted-out bit |
impl CPU {
    /// |`8xy0`| Loads the value of y into x
    #[inline(always)]
    pub(super) fn load(&mut self, x: Reg, y: Reg) {
        self.state.v[x] = self.state.v[y];
    }
    /// |`8xy1`| Performs bitwise or of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn or(&mut self, x: Reg, y: Reg) {
        self.state.v[x] |= self.state.v[y];
    }
    /// |`8xy2`| Performs bitwise and of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn and(&mut self, x: Reg, y: Reg) {
        self.state.v[x] &= self.state.v[y];
    }
    /// |`8xy3`| Performs bitwise xor of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn xor(&mut self, x: Reg, y: Reg) {
        self.state.v[x] ^= self.state.v[y];
    }
    /// |`8xy4`| Performs addition of vX and vY, and stores the result in vX,
    /// carry in vF
    #[inline(always)]
    pub(super) fn add(&mut self, x: Reg, y: Reg) {
        let carry;
        (self.state.v[x], carry) = self.state.v[x].overflowing_add(self.state.v[y]);
        self.state.v[0xf] = carry.into();
    }
    /// |`8xy5`| Performs subtraction of vX and vY, and stores the result in
    /// vX. vF is 1 when there was *no* borrow, so vX == vY leaves vF = 1.
    #[inline(always)]
    pub(super) fn sub(&mut self, x: Reg, y: Reg) {
        let borrow;
        (self.state.v[x], borrow) = self.state.v[x].overflowing_sub(self.state.v[y]);
        self.state.v[0xf] = (!borrow).into();
    }
    /// |`8xy6`| Performs bitwise right shift of vX, shifted-out bit in vF
    #[inline(always)]
    pub(super) fn shift_right(&mut self, x: Reg, _y: Reg) {
        let shift_out = self.state.v[x] & 1;
        self.state.v[x] >>= 1;
        self.state.v[0xf] = shift_out;
    }
    /// |`8xy7`| Performs subtraction of vY and vX, and stores the result in
    /// vX, !borrow in vF
    #[inline(always)]
    pub(super) fn backwards_sub(&mut self, x: Reg, y: Reg) {
        let borrow;
        (self.state.v[x], borrow) = self.state.v[y].overflowing_sub(self.state.v[x]);
        self.state.v[0xf] = (!borrow).into();
    }
    /// |`8xyE`| Performs bitwise left shift of vX, shifted-out bit in vF
    #[inline(always)]
    pub(super) fn shift_left(&mut self, x: Reg, _y: Reg) {
        let shift_out = self.state.v[x] >> 7;
        self.state.v[x] <<= 1;
        self.state.v[0xf] = shift_out;
    }
}

/// |`9xyn`| Performs a register-register comparison
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`9XY0`| Skip next instruction if vX != vY  |
impl CPU {
    /// |`9xy0`| Skips the next instruction if register X != register Y
    #[inline(always)]
    pub(super) fn skip_not_equals(&mut self, x: Reg, y: Reg) {
        if self.state.v[x] != self.state.v[y] {
            self.state.pc = self.state.pc.wrapping_add(2);
        }
    }
}

/// |`Aaaa`| Load address #a into register I
impl CPU {
    /// |`Aadr`| Load address #adr into register I
    #[inline(always)]
    pub(super) fn load_i_immediate(&mut self, a: Adr) {
        self.state.i = a;
    }
}

/// |`Baaa`| Jump to &adr + v0
impl CPU {
    /// |`Badr`| Jump to &adr + v0, wrapping in the 12-bit address space
    #[inline(always)]
    pub(super) fn jump_indexed(&mut self, a: Adr) {
        self.state.pc = a.wrapping_add(self.state.v[0] as Adr) & 0xfff;
    }
}

/// |`Cxbb`| Stores a random number & the provided byte into vX
impl CPU {
    /// |`Cxbb`| Stores a random number & the provided byte into vX
    #[inline(always)]
    pub(super) fn rand(&mut self, x: Reg, b: u8) {
        self.state.v[x] = random::<u8>() & b;
    }
}

/// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
impl CPU {
    /// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY).
    ///
    /// The sprite is read from memory at I; reading past the end of memory
    /// faults without touching the screen. The screen handles coordinate
    /// wrap and reports collision, which lands in vF.
    #[inline(always)]
    pub(super) fn draw(&mut self, x: Reg, y: Reg, n: Nib, screen: &mut impl Screen) -> Result<()> {
        let i = self.state.i as usize;
        match self.state.mem.get(i..i + n as usize) {
            Some(sprite) => {
                self.state.v[0xf] = screen
                    .blit(self.state.v[x], self.state.v[y], sprite)
                    .into();
                Ok(())
            }
            None => Err(self.mem_fault(i + n as usize - 1)),
        }
    }
}

/// |`Exbb`| Skips instruction on value of keypress
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`eX9e`| Skip next instruction if key == vX |
/// |`eXa1`| Skip next instruction if key != vX |
impl CPU {
    /// |`Ex9E`| Skip next instruction if key vX is held
    #[inline(always)]
    pub(super) fn skip_key_equals(&mut self, x: Reg) {
        if self.state.is_key_down(self.state.v[x]) {
            self.state.pc = self.state.pc.wrapping_add(2);
        }
    }
    /// |`ExA1`| Skip next instruction if key vX is not held
    #[inline(always)]
    pub(super) fn skip_key_not_equals(&mut self, x: Reg) {
        if !self.state.is_key_down(self.state.v[x]) {
            self.state.pc = self.state.pc.wrapping_add(2);
        }
    }
}

/// |`Fxbb`| Performs IO
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`fX07`| Set vX to value in delay timer     |
/// |`fX0a`| Wait for input, store key in vX    |
/// |`fX15`| Set delay timer to the value in vX |
/// |`fX18`| Set sound timer to the value in vX |
/// |`fX1e`| Add vX to I                        |
/// |`fX29`| Load sprite for character vX into I|
/// |`fX33`| BCD convert vX into I[0..3]        |
/// |`fX55`| DMA Stor from registers 0..=X to I |
/// |`fX65`| DMA Load from I to registers 0..=X |
impl CPU {
    /// |`Fx07`| Get the current DT, and put it in vX
    /// ```py
    /// vX = DT
    /// ```
    #[inline(always)]
    pub(super) fn load_delay_timer(&mut self, x: Reg) {
        self.state.v[x] = self.state.delay;
    }
    /// |`Fx0A`| Wait for key, then vX = K.
    ///
    /// A key already held satisfies the wait at once (lowest index wins).
    /// Otherwise the machine enters [Status::WaitingForKey]; PC stays
    /// where it is and the loop driver resumes it when the host reports a
    /// press.
    #[inline(always)]
    pub(super) fn wait_for_key(&mut self, x: Reg) {
        match self.state.first_key() {
            Some(key) => self.state.v[x] = key,
            None => self.status = Status::WaitingForKey { x },
        }
    }
    /// |`Fx15`| Load vX into DT
    /// ```py
    /// DT = vX
    /// ```
    #[inline(always)]
    pub(super) fn store_delay_timer(&mut self, x: Reg) {
        self.state.delay = self.state.v[x];
    }
    /// |`Fx18`| Load vX into ST
    /// ```py
    /// ST = vX
    /// ```
    #[inline(always)]
    pub(super) fn store_sound_timer(&mut self, x: Reg) {
        self.state.sound = self.state.v[x];
    }
    /// |`Fx1e`| Add vX to I, wrapping in the 12-bit address space
    /// ```py
    /// I += vX
    /// ```
    #[inline(always)]
    pub(super) fn add_i(&mut self, x: Reg) {
        self.state.i = self.state.i.wrapping_add(self.state.v[x] as Adr) & 0xfff;
    }
    /// |`Fx29`| Load sprite for character vX into I
    /// ```py
    /// I = sprite(vX)
    /// ```
    #[inline(always)]
    pub(super) fn load_sprite(&mut self, x: Reg) {
        self.state.i = Mem::font_glyph(self.state.v[x]);
    }
    /// |`Fx33`| BCD convert vX into I`[0..3]`: hundreds at I, tens at I+1,
    /// ones at I+2
    #[inline(always)]
    pub(super) fn bcd_convert(&mut self, x: Reg) -> Result<()> {
        let value = self.state.v[x];
        let i = self.state.i as usize;
        match self.state.mem.get_mut(i..i + 3) {
            Some(digits) => {
                digits[0] = value / 100 % 10;
                digits[1] = value / 10 % 10;
                digits[2] = value % 10;
                Ok(())
            }
            None => Err(self.mem_fault(i + 2)),
        }
    }
    /// |`Fx55`| DMA Stor from registers 0..=X to I. I is unchanged.
    #[inline(always)]
    pub(super) fn store_dma(&mut self, x: Reg) -> Result<()> {
        let i = self.state.i as usize;
        match self.state.mem.get_mut(i..=i + x) {
            Some(window) => {
                for (reg, value) in window.iter_mut().enumerate() {
                    *value = self.state.v[reg];
                }
                Ok(())
            }
            None => Err(self.mem_fault(i + x)),
        }
    }
    /// |`Fx65`| DMA Load from I to registers 0..=X. I is unchanged.
    #[inline(always)]
    pub(super) fn load_dma(&mut self, x: Reg) -> Result<()> {
        let i = self.state.i as usize;
        match self.state.mem.get(i..=i + x) {
            Some(window) => {
                for (reg, value) in window.iter().enumerate() {
                    self.state.v[reg] = *value;
                }
                Ok(())
            }
            None => Err(self.mem_fault(i + x)),
        }
    }
}
