// This code is licensed under MIT license (see LICENSE for details)

//! The reference 64x32 framebuffer
//!
//! [FrameBuffer] implements the [Screen] capability the `draw` and `cls`
//! opcodes target: XOR compositing, wraparound at both edges, and collision
//! reporting. It lives in the library so every front end and test shares one
//! correct implementation, but it is owned by the host side and lent to the
//! interpreter per tick, never stored in [crate::state::State].

use crate::host::Screen;
use std::fmt::{Display, Formatter};

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 64;

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 32;

/// A 64x32 monochrome bit grid with XOR sprite compositing
///
/// Each row is one `u64`, most significant bit leftmost, so an 8px sprite
/// row is a shift plus a rotate and collision is a bitwise and.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameBuffer {
    rows: [u64; SCREEN_HEIGHT],
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer::default()
    }

    /// Whether the pixel at (x, y) is lit. Coordinates wrap.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.rows[y % SCREEN_HEIGHT] >> (63 - (x % SCREEN_WIDTH)) & 1 != 0
    }

    /// Iterates all pixels row-major, for renderers
    pub fn pixels(&self) -> impl Iterator<Item = bool> + '_ {
        self.rows
            .iter()
            .flat_map(|row| (0..SCREEN_WIDTH).map(move |x| row >> (63 - x) & 1 != 0))
    }
}

impl Screen for FrameBuffer {
    fn clear(&mut self) {
        self.rows = [0; SCREEN_HEIGHT];
    }

    fn blit(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collided = false;
        for (dy, &byte) in rows.iter().enumerate() {
            // place the sprite row at the left edge, then rotate into place
            // so columns past 63 wrap back around
            let line = ((byte as u64) << 56).rotate_right(x as u32 % 64);
            let row = &mut self.rows[(y as usize + dy) % SCREEN_HEIGHT];
            collided |= *row & line != 0;
            *row ^= line;
        }
        collided
    }
}

impl Display for FrameBuffer {
    /// Block-character art, two pixels per glyph, for terminals and test
    /// failure output
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for pair in self.rows.chunks(2) {
            let (top, bottom) = (pair[0], pair[1]);
            for x in 0..SCREEN_WIDTH {
                let (t, b) = (top >> (63 - x) & 1 != 0, bottom >> (63 - x) & 1 != 0);
                f.write_str(match (t, b) {
                    (true, true) => "█",
                    (true, false) => "▀",
                    (false, true) => "▄",
                    (false, false) => " ",
                })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_sets_pixels() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.blit(8, 4, &[0b1010_0000]));
        assert!(fb.pixel(8, 4));
        assert!(!fb.pixel(9, 4));
        assert!(fb.pixel(10, 4));
    }

    #[test]
    fn blit_reports_collision_only_on_overlap() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.blit(0, 0, &[0b1000_0000]));
        // adjacent pixels do not collide
        assert!(!fb.blit(1, 0, &[0b1000_0000]));
        // redrawing a lit pixel does
        assert!(fb.blit(0, 0, &[0b1000_0000]));
        // and the XOR turned it back off
        assert!(!fb.pixel(0, 0));
    }

    #[test]
    fn blit_wraps_both_edges() {
        let mut fb = FrameBuffer::new();
        fb.blit(60, 30, &[0xff, 0xff, 0xff]);
        // columns 60..64 and 0..4, rows 30, 31, and 0
        for y in [30, 31, 0] {
            for x in [60, 63, 0, 3] {
                assert!(fb.pixel(x, y), "expected ({x}, {y}) lit");
            }
            assert!(!fb.pixel(4, y));
            assert!(!fb.pixel(59, y));
        }
        assert!(!fb.pixel(60, 1));
    }

    #[test]
    fn clear_unsets_everything() {
        let mut fb = FrameBuffer::new();
        fb.blit(0, 0, &[0xff; 15]);
        fb.clear();
        assert!(fb.pixels().all(|px| !px));
    }
}
