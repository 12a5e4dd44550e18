// This code is licensed under MIT license (see LICENSE for details)

//! Capability interfaces the interpreter consumes from its host
//!
//! The core never opens a window, reads a keyboard, or sleeps. Everything
//! timing- or I/O-shaped arrives through these traits, handed to the loop
//! driver at tick boundaries. The reference implementations live in
//! [crate::screen] and the front end; tests substitute their own.

use std::time::{Duration, Instant};

/// The 64x32 monochrome display the `draw` and `cls` opcodes target
pub trait Screen {
    /// Turns every pixel off
    fn clear(&mut self);

    /// XOR-blits an 8px-wide sprite with its top-left corner at (x, y).
    ///
    /// One byte per row, most significant bit leftmost. Coordinates wrap
    /// modulo 64x32. Returns true if any lit pixel was turned off.
    fn blit(&mut self, x: u8, y: u8, rows: &[u8]) -> bool;
}

/// The hex keypad and window-level events
pub trait Input {
    /// Whether hex key `key` is currently held. Only the low nibble of
    /// `key` is meaningful.
    fn is_key_down(&self, key: u8) -> bool;

    /// Drains events accumulated since the last call.
    /// The loop driver calls this exactly once per tick.
    fn poll_events(&mut self) -> Events;
}

/// What [Input::poll_events] reported for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Events {
    /// Host asked the machine to stop
    pub quit: bool,
    /// Most recent keypad press since the last poll, if any
    pub last_key_pressed: Option<u8>,
}

/// Cadence source for the two 60 Hz timers
pub trait Clock {
    /// True when a timer period has elapsed since this last returned true
    fn should_tick_timer(&mut self) -> bool;
}

/// Everything the loop driver needs from a host, as a single bound
pub trait Host: Screen + Input + Clock {}
impl<T: Screen + Input + Clock> Host for T {}

/// A [Clock] that follows wall time at 60 Hz
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    last: Instant,
}

impl WallClock {
    /// One timer period: 1/60 s
    pub const PERIOD: Duration = Duration::from_nanos(16_666_667);

    pub fn new() -> Self {
        WallClock {
            last: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        WallClock::new()
    }
}

impl Clock for WallClock {
    fn should_tick_timer(&mut self) -> bool {
        let now = Instant::now();
        if now - self.last >= Self::PERIOD {
            self.last += Self::PERIOD;
            // resynchronize after a long stall instead of bursting
            if now - self.last > Self::PERIOD * 2 {
                self.last = now;
            }
            true
        } else {
            false
        }
    }
}
