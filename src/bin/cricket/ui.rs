// This code is licensed under MIT license (see LICENSE for details)

//! Platform-specific IO/UI code: the minifb window, the palette, and the
//! keymap

use cricket::*;
use minifb::{Key, Scale, ScaleMode, Window, WindowOptions};
use std::{
    path::Path,
    time::Instant,
};

#[derive(Clone, Debug)]
pub struct UIBuilder {
    pub name: String,
    pub window_options: WindowOptions,
}

impl UIBuilder {
    pub fn new(rom: impl AsRef<Path>) -> Self {
        UIBuilder {
            name: format!("Cricket - {}", rom.as_ref().display()),
            ..Default::default()
        }
    }

    /// Picks the nearest supported window scale factor
    pub fn scale(mut self, scale: usize) -> Self {
        self.window_options.scale = match scale {
            0..=1 => Scale::X1,
            2..=3 => Scale::X2,
            4..=7 => Scale::X4,
            8..=15 => Scale::X8,
            16..=31 => Scale::X16,
            _ => Scale::X32,
        };
        self
    }

    pub fn build(self) -> Result<UI> {
        Ok(UI {
            window: Window::new(
                &self.name,
                SCREEN_WIDTH,
                SCREEN_HEIGHT,
                self.window_options,
            )?,
            fb: FrameBuffer::new(),
            buffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            format: FrameBufferFormat::default(),
            keyboard: Vec::new(),
            clock: WallClock::new(),
            pressed: None,
            open: true,
            fps: Instant::now(),
        })
    }
}

impl Default for UIBuilder {
    fn default() -> Self {
        UIBuilder {
            name: String::from("Cricket"),
            window_options: WindowOptions {
                title: true,
                resize: false,
                scale: Scale::X16,
                scale_mode: ScaleMode::AspectRatioStretch,
                none: true,
                ..Default::default()
            },
        }
    }
}

/// Colors for the rendered framebuffer, 0RGB
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBufferFormat {
    pub fg: u32,
    pub bg: u32,
}

impl Default for FrameBufferFormat {
    fn default() -> Self {
        FrameBufferFormat {
            fg: 0x0011a434,
            bg: 0x001e2431,
        }
    }
}

/// The minifb window, and everything the interpreter wants from it.
///
/// Implements all three host capabilities: the interpreter draws into the
/// owned [FrameBuffer], reads the keypad straight off the window, and gets
/// its timer cadence from a [WallClock]. Window-level work happens once per
/// rendered frame in [UI::frame].
pub struct UI {
    window: Window,
    fb: FrameBuffer,
    buffer: Vec<u32>,
    format: FrameBufferFormat,
    keyboard: Vec<Key>,
    clock: WallClock,
    pressed: Option<u8>,
    open: bool,
    fps: Instant,
}

impl UI {
    /// Renders the framebuffer, refreshes input state, and applies control
    /// keys. Called once per frame; everything it learns is replayed to the
    /// interpreter through the capability traits during the next
    /// [CPU::run_frame].
    pub fn frame(&mut self, cpu: &mut CPU) -> Result<()> {
        if cpu.flags.pause {
            self.window.set_title("Cricket ⏸");
        } else {
            self.window.set_title(&format!(
                "Cricket ▶ {:02.02}",
                1.0 / self.fps.elapsed().as_secs_f64()
            ));
        }
        self.fps = Instant::now();

        // paint the bit grid through the palette
        for (pixel, lit) in self.buffer.iter_mut().zip(self.fb.pixels()) {
            *pixel = if lit { self.format.fg } else { self.format.bg };
        }
        self.window
            .update_with_buffer(&self.buffer, SCREEN_WIDTH, SCREEN_HEIGHT)?;

        if !self.window.is_open() {
            self.open = false;
            return Ok(());
        }
        self.controls(cpu);
        Ok(())
    }

    /// Handles keys newly pressed this frame: control keys act on the
    /// machine, keypad keys are remembered for [Input::poll_events]
    fn controls(&mut self, cpu: &mut CPU) {
        let held = self.window.get_keys();
        for key in held.iter().filter(|key| !self.keyboard.contains(key)) {
            match key {
                Key::Escape => self.open = false,
                Key::F4 => {
                    cpu.flags.debug();
                    eprintln!(
                        "Debug {}.",
                        if cpu.flags.debug { "enabled" } else { "disabled" }
                    );
                }
                Key::F5 => {
                    cpu.flags.pause();
                    eprintln!("{}.", if cpu.flags.pause { "Paused" } else { "Unpaused" });
                }
                Key::F9 => {
                    eprintln!("Reset.");
                    cpu.reset();
                    self.fb.clear();
                }
                key => {
                    if let Some(key) = identify_key(*key) {
                        self.pressed = Some(key);
                    }
                }
            }
        }
        self.keyboard = held;
    }
}

impl Screen for UI {
    fn clear(&mut self) {
        self.fb.clear()
    }
    fn blit(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        self.fb.blit(x, y, rows)
    }
}

impl Input for UI {
    fn is_key_down(&self, key: u8) -> bool {
        match keypad_key(key) {
            Some(key) => self.window.is_key_down(key),
            None => false,
        }
    }
    fn poll_events(&mut self) -> Events {
        Events {
            quit: !self.open,
            last_key_pressed: self.pressed.take(),
        }
    }
}

impl Clock for UI {
    fn should_tick_timer(&mut self) -> bool {
        self.clock.should_tick_timer()
    }
}

/// The hex pad key a QWERTY key stands for, under the canonical
/// left-hand mapping
pub fn identify_key(key: Key) -> Option<u8> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xc),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xd),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xe),
        Key::Z => Some(0xa),
        Key::X => Some(0x0),
        Key::C => Some(0xb),
        Key::V => Some(0xf),
        _ => None,
    }
}

/// The QWERTY key that stands for a hex pad key
pub fn keypad_key(key: u8) -> Option<Key> {
    Some(match key & 0xf {
        0x1 => Key::Key1,
        0x2 => Key::Key2,
        0x3 => Key::Key3,
        0xc => Key::Key4,
        0x4 => Key::Q,
        0x5 => Key::W,
        0x6 => Key::E,
        0xd => Key::R,
        0x7 => Key::A,
        0x8 => Key::S,
        0x9 => Key::D,
        0xe => Key::F,
        0xa => Key::Z,
        0x0 => Key::X,
        0xb => Key::C,
        0xf => Key::V,
        _ => return None,
    })
}
