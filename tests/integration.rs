//! Testing methods on Cricket's public API
use cricket::*;

fn assemble(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}

/// A host with no window or wall clock: the screen is a plain
/// [FrameBuffer], and the keypad and timer cadence are scripted by the
/// test body
#[derive(Clone, Debug, Default)]
struct ScriptedHost {
    screen: FrameBuffer,
    keys: u16,
    pressed: Option<u8>,
    quit: bool,
    timer_ticks: usize,
}

impl Screen for ScriptedHost {
    fn clear(&mut self) {
        self.screen.clear()
    }
    fn blit(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        self.screen.blit(x, y, rows)
    }
}

impl Input for ScriptedHost {
    fn is_key_down(&self, key: u8) -> bool {
        self.keys & 1 << (key & 0xf) != 0
    }
    fn poll_events(&mut self) -> Events {
        Events {
            quit: self.quit,
            last_key_pressed: self.pressed.take(),
        }
    }
}

impl Clock for ScriptedHost {
    fn should_tick_timer(&mut self) -> bool {
        if self.timer_ticks > 0 {
            self.timer_ticks -= 1;
            true
        } else {
            false
        }
    }
}

#[test]
fn chip8() {
    let ch8 = Chip8::default(); // Default
    let ch82 = ch8.clone(); // Clone
    assert_eq!(ch8, ch82); // PartialEq
    println!("{ch8:?}"); // Debug
}

#[test]
fn error() {
    let error = cricket::error::Error::InvalidOpcode {
        pc: 0x200,
        word: 0x5001,
    };
    // Print it with Display and Debug
    println!("{error} {error:?}");
}

mod cpu {
    use super::*;

    /// 0xff + 0x02 wraps to 0x01 and raises the carry flag
    #[test]
    fn add_wraps_and_carries() -> Result<()> {
        let mut ch8 = Chip8::default();
        ch8.cpu.load_rom(&assemble(&[0x60ff, 0x6102, 0x8014]))?;
        for _ in 0..3 {
            ch8.cpu.step(&mut ch8.screen)?;
        }
        assert_eq!(0x01, ch8.cpu.v()[0]);
        assert_eq!(0x01, ch8.cpu.v()[0xf]);
        Ok(())
    }

    /// vF is 1 when no borrow and 0 on borrow, and subtracting equal
    /// values counts as no borrow
    #[test]
    fn sub_sets_borrow_flag() -> Result<()> {
        for (a, b, diff, flag) in [(10, 3, 7, 1), (3, 10, 249, 0), (7, 7, 0, 1)] {
            let mut ch8 = Chip8::default();
            ch8.cpu
                .load_rom(&assemble(&[0x6000 | a, 0x6100 | b, 0x8015]))?;
            for _ in 0..3 {
                ch8.cpu.step(&mut ch8.screen)?;
            }
            assert_eq!(diff, ch8.cpu.v()[0] as u16);
            assert_eq!(flag, ch8.cpu.v()[0xf] as u16);
        }
        Ok(())
    }

    /// A call enters the subroutine, and ret resumes after the call site
    #[test]
    fn call_and_ret() -> Result<()> {
        let mut ch8 = Chip8::default();
        ch8.cpu
            .load_rom(&assemble(&[0x2206, 0x0000, 0x0000, 0x6005, 0x00ee]))?;
        ch8.cpu.step(&mut ch8.screen)?; // call 206
        assert_eq!(0x206, ch8.cpu.pc());
        ch8.cpu.step(&mut ch8.screen)?; // mov #05, v0
        ch8.cpu.step(&mut ch8.screen)?; // ret
        assert_eq!(0x202, ch8.cpu.pc());
        assert_eq!(5, ch8.cpu.v()[0]);
        Ok(())
    }

    /// The seventeenth nested call is a fault, and faults halt the machine
    #[test]
    fn unbounded_recursion_faults() {
        let mut ch8 = Chip8::default();
        // call 0x200, forever
        ch8.cpu.load_rom(&assemble(&[0x2200])).unwrap();
        let error = loop {
            match ch8.cpu.step(&mut ch8.screen) {
                Ok(_) => continue,
                Err(error) => break error,
            }
        };
        assert!(matches!(
            error,
            Error::StackOverflow {
                pc: 0x200,
                word: 0x2200
            }
        ));
        assert_eq!(Status::Halted, ch8.cpu.status());
    }

    /// Drawing the same glyph twice erases it and reports the collision
    #[test]
    fn draw_collides() -> Result<()> {
        let mut ch8 = Chip8::default();
        // i = &font[0], draw it at (0, 0) twice
        ch8.cpu
            .load_rom(&assemble(&[0x6000, 0xf029, 0xd005, 0xd005]))?;
        for _ in 0..3 {
            ch8.cpu.step(&mut ch8.screen)?;
        }
        assert!(ch8.screen.pixel(0, 0));
        assert_eq!(0, ch8.cpu.v()[0xf]);
        ch8.cpu.step(&mut ch8.screen)?;
        assert!(!ch8.screen.pixel(0, 0));
        assert_eq!(1, ch8.cpu.v()[0xf]);
        Ok(())
    }

    /// Reset rewinds execution but keeps the loaded program
    #[test]
    fn reset_restarts_the_program() -> Result<()> {
        let mut ch8 = Chip8::default();
        ch8.cpu.load_rom(&assemble(&[0x6a42, 0x1202]))?;
        ch8.cpu.step(&mut ch8.screen)?;
        assert_eq!(0x42, ch8.cpu.v()[0xa]);
        ch8.cpu.reset();
        assert_eq!(0x200, ch8.cpu.pc());
        assert_eq!(0, ch8.cpu.v()[0xa]);
        assert_eq!(0, ch8.cpu.cycle());
        ch8.cpu.step(&mut ch8.screen)?;
        assert_eq!(0x42, ch8.cpu.v()[0xa]);
        Ok(())
    }

    /// Loading a 3585-byte image is refused before the machine starts
    #[test]
    fn oversized_rom_is_refused() {
        let mut cpu = CPU::default();
        match cpu.load_rom(&[0; 3585]) {
            Err(Error::RomTooLarge {
                len: 3585,
                max: 3584,
            }) => (),
            other => unreachable!("{other:?}"),
        }
    }
}

mod host {
    use super::*;

    /// A tight jump loop spins forever without faulting
    #[test]
    fn busy_loop_runs() -> Result<()> {
        let mut host = ScriptedHost::default();
        let mut cpu = CPU::default();
        cpu.load_rom(&assemble(&[0x1200]))?;
        for _ in 0..60 {
            cpu.run_frame(&mut host)?;
        }
        assert_eq!(Status::Running, cpu.status());
        assert_eq!(0x200, cpu.pc());
        assert_eq!(60 * Flags::default().ipf, cpu.cycle());
        Ok(())
    }

    /// The keypad snapshot taken at the top of the tick feeds sek
    #[test]
    fn keypad_skips() -> Result<()> {
        for (keys, expected) in [(1 << 0xa, [0, 1]), (0, [1, 1])] {
            let mut host = ScriptedHost {
                keys,
                ..Default::default()
            };
            let mut cpu = CPU::new(Flags {
                ipf: 4,
                ..Default::default()
            });
            // v0 = 0xa; sek v0 skips over the first marker
            cpu.load_rom(&assemble(&[0x600a, 0xe09e, 0x6b01, 0x6c01]))?;
            cpu.run_frame(&mut host)?;
            assert_eq!(expected, [cpu.v()[0xb], cpu.v()[0xc]]);
        }
        Ok(())
    }

    /// waitk parks the machine until the host reports a key press
    #[test]
    fn wait_for_key() -> Result<()> {
        let mut host = ScriptedHost::default();
        let mut cpu = CPU::new(Flags {
            ipf: 1,
            ..Default::default()
        });
        cpu.load_rom(&assemble(&[0xf50a, 0x1200]))?;
        cpu.run_frame(&mut host)?;
        assert_eq!(Status::WaitingForKey { x: 5 }, cpu.status());
        // no key yet: still parked
        cpu.run_frame(&mut host)?;
        assert_eq!(Status::WaitingForKey { x: 5 }, cpu.status());
        host.pressed = Some(0xb);
        cpu.run_frame(&mut host)?;
        assert_eq!(Status::Running, cpu.status());
        assert_eq!(0xb, cpu.v()[5]);
        assert_eq!(0x202, cpu.pc());
        Ok(())
    }

    /// Timers follow the host clock and saturate at zero
    #[test]
    fn timers_count_down() -> Result<()> {
        let mut host = ScriptedHost {
            timer_ticks: 10,
            ..Default::default()
        };
        let mut cpu = CPU::new(Flags {
            ipf: 1,
            ..Default::default()
        });
        // delay = 3, then spin
        cpu.load_rom(&assemble(&[0x6003, 0xf015, 0x1204]))?;
        for _ in 0..10 {
            cpu.run_frame(&mut host)?;
        }
        assert_eq!(0, cpu.delay());
        Ok(())
    }

    /// The classic count-then-spin program: two arithmetic cycles, then a
    /// jump-to-self that runs until the host quits
    #[test]
    fn count_then_spin() -> Result<()> {
        let mut host = ScriptedHost::default();
        let mut cpu = CPU::new(Flags {
            ipf: 1,
            ..Default::default()
        });
        cpu.load_rom(&assemble(&[0x6005, 0x7003, 0x1204]))?;
        cpu.run_frame(&mut host)?;
        assert_eq!(5, cpu.v()[0]);
        cpu.run_frame(&mut host)?;
        assert_eq!(8, cpu.v()[0]);
        // the tight loop is legal, not a fault
        for _ in 0..100 {
            cpu.run_frame(&mut host)?;
        }
        assert_eq!(Status::Running, cpu.status());
        host.quit = true;
        cpu.run_frame(&mut host)?;
        assert_eq!(Status::Halted, cpu.status());
        Ok(())
    }

    /// A quit event halts the machine before anything executes
    #[test]
    fn quit_event_halts() -> Result<()> {
        let mut host = ScriptedHost {
            quit: true,
            ..Default::default()
        };
        let mut cpu = CPU::default();
        cpu.load_rom(&assemble(&[0x1200]))?;
        cpu.run(&mut host)?;
        assert_eq!(Status::Halted, cpu.status());
        assert_eq!(0, cpu.cycle());
        Ok(())
    }
}

mod dis {
    use super::*;

    #[test]
    fn insn_display() {
        assert_eq!("jmp    234", format!("{}", Insn::jmp { A: 0x234 }));
        assert_eq!("add    #0a, v5", format!("{}", Insn::addb { B: 0xa, x: 5 }));
        assert_eq!(
            "draw   #6, v2, v3",
            format!("{}", Insn::draw { y: 3, x: 2, n: 6 })
        );
    }

    #[test]
    fn dis_once() {
        let dis = Dis::default();
        // styled, so just exercise the valid and invalid arms
        println!("{} {}", dis.once(0x00e0), dis.once(0xffff));
    }

    /// movb and addb carry their operand fields through decode and back
    #[test]
    fn immediates_reencode() {
        for word in 0x6000..=0x7fff {
            match Insn::decode(Word(word)) {
                Some(insn) => assert_eq!(word, insn.encode()),
                None => unreachable!("{word:04x} did not decode"),
            }
        }
    }
}
