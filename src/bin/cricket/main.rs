// This code is licensed under MIT license (see LICENSE for details)

//! Cricket: a Chip-8 interpreter in a minifb window

mod ui;

use crate::ui::{UIBuilder, UI};
use cricket::{error::Result, *};
use gumdrop::Options;
use owo_colors::OwoColorize;
use std::{
    path::PathBuf,
    process::ExitCode,
    time::{Duration, Instant},
};

#[derive(Clone, Debug, Options, PartialEq, Eq)]
struct Arguments {
    #[options(help = "Load a ROM to run.", required, free)]
    pub file: PathBuf,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Enable the live disassembly trace.")]
    pub debug: bool,
    #[options(help = "Start the machine paused.")]
    pub pause: bool,
    #[options(help = "Set the instructions executed per frame.", meta = "IPF")]
    pub speed: Option<usize>,
    #[options(
        short = "S",
        help = "Set the window scale factor.",
        default = "16",
        meta = "N"
    )]
    pub scale: usize,
}

fn main() -> ExitCode {
    let options = Arguments::parse_args_default_or_exit();
    if let Err(error) = run(options) {
        eprintln!("{}", error.bold().red());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(options: Arguments) -> Result<()> {
    let mut runner = Runner::new(options)?;
    runner.run()
}

/// Owns the machine and the window, and paces them at the frame rate
struct Runner {
    cpu: CPU,
    ui: UI,
    frame: Instant,
}

impl Runner {
    const FRAME: Duration = Duration::from_nanos(16_666_667);

    fn new(options: Arguments) -> Result<Self> {
        let mut cpu = CPU::new(Flags {
            debug: options.debug,
            pause: options.pause,
            ipf: options.speed.unwrap_or(Flags::default().ipf),
        });
        cpu.load_program(&options.file)?;
        Ok(Runner {
            cpu,
            ui: UIBuilder::new(&options.file).scale(options.scale).build()?,
            frame: Instant::now(),
        })
    }

    /// Runs the machine until the window closes or the machine faults.
    /// A fault gets a register dump for post-mortem diagnosis.
    fn run(&mut self) -> Result<()> {
        while self.cpu.status() != Status::Halted {
            self.ui.frame(&mut self.cpu)?;
            if let Err(error) = self.cpu.run_frame(&mut self.ui) {
                self.cpu.dump();
                return Err(error);
            }
            self.wait_for_next_frame();
        }
        Ok(())
    }

    /// Sleeps out the remainder of the frame, for ~60 fps
    fn wait_for_next_frame(&mut self) {
        std::thread::sleep(Self::FRAME.saturating_sub(self.frame.elapsed()));
        self.frame += Self::FRAME;
    }
}
