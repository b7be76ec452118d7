use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use tracing::{debug, error, info};

use mmach_emulator::loader::load;
use mmach_emulator::parser::parse;
use mmach_emulator::runtime::StopReason;

use super::{EXIT_ERROR_HALT, EXIT_LOAD_FAILURE, EXIT_OK};

#[derive(Args)]
pub struct RunOpt {
    /// Input file, '-' for stdin
    input: PathBuf,

    /// Ignore the inline .enter directive and read input numbers from stdin
    #[arg(long)]
    enter: bool,

    /// Fail reads of memory the program never wrote
    #[arg(long)]
    protect_memory: bool,

    /// Stop after this many steps instead of spinning forever
    #[arg(long)]
    max_steps: Option<u64>,
}

pub(crate) fn read_source(input: &PathBuf) -> std::io::Result<String> {
    if input.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(input)
    }
}

impl RunOpt {
    pub fn exec(&self) -> i32 {
        info!(path = ?self.input, "reading program");
        let source = match read_source(&self.input) {
            Ok(source) => source,
            Err(e) => {
                error!("cannot read {:?}: {e}", self.input);
                return EXIT_LOAD_FAILURE;
            }
        };

        debug!("parsing program");
        let program = match parse(&source) {
            Ok(program) => program,
            Err(e) => {
                error!("{e}");
                return EXIT_LOAD_FAILURE;
            }
        };

        let mut cpu = match load(&program, self.protect_memory) {
            Ok(cpu) => cpu,
            Err(e) => {
                error!("{e}");
                return EXIT_LOAD_FAILURE;
            }
        };

        let enter = if self.enter {
            let mut text = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut text) {
                error!("cannot read input numbers: {e}");
                return EXIT_LOAD_FAILURE;
            }
            text
        } else {
            cpu.enter.clone()
        };
        if let Err(e) = cpu.bind_inputs(&enter) {
            error!("{e}");
            return EXIT_LOAD_FAILURE;
        }

        info!("running program");
        match cpu.run(self.max_steps) {
            StopReason::Halted => {}
            StopReason::Failed(fault) => {
                error!("{fault}");
                return EXIT_ERROR_HALT;
            }
            StopReason::StepLimitExceeded => {
                error!("step limit exceeded after {} steps", cpu.computer.cycles());
                return EXIT_ERROR_HALT;
            }
        }

        match cpu.outputs() {
            Ok(values) => {
                for value in values {
                    println!("{value}");
                }
                EXIT_OK
            }
            Err(e) => {
                error!("{e}");
                EXIT_ERROR_HALT
            }
        }
    }
}
