use std::path::PathBuf;

use clap::Args;
use tracing::error;

use mmach_emulator::loader::load;
use mmach_emulator::parser::parse;

use super::EXIT_LOAD_FAILURE;

#[derive(Args)]
pub struct DebugOpt {
    /// Input file, '-' for stdin
    input: PathBuf,

    /// Fail reads of memory the program never wrote
    #[arg(long)]
    protect_memory: bool,
}

impl DebugOpt {
    pub fn exec(&self) -> i32 {
        let source = match super::run::read_source(&self.input) {
            Ok(source) => source,
            Err(e) => {
                error!("cannot read {:?}: {e}", self.input);
                return EXIT_LOAD_FAILURE;
            }
        };

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

        let enter = cpu.enter.clone();
        if let Err(e) = cpu.bind_inputs(&enter) {
            error!("{e}");
            return EXIT_LOAD_FAILURE;
        }

        crate::interactive::run_interactive(&mut cpu)
    }
}
