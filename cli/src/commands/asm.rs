use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use tracing::{error, info};

use mmach_emulator::assembler::assemble;
use mmach_emulator::isa::MachineSpec;
use mmach_emulator::loader::Program;

use super::{EXIT_LOAD_FAILURE, EXIT_OK};

#[derive(Args)]
pub struct AsmOpt {
    /// Assembly source, '-' for stdin
    input: PathBuf,

    /// Destination .mmach file
    output: PathBuf,
}

/// Render an assembled program back into the hex source format.
fn render(program: &Program) -> String {
    let spec = MachineSpec::of(program.machine);
    let word_cells = spec.word_cells() as usize;
    let mut text = String::new();
    let _ = writeln!(text, ".cpu {}", program.machine);

    for binding in &program.outputs {
        let addresses: Vec<String> = (0..binding.count)
            .map(|i| format!("{:#x}", binding.address + i * word_cells as u16))
            .collect();
        let _ = write!(text, ".output {}", addresses.join(", "));
        match &binding.message {
            Some(message) => {
                let _ = writeln!(text, " {message}");
            }
            None => {
                let _ = writeln!(text);
            }
        }
    }

    for span in &program.spans {
        let _ = writeln!(text, ".code {:#x}", span.address);
        for chunk in span.cells.chunks(word_cells) {
            let hex: String = chunk.iter().map(|cell| cell.hex()).collect();
            let _ = writeln!(text, "{hex}");
        }
    }
    text
}

impl AsmOpt {
    pub fn exec(&self) -> i32 {
        let source = match super::run::read_source(&self.input) {
            Ok(source) => source,
            Err(e) => {
                error!("cannot read {:?}: {e}", self.input);
                return EXIT_LOAD_FAILURE;
            }
        };

        let program = match assemble(&source) {
            Ok(program) => program,
            Err(e) => {
                error!("{e}");
                return EXIT_LOAD_FAILURE;
            }
        };

        let rendered = render(&program);
        if let Err(e) = std::fs::write(&self.output, rendered) {
            error!("cannot write {:?}: {e}", self.output);
            return EXIT_LOAD_FAILURE;
        }
        info!(path = ?self.output, "assembled");
        EXIT_OK
    }
}
