use clap::Subcommand as ClapSubcommand;

mod asm;
mod debug;
mod run;

/// Process exit codes: 0 for a normal halt, 1 for an error halt, 2 for a
/// loader or parse failure.
pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR_HALT: i32 = 1;
pub const EXIT_LOAD_FAILURE: i32 = 2;

#[derive(ClapSubcommand)]
pub enum Subcommand {
    /// Load a program, run it to halt and print its outputs
    Run(self::run::RunOpt),

    /// Load a program and step through it interactively
    Debug(self::debug::DebugOpt),

    /// Assemble an .mmasm source into an .mmach file
    Asm(self::asm::AsmOpt),
}

impl Subcommand {
    pub fn exec(self) -> i32 {
        match self {
            Self::Run(opt) => opt.exec(),
            Self::Debug(opt) => opt.exec(),
            Self::Asm(opt) => opt.exec(),
        }
    }
}
