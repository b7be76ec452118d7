//! Emulator for a family of eight teaching model machines.
//!
//! The machines share one execution engine: fixed-width words, a
//! cell-addressable RAM, a register file, an ALU with condition flags and a
//! control unit parameterised by a declarative instruction-set description.
//! Programs arrive either as hex source (`.mmach`) or, for the modification
//! machine, as assembly (`.mmasm`); the loader binds input and output
//! numbers to memory addresses or stack slots around the run.

pub mod alu;
pub mod assembler;
pub mod constants;
pub mod debugger;
pub mod isa;
pub mod loader;
pub mod memory;
pub mod parser;
pub mod runtime;
pub mod word;

pub use self::assembler::assemble;
pub use self::loader::load;
pub use self::parser::parse;
