//! The two storage components: cell-addressable RAM and the register file.
//!
//! Both hand out fixed-width [`crate::word::Word`] values keyed by an address
//! or a register name, so the ALU and the control unit stay agnostic of the
//! underlying store.

mod ram;
mod registers;

pub use self::ram::{Ram, RamError};
pub use self::registers::{RegisterFile, RegisterName};
