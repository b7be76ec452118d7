//! Guest faults.
//!
//! Every fault stops the machine with an error halt: the HALT flag is set,
//! the reason is recorded on the computer and output bindings are suppressed.

use thiserror::Error;

use crate::memory::{RamError, RegisterName};
use crate::word::{ArithmeticError, Word};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Exception {
    /// The fetched opcode is not in this machine's table.
    #[error("invalid opcode {opcode:#04x}")]
    InvalidOpcode { opcode: u8 },

    /// Protected memory refused a read of a never-written cell.
    #[error("read of uninitialised memory at {address}")]
    UninitialisedRead { address: Word },

    /// A bound word does not lie in memory.
    #[error("address {address} out of range")]
    AddressOutOfRange { address: Word },

    #[error("division by zero")]
    DivisionByZero,

    /// Signed division of the minimum value by -1.
    #[error("signed overflow")]
    SignedOverflow,

    /// A stack access reached below the live stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// A push would grow the stack past the whole memory.
    #[error("stack overflow")]
    StackOverflow,

    /// A register outside the guest-addressable set was named.
    #[error("illegal register {register}")]
    IllegalRegister { register: RegisterName },
}

impl From<RamError> for Exception {
    fn from(e: RamError) -> Self {
        match e {
            RamError::UninitialisedRead(address) => Self::UninitialisedRead { address },
        }
    }
}

impl From<ArithmeticError> for Exception {
    fn from(e: ArithmeticError) -> Self {
        match e {
            ArithmeticError::DivisionByZero => Self::DivisionByZero,
            ArithmeticError::SignedOverflow => Self::SignedOverflow,
        }
    }
}
