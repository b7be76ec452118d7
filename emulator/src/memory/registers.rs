//! The register file.
//!
//! Register identities form a closed enumeration so the engine cannot address
//! a register by a misspelt name; only the subset a machine configures at
//! construction actually exists. Widths are fixed when a register is added
//! and every write is width-checked.

use parse_display::Display;

use crate::word::Word;

/// Every register any machine of the family may own.
///
/// `PC`, `IR`, `ADDR` and `FLAGS` exist everywhere. `A1`/`A2` hold decoded
/// operand addresses, `S`/`S1`/`R1`/`R2`/`R` are ALU scratch, `R`/`M` also
/// serve as the decoded register selectors on the register machines, and
/// `R0`…`RF` are the general-purpose registers of `mm-r`/`mm-m`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display(style = "UPPERCASE")]
pub enum RegisterName {
    Pc,
    Ir,
    Addr,
    Sp,
    Flags,
    A1,
    A2,
    S,
    S1,
    R,
    M,
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    Ra,
    Rb,
    Rc,
    Rd,
    Re,
    Rf,
}

impl RegisterName {
    pub const COUNT: usize = 27;

    const ALL: [RegisterName; Self::COUNT] = [
        Self::Pc,
        Self::Ir,
        Self::Addr,
        Self::Sp,
        Self::Flags,
        Self::A1,
        Self::A2,
        Self::S,
        Self::S1,
        Self::R,
        Self::M,
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
        Self::R9,
        Self::Ra,
        Self::Rb,
        Self::Rc,
        Self::Rd,
        Self::Re,
        Self::Rf,
    ];

    /// The general-purpose register selected by a 4-bit instruction field.
    pub fn general(index: u8) -> Self {
        Self::ALL[Self::R0 as usize + (index & 0xf) as usize]
    }

    /// The next general-purpose register in circular order; division on the
    /// register machines writes its remainder there.
    pub fn next_general(self) -> Self {
        let index = self as usize - Self::R0 as usize;
        Self::general(((index + 1) % 16) as u8)
    }

    pub fn is_general(self) -> bool {
        self as usize >= Self::R0 as usize
    }
}

/// A name → word map with fixed widths.
#[derive(Clone)]
pub struct RegisterFile {
    table: [Option<Word>; RegisterName::COUNT],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self {
            table: [None; RegisterName::COUNT],
        }
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a register with the given width, initialised to zero.
    ///
    /// Declaring the same register twice with the same width is allowed (the
    /// ALU and the control unit share a few registers); declaring it with a
    /// different width is a configuration bug.
    pub fn add(&mut self, name: RegisterName, bits: u32) {
        match self.table[name as usize] {
            None => self.table[name as usize] = Some(Word::zero(bits)),
            Some(existing) => assert_eq!(
                existing.width(),
                bits,
                "register {name} already declared with {} bits",
                existing.width()
            ),
        }
    }

    pub fn contains(&self, name: RegisterName) -> bool {
        self.table[name as usize].is_some()
    }

    /// Read a register. Panics if the machine does not own it; the decode
    /// tables guarantee the engine never asks for a register it did not
    /// declare.
    pub fn get(&self, name: RegisterName) -> Word {
        match self.table[name as usize] {
            Some(word) => word,
            None => panic!("register {name} is not part of this machine"),
        }
    }

    /// Write a register; the value width must match the declared width.
    pub fn set(&mut self, name: RegisterName, value: Word) {
        let slot = &mut self.table[name as usize];
        match slot {
            Some(current) => {
                assert_eq!(
                    current.width(),
                    value.width(),
                    "write of {} bits to {name} ({} bits)",
                    value.width(),
                    current.width()
                );
                *slot = Some(value);
            }
            None => panic!("register {name} is not part of this machine"),
        }
    }

    /// Snapshot of every declared register, in declaration-table order.
    pub fn state(&self) -> Vec<(RegisterName, Word)> {
        RegisterName::ALL
            .iter()
            .filter_map(|&name| self.table[name as usize].map(|word| (name, word)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_get_set_test() {
        let mut file = RegisterFile::new();
        file.add(RegisterName::Pc, 16);
        file.add(RegisterName::S, 24);
        assert_eq!(file.get(RegisterName::Pc).unsigned(), 0);

        file.set(RegisterName::S, Word::new(0x123456, 24));
        assert_eq!(file.get(RegisterName::S).unsigned(), 0x123456);
        assert!(file.contains(RegisterName::S));
        assert!(!file.contains(RegisterName::Sp));
    }

    #[test]
    #[should_panic(expected = "write of 16 bits")]
    fn wrong_width_test() {
        let mut file = RegisterFile::new();
        file.add(RegisterName::S, 24);
        file.set(RegisterName::S, Word::new(0, 16));
    }

    #[test]
    fn general_registers_test() {
        assert_eq!(RegisterName::general(0), RegisterName::R0);
        assert_eq!(RegisterName::general(0xa), RegisterName::Ra);
        assert_eq!(RegisterName::general(0xf), RegisterName::Rf);
        assert_eq!(RegisterName::R0.next_general(), RegisterName::R1);
        assert_eq!(RegisterName::Rf.next_general(), RegisterName::R0);
        assert_eq!(RegisterName::Ra.to_string(), "RA");
        assert_eq!(RegisterName::Pc.to_string(), "PC");
    }
}
