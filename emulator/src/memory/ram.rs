//! Random access memory.
//!
//! Memory is a flat array of cells whose width depends on the machine (one to
//! seven bytes). Multi-cell words are stored big-endian: the most significant
//! cell sits at the lowest address. Effective addresses wrap modulo the
//! address space on every computation, so a word may straddle the top of
//! memory and continue at address zero.

use thiserror::Error;
use tracing::warn;

use crate::word::Word;

/// Memory faults visible to the running program.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RamError {
    /// Under the protected policy, reading a cell that was never written by
    /// the loader or the program is a fault.
    #[error("read of uninitialised memory at {0}")]
    UninitialisedRead(Word),
}

/// Cell-addressable memory with an initialisation bitmap.
///
/// With `protected` set, fetching a never-written cell fails with
/// [`RamError::UninitialisedRead`]; otherwise such cells read as zero.
pub struct Ram {
    cell_bits: u32,
    address_bits: u32,
    protected: bool,
    cells: Vec<u64>,
    filled: Vec<bool>,
}

impl Ram {
    pub fn new(cell_bits: u32, address_bits: u32, protected: bool) -> Self {
        assert!(cell_bits >= 8 && cell_bits <= 64);
        assert!(address_bits <= 16);
        let size = 1usize << address_bits;
        Self {
            cell_bits,
            address_bits,
            protected,
            cells: vec![0; size],
            filled: vec![false; size],
        }
    }

    pub fn cell_bits(&self) -> u32 {
        self.cell_bits
    }

    pub fn size(&self) -> u64 {
        1 << self.address_bits
    }

    fn index(&self, address: Word, offset: u32) -> usize {
        // Addresses wrap, so a multi-cell access may run past the top of
        // memory and continue at zero.
        ((address.unsigned() + u64::from(offset)) & (self.size() - 1)) as usize
    }

    fn cell(&self, index: usize, address: Word) -> Result<u64, RamError> {
        if self.filled[index] {
            return Ok(self.cells[index]);
        }
        if self.protected {
            return Err(RamError::UninitialisedRead(address));
        }
        warn!(%address, "read of uninitialised memory");
        Ok(0)
    }

    /// Read `bits / cell_bits` consecutive cells starting at `address` and
    /// assemble them into a single word, most significant cell first.
    pub fn fetch(&self, address: Word, bits: u32) -> Result<Word, RamError> {
        assert!(bits > 0 && bits % self.cell_bits == 0);
        let count = bits / self.cell_bits;
        let mut value = 0u64;
        for i in 0..count {
            let index = self.index(address, i);
            value = (value << self.cell_bits) | self.cell(index, address)?;
        }
        Ok(Word::new(value, bits))
    }

    /// Write a word as consecutive cells starting at `address`, marking them
    /// initialised. The word width must be a whole number of cells.
    pub fn store(&mut self, address: Word, value: Word) {
        assert!(value.width() % self.cell_bits == 0);
        let count = value.width() / self.cell_bits;
        for i in 0..count {
            let index = self.index(address, i);
            let cell = value.field(value.width() - (i + 1) * self.cell_bits..value.width() - i * self.cell_bits);
            self.cells[index] = cell.unsigned();
            self.filled[index] = true;
        }
    }

    pub fn is_filled(&self, address: Word) -> bool {
        self.filled[self.index(address, 0)]
    }

    /// Maximal runs of initialised cells, for the debugger's memory view.
    pub fn filled_spans(&self) -> Vec<(u64, u64)> {
        let mut spans = Vec::new();
        let mut start = None;
        for (i, &filled) in self.filled.iter().enumerate() {
            match (filled, start) {
                (true, None) => start = Some(i as u64),
                (false, Some(s)) => {
                    spans.push((s, i as u64 - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            spans.push((s, self.size() - s));
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ADDRESS_BITS;

    fn addr(a: u64) -> Word {
        Word::new(a, ADDRESS_BITS)
    }

    #[test]
    fn fetch_store_round_trip_test() {
        // One machine word per (cell width, word width) pair
        for (cell_bits, word_bits) in [(56, 56), (40, 40), (24, 24), (8, 24), (16, 16), (16, 32), (8, 40)] {
            let mut ram = Ram::new(cell_bits, ADDRESS_BITS, true);
            let value = Word::new(0x1234_5678_9abc_u64, word_bits);
            for a in [0u64, 1, 0x100, 0xfff0] {
                ram.store(addr(a), value);
                assert_eq!(ram.fetch(addr(a), word_bits).unwrap(), value);
            }
        }
    }

    #[test]
    fn big_endian_test() {
        let mut ram = Ram::new(8, ADDRESS_BITS, true);
        ram.store(addr(0x10), Word::new(0x0102_03, 24));
        assert_eq!(ram.fetch(addr(0x10), 8).unwrap().unsigned(), 0x01);
        assert_eq!(ram.fetch(addr(0x11), 8).unwrap().unsigned(), 0x02);
        assert_eq!(ram.fetch(addr(0x12), 8).unwrap().unsigned(), 0x03);
    }

    #[test]
    fn address_wrap_test() {
        let mut ram = Ram::new(8, ADDRESS_BITS, true);
        ram.store(addr(0xffff), Word::new(0xbeef, 16));
        assert_eq!(ram.fetch(addr(0xffff), 8).unwrap().unsigned(), 0xbe);
        assert_eq!(ram.fetch(addr(0), 8).unwrap().unsigned(), 0xef);
        assert_eq!(ram.fetch(addr(0xffff), 16).unwrap().unsigned(), 0xbeef);
    }

    #[test]
    fn protected_read_test() {
        let ram = Ram::new(16, ADDRESS_BITS, true);
        assert_eq!(
            ram.fetch(addr(0x42), 16),
            Err(RamError::UninitialisedRead(addr(0x42)))
        );

        let ram = Ram::new(16, ADDRESS_BITS, false);
        assert_eq!(ram.fetch(addr(0x42), 16).unwrap().unsigned(), 0);
    }

    #[test]
    fn partially_filled_word_test() {
        let mut ram = Ram::new(8, ADDRESS_BITS, true);
        ram.store(addr(0x10), Word::new(0xab, 8));
        // Second cell of the word is dirty
        assert!(ram.fetch(addr(0x10), 16).is_err());
    }

    #[test]
    fn filled_spans_test() {
        let mut ram = Ram::new(16, ADDRESS_BITS, true);
        ram.store(addr(0), Word::new(1, 16));
        ram.store(addr(1), Word::new(2, 16));
        ram.store(addr(0x100), Word::new(3, 16));
        assert_eq!(ram.filled_spans(), vec![(0, 2), (0x100, 1)]);
    }
}
