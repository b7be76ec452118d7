//! Single-step and inspection surface for the interactive front-end.
//!
//! The debugger wraps a loaded [`Computer`]: stepping, running to a halt or
//! a breakpoint, and snapshotting registers and the initialised memory
//! spans. Stops happen only at step boundaries.

use std::collections::BTreeSet;

use crate::constants::ADDRESS_BITS;
use crate::memory::RegisterName;
use crate::runtime::{Computer, Exception, Status};
use crate::word::Word;

/// Why the debugger paused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopCause {
    /// Still runnable; the requested number of steps was executed.
    Paused,
    /// The next instruction sits on a breakpoint.
    Breakpoint(u16),
    Halted,
    Failed(Exception),
    StepLimitExceeded,
}

/// A read-only view of the machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub registers: Vec<(RegisterName, Word)>,
    /// Initialised memory, one entry per contiguous run of cells.
    pub memory: Vec<MemorySpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySpan {
    pub address: u16,
    pub cells: Vec<Word>,
}

pub struct Debugger<'a> {
    computer: &'a mut Computer,
    breakpoints: BTreeSet<u16>,
}

impl<'a> Debugger<'a> {
    pub fn new(computer: &'a mut Computer) -> Self {
        Self {
            computer,
            breakpoints: BTreeSet::new(),
        }
    }

    pub fn computer(&self) -> &Computer {
        self.computer
    }

    pub fn set_breakpoint(&mut self, address: u16) {
        self.breakpoints.insert(address);
    }

    pub fn clear_breakpoint(&mut self, address: u16) {
        self.breakpoints.remove(&address);
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = u16> + '_ {
        self.breakpoints.iter().copied()
    }

    pub fn cycles(&self) -> u64 {
        self.computer.cycles()
    }

    fn stopped(&self) -> Option<StopCause> {
        match self.computer.status() {
            Status::Halted => Some(StopCause::Halted),
            Status::Failed => self.computer.failure().cloned().map(StopCause::Failed),
            Status::Running => None,
        }
    }

    /// Execute `count` instructions, stopping early on halt or fault.
    pub fn step(&mut self, count: u64) -> StopCause {
        for _ in 0..count {
            if let Some(cause) = self.stopped() {
                return cause;
            }
            let _ = self.computer.step();
        }
        self.stopped().unwrap_or(StopCause::Paused)
    }

    /// Run until halt, fault, breakpoint or the optional step budget.
    pub fn run(&mut self, limit: Option<u64>) -> StopCause {
        let mut steps = 0u64;
        loop {
            if let Some(cause) = self.stopped() {
                return cause;
            }
            if limit.is_some_and(|l| steps >= l) {
                return StopCause::StepLimitExceeded;
            }
            let _ = self.computer.step();
            steps += 1;

            let pc = self.computer.pc().unsigned() as u16;
            if self.computer.status() == Status::Running && self.breakpoints.contains(&pc) {
                return StopCause::Breakpoint(pc);
            }
        }
    }

    /// Snapshot the registers and every initialised memory span.
    pub fn read_state(&self) -> Snapshot {
        let registers = self.computer.registers.state();
        let memory = self
            .computer
            .ram
            .filled_spans()
            .into_iter()
            .map(|(start, len)| {
                let cells = (0..len)
                    .filter_map(|i| {
                        self.computer
                            .ram
                            .fetch(
                                Word::new(start + i, ADDRESS_BITS),
                                self.computer.spec.cell_bits,
                            )
                            .ok()
                    })
                    .collect();
                MemorySpan {
                    address: start as u16,
                    cells,
                }
            })
            .collect();
        Snapshot { registers, memory }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::MachineId;
    use crate::word::Word;

    fn looping_computer() -> Computer {
        let mut computer = Computer::new(MachineId::Mm2, true);
        // 0: add [5],[6]; 1: jump 0
        for (address, cell) in [
            (0u64, 0x0100050006u64),
            (1, 0x8000000000),
            (5, 0x0000000001),
            (6, 0x0000000002),
        ] {
            computer
                .ram
                .store(Word::new(address, ADDRESS_BITS), Word::new(cell, 40));
        }
        computer
    }

    #[test]
    fn step_and_cycles_test() {
        let mut computer = looping_computer();
        let mut debugger = Debugger::new(&mut computer);
        assert_eq!(debugger.step(3), StopCause::Paused);
        assert_eq!(debugger.cycles(), 3);
    }

    #[test]
    fn breakpoint_test() {
        let mut computer = looping_computer();
        let mut debugger = Debugger::new(&mut computer);
        debugger.set_breakpoint(1);
        assert_eq!(debugger.run(None), StopCause::Breakpoint(1));
        // resuming trips the same breakpoint one loop later
        assert_eq!(debugger.run(None), StopCause::Breakpoint(1));

        debugger.clear_breakpoint(1);
        assert_eq!(debugger.run(Some(10)), StopCause::StepLimitExceeded);
    }

    #[test]
    fn snapshot_test() {
        let mut computer = looping_computer();
        let mut debugger = Debugger::new(&mut computer);
        debugger.step(1);
        let snapshot = debugger.read_state();

        let pc = snapshot
            .registers
            .iter()
            .find(|(name, _)| *name == RegisterName::Pc)
            .map(|(_, value)| value.unsigned());
        assert_eq!(pc, Some(1));

        // the two code cells and the two data cells, plus [5] overwritten
        assert!(!snapshot.memory.is_empty());
        assert_eq!(snapshot.memory[0].address, 0);
    }
}
