//! Instruction-set descriptions for the eight machines.
//!
//! Each machine is described declaratively: a configuration record (cell and
//! word widths, ALU register binding, stack and jump policy) plus a table
//! mapping opcodes to mnemonic, operand format, length and a semantics tag.
//! The control unit consumes these tables; it contains no per-opcode logic of
//! its own beyond dispatching on the semantics tag.

use std::str::FromStr;

use parse_display::Display;
use thiserror::Error;

use crate::alu::{AluOp, AluRegisters, Predicate};
use crate::constants::{ADDRESS_BITS, OPCODE_BITS, REG_NO_BITS};
use crate::memory::RegisterName;

mod tables;

/// The eight machine identifiers, as spelt in `.cpu` directives.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineId {
    /// Three-address machine
    #[display("mm-3")]
    Mm3,
    /// Two-address machine
    #[display("mm-2")]
    Mm2,
    /// Variable-length machine
    #[display("mm-v")]
    Mmv,
    /// One-address (accumulator) machine
    #[display("mm-1")]
    Mm1,
    /// Stack machine
    #[display("mm-s")]
    Mms,
    /// Address-less stack machine
    #[display("mm-0")]
    Mm0,
    /// Register machine
    #[display("mm-r")]
    Mmr,
    /// Register machine with address modification
    #[display("mm-m")]
    Mmm,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown cpu `{0}`")]
pub struct UnknownCpu(pub String);

impl FromStr for MachineId {
    type Err = UnknownCpu;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mm-3" => Ok(Self::Mm3),
            "mm-2" => Ok(Self::Mm2),
            "mm-v" => Ok(Self::Mmv),
            "mm-1" => Ok(Self::Mm1),
            "mm-s" => Ok(Self::Mms),
            "mm-0" => Ok(Self::Mm0),
            "mm-r" => Ok(Self::Mmr),
            "mm-m" => Ok(Self::Mmm),
            other => Err(UnknownCpu(other.into())),
        }
    }
}

/// Layout of the operand fields that follow the opcode byte.
///
/// Field positions are fixed per format: fields are located at their offset
/// from the most significant end of the (left-aligned) instruction register,
/// so short instructions and zero-padded fields share one extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Opcode only.
    Plain,
    /// Three 16-bit addresses.
    ThreeAddr,
    /// Two 16-bit addresses.
    TwoAddr,
    /// One 16-bit address directly after the opcode.
    FirstAddr,
    /// One 16-bit address in the second-address slot, the first padded zero.
    SecondAddr,
    /// One 8-bit immediate or displacement.
    Byte,
    /// Two register nibbles.
    RegReg,
    /// Two register nibbles followed by a 16-bit address.
    RegAddr,
}

/// What an instruction does, independent of how its machine encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantics {
    /// Memory-to-memory copy.
    Move,
    /// Memory to accumulator/register.
    Load,
    /// Accumulator/register to memory.
    Store,
    /// Arithmetic with a memory operand.
    Arith(AluOp),
    /// Compare (subtract, discard result, keep flags).
    Compare,
    /// Register-register arithmetic (register machines).
    RegArith(AluOp),
    /// Register-register copy.
    RegMove,
    /// Register-register compare.
    RegCompare,
    /// Load the effective address itself (modification machine).
    EffectiveAddress,
    Push,
    Pop,
    Dup,
    Swap,
    Jump,
    CondJump(Predicate),
    Halt,
}

/// One row of a machine's opcode table.
#[derive(Debug, Clone, Copy)]
pub struct InstructionDef {
    pub opcode: u8,
    pub mnemonic: &'static str,
    /// Total length in cells, opcode included.
    pub cells: u32,
    pub format: Format,
    pub semantics: Semantics,
}

/// How jump targets are formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpRule {
    /// The operand address is the target.
    Absolute,
    /// The sign-extended operand is added to the instruction's own address.
    Relative,
    /// The operand address is offset by the modifier register.
    Modified,
}

/// Stack layout for the stack machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackSpec {
    /// Cells per stack slot.
    pub slot_cells: u32,
    /// I/O bindings address stack slots instead of memory.
    pub stack_io: bool,
}

/// The full configuration record of one machine.
#[derive(Debug, Clone, Copy)]
pub struct MachineSpec {
    pub id: MachineId,
    /// Width of one addressable memory cell.
    pub cell_bits: u32,
    /// Width of an arithmetic word.
    pub word_bits: u32,
    /// Width of the instruction register: the longest instruction.
    pub ir_bits: u32,
    pub alu: AluRegisters,
    pub stack: Option<StackSpec>,
    pub jump: JumpRule,
    /// The machines with guest-addressable general registers R0..RF.
    pub general_registers: bool,
    pub instructions: &'static [InstructionDef],
}

impl MachineSpec {
    pub fn of(id: MachineId) -> &'static MachineSpec {
        match id {
            MachineId::Mm3 => &tables::MM3,
            MachineId::Mm2 => &tables::MM2,
            MachineId::Mmv => &tables::MMV,
            MachineId::Mm1 => &tables::MM1,
            MachineId::Mms => &tables::MMS,
            MachineId::Mm0 => &tables::MM0,
            MachineId::Mmr => &tables::MMR,
            MachineId::Mmm => &tables::MMM,
        }
    }

    /// Cells per arithmetic word.
    pub fn word_cells(&self) -> u32 {
        self.word_bits / self.cell_bits
    }

    pub fn decode(&self, opcode: u8) -> Option<&'static InstructionDef> {
        self.instructions.iter().find(|def| def.opcode == opcode)
    }

    pub fn by_mnemonic(&self, mnemonic: &str) -> Option<&'static InstructionDef> {
        self.instructions.iter().find(|def| def.mnemonic == mnemonic)
    }
}

/// The ALU register bindings reused across machines.
pub(crate) const SCRATCH_R1R2: AluRegisters = AluRegisters {
    s: RegisterName::R1,
    res: RegisterName::R2,
    r1: RegisterName::R1,
    r2: RegisterName::R2,
};

pub(crate) const ACCUMULATOR: AluRegisters = AluRegisters {
    s: RegisterName::S,
    res: RegisterName::S1,
    r1: RegisterName::S,
    r2: RegisterName::R,
};

pub(crate) const REGISTER_PAIR: AluRegisters = AluRegisters {
    s: RegisterName::S,
    res: RegisterName::S1,
    r1: RegisterName::S,
    r2: RegisterName::S1,
};

pub(crate) const THREE_ADDRESS: AluRegisters = AluRegisters {
    s: RegisterName::S,
    res: RegisterName::R1,
    r1: RegisterName::R1,
    r2: RegisterName::R2,
};

const _: () = {
    assert!(OPCODE_BITS == 8);
    assert!(ADDRESS_BITS == 16);
    assert!(REG_NO_BITS == 4);
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [MachineId; 8] = [
        MachineId::Mm3,
        MachineId::Mm2,
        MachineId::Mmv,
        MachineId::Mm1,
        MachineId::Mms,
        MachineId::Mm0,
        MachineId::Mmr,
        MachineId::Mmm,
    ];

    #[test]
    fn id_round_trip_test() {
        for id in ALL {
            assert_eq!(id.to_string().parse::<MachineId>(), Ok(id));
        }
        assert!("mm-x".parse::<MachineId>().is_err());
    }

    #[test]
    fn tables_are_consistent_test() {
        for id in ALL {
            let spec = MachineSpec::of(id);
            assert_eq!(spec.id, id);
            assert_eq!(spec.word_bits % spec.cell_bits, 0, "{id}");
            assert_eq!(spec.ir_bits % spec.cell_bits, 0, "{id}");

            // opcodes are unique within a machine
            for (i, a) in spec.instructions.iter().enumerate() {
                for b in &spec.instructions[i + 1..] {
                    assert_ne!(a.opcode, b.opcode, "{id}: duplicate {:#04x}", a.opcode);
                }
                // no instruction is longer than the instruction register
                assert!(a.cells * spec.cell_bits <= spec.ir_bits, "{id} {}", a.mnemonic);
            }
        }
    }

    #[test]
    fn halt_is_universal_test() {
        for id in ALL {
            let spec = MachineSpec::of(id);
            let halt = spec.decode(0x99).expect("halt missing");
            assert_eq!(halt.semantics, Semantics::Halt);
            assert_eq!(halt.mnemonic, "halt");
        }
    }

    #[test]
    fn common_arithmetic_opcodes_test() {
        for id in ALL {
            let spec = MachineSpec::of(id);
            for (code, op) in [
                (0x01, AluOp::Add),
                (0x02, AluOp::Sub),
                (0x03, AluOp::Smul),
                (0x04, AluOp::Sdiv),
                (0x13, AluOp::Umul),
                (0x14, AluOp::Udiv),
            ] {
                let def = spec.decode(code).expect("arithmetic opcode missing");
                assert_eq!(def.semantics, Semantics::Arith(op), "{id} {code:#04x}");
            }
        }
    }

    #[test]
    fn common_jump_opcodes_test() {
        use Predicate::*;
        for id in ALL {
            let spec = MachineSpec::of(id);
            assert_eq!(spec.decode(0x80).unwrap().semantics, Semantics::Jump);
            for (code, pred) in [
                (0x81, Equal),
                (0x82, NotEqual),
                (0x83, SignedLess),
                (0x84, SignedGreaterOrEqual),
                (0x85, SignedLessOrEqual),
                (0x86, SignedGreater),
                (0x93, UnsignedLess),
                (0x94, UnsignedGreaterOrEqual),
                (0x95, UnsignedLessOrEqual),
                (0x96, UnsignedGreater),
            ] {
                let def = spec.decode(code).expect("jump opcode missing");
                assert_eq!(def.semantics, Semantics::CondJump(pred), "{id} {code:#04x}");
            }
        }
    }
}
