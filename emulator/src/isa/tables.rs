//! The opcode tables of the eight machines.
//!
//! Opcodes shared by the whole family keep the same code everywhere: the
//! arithmetic block 0x01-0x14, the jump block 0x80-0x96 and halt 0x99. What
//! varies is the operand format, the instruction length and the handful of
//! machine-specific opcodes (moves, stack and register operations).

use super::{
    Format, InstructionDef, JumpRule, MachineId, MachineSpec, Semantics, StackSpec, ACCUMULATOR,
    REGISTER_PAIR, SCRATCH_R1R2, THREE_ADDRESS,
};
use crate::alu::{AluOp, Predicate};

const fn def(
    opcode: u8,
    mnemonic: &'static str,
    cells: u32,
    format: Format,
    semantics: Semantics,
) -> InstructionDef {
    InstructionDef {
        opcode,
        mnemonic,
        cells,
        format,
        semantics,
    }
}

const fn arith(opcode: u8, mnemonic: &'static str, cells: u32, format: Format, op: AluOp) -> InstructionDef {
    def(opcode, mnemonic, cells, format, Semantics::Arith(op))
}

const fn cond(opcode: u8, mnemonic: &'static str, cells: u32, format: Format, p: Predicate) -> InstructionDef {
    def(opcode, mnemonic, cells, format, Semantics::CondJump(p))
}

pub(super) static MM3: MachineSpec = MachineSpec {
    id: MachineId::Mm3,
    cell_bits: 56,
    word_bits: 56,
    ir_bits: 56,
    alu: THREE_ADDRESS,
    stack: None,
    jump: JumpRule::Absolute,
    general_registers: false,
    instructions: &[
        def(0x00, "move", 1, Format::ThreeAddr, Semantics::Move),
        arith(0x01, "add", 1, Format::ThreeAddr, AluOp::Add),
        arith(0x02, "sub", 1, Format::ThreeAddr, AluOp::Sub),
        arith(0x03, "smul", 1, Format::ThreeAddr, AluOp::Smul),
        arith(0x04, "sdiv", 1, Format::ThreeAddr, AluOp::Sdiv),
        arith(0x13, "umul", 1, Format::ThreeAddr, AluOp::Umul),
        arith(0x14, "udiv", 1, Format::ThreeAddr, AluOp::Udiv),
        def(0x80, "jump", 1, Format::ThreeAddr, Semantics::Jump),
        cond(0x81, "jeq", 1, Format::ThreeAddr, Predicate::Equal),
        cond(0x82, "jneq", 1, Format::ThreeAddr, Predicate::NotEqual),
        cond(0x83, "sjl", 1, Format::ThreeAddr, Predicate::SignedLess),
        cond(0x84, "sjgeq", 1, Format::ThreeAddr, Predicate::SignedGreaterOrEqual),
        cond(0x85, "sjleq", 1, Format::ThreeAddr, Predicate::SignedLessOrEqual),
        cond(0x86, "sjg", 1, Format::ThreeAddr, Predicate::SignedGreater),
        cond(0x93, "ujl", 1, Format::ThreeAddr, Predicate::UnsignedLess),
        cond(0x94, "ujgeq", 1, Format::ThreeAddr, Predicate::UnsignedGreaterOrEqual),
        cond(0x95, "ujleq", 1, Format::ThreeAddr, Predicate::UnsignedLessOrEqual),
        cond(0x96, "ujg", 1, Format::ThreeAddr, Predicate::UnsignedGreater),
        def(0x99, "halt", 1, Format::Plain, Semantics::Halt),
    ],
};

pub(super) static MM2: MachineSpec = MachineSpec {
    id: MachineId::Mm2,
    cell_bits: 40,
    word_bits: 40,
    ir_bits: 40,
    alu: SCRATCH_R1R2,
    stack: None,
    jump: JumpRule::Absolute,
    general_registers: false,
    instructions: &[
        def(0x00, "move", 1, Format::TwoAddr, Semantics::Move),
        arith(0x01, "add", 1, Format::TwoAddr, AluOp::Add),
        arith(0x02, "sub", 1, Format::TwoAddr, AluOp::Sub),
        arith(0x03, "smul", 1, Format::TwoAddr, AluOp::Smul),
        arith(0x04, "sdiv", 1, Format::TwoAddr, AluOp::Sdiv),
        def(0x05, "comp", 1, Format::TwoAddr, Semantics::Compare),
        arith(0x13, "umul", 1, Format::TwoAddr, AluOp::Umul),
        arith(0x14, "udiv", 1, Format::TwoAddr, AluOp::Udiv),
        def(0x80, "jump", 1, Format::SecondAddr, Semantics::Jump),
        cond(0x81, "jeq", 1, Format::SecondAddr, Predicate::Equal),
        cond(0x82, "jneq", 1, Format::SecondAddr, Predicate::NotEqual),
        cond(0x83, "sjl", 1, Format::SecondAddr, Predicate::SignedLess),
        cond(0x84, "sjgeq", 1, Format::SecondAddr, Predicate::SignedGreaterOrEqual),
        cond(0x85, "sjleq", 1, Format::SecondAddr, Predicate::SignedLessOrEqual),
        cond(0x86, "sjg", 1, Format::SecondAddr, Predicate::SignedGreater),
        cond(0x93, "ujl", 1, Format::SecondAddr, Predicate::UnsignedLess),
        cond(0x94, "ujgeq", 1, Format::SecondAddr, Predicate::UnsignedGreaterOrEqual),
        cond(0x95, "ujleq", 1, Format::SecondAddr, Predicate::UnsignedLessOrEqual),
        cond(0x96, "ujg", 1, Format::SecondAddr, Predicate::UnsignedGreater),
        def(0x99, "halt", 1, Format::Plain, Semantics::Halt),
    ],
};

pub(super) static MMV: MachineSpec = MachineSpec {
    id: MachineId::Mmv,
    cell_bits: 8,
    word_bits: 40,
    ir_bits: 40,
    alu: SCRATCH_R1R2,
    stack: None,
    jump: JumpRule::Absolute,
    general_registers: false,
    instructions: &[
        def(0x00, "move", 5, Format::TwoAddr, Semantics::Move),
        arith(0x01, "add", 5, Format::TwoAddr, AluOp::Add),
        arith(0x02, "sub", 5, Format::TwoAddr, AluOp::Sub),
        arith(0x03, "smul", 5, Format::TwoAddr, AluOp::Smul),
        arith(0x04, "sdiv", 5, Format::TwoAddr, AluOp::Sdiv),
        def(0x05, "comp", 5, Format::TwoAddr, Semantics::Compare),
        arith(0x13, "umul", 5, Format::TwoAddr, AluOp::Umul),
        arith(0x14, "udiv", 5, Format::TwoAddr, AluOp::Udiv),
        def(0x80, "jump", 3, Format::FirstAddr, Semantics::Jump),
        cond(0x81, "jeq", 3, Format::FirstAddr, Predicate::Equal),
        cond(0x82, "jneq", 3, Format::FirstAddr, Predicate::NotEqual),
        cond(0x83, "sjl", 3, Format::FirstAddr, Predicate::SignedLess),
        cond(0x84, "sjgeq", 3, Format::FirstAddr, Predicate::SignedGreaterOrEqual),
        cond(0x85, "sjleq", 3, Format::FirstAddr, Predicate::SignedLessOrEqual),
        cond(0x86, "sjg", 3, Format::FirstAddr, Predicate::SignedGreater),
        cond(0x93, "ujl", 3, Format::FirstAddr, Predicate::UnsignedLess),
        cond(0x94, "ujgeq", 3, Format::FirstAddr, Predicate::UnsignedGreaterOrEqual),
        cond(0x95, "ujleq", 3, Format::FirstAddr, Predicate::UnsignedLessOrEqual),
        cond(0x96, "ujg", 3, Format::FirstAddr, Predicate::UnsignedGreater),
        def(0x99, "halt", 1, Format::Plain, Semantics::Halt),
    ],
};

pub(super) static MM1: MachineSpec = MachineSpec {
    id: MachineId::Mm1,
    cell_bits: 24,
    word_bits: 24,
    ir_bits: 24,
    alu: ACCUMULATOR,
    stack: None,
    jump: JumpRule::Absolute,
    general_registers: false,
    instructions: &[
        def(0x00, "load", 1, Format::FirstAddr, Semantics::Load),
        arith(0x01, "add", 1, Format::FirstAddr, AluOp::Add),
        arith(0x02, "sub", 1, Format::FirstAddr, AluOp::Sub),
        arith(0x03, "smul", 1, Format::FirstAddr, AluOp::Smul),
        arith(0x04, "sdiv", 1, Format::FirstAddr, AluOp::Sdiv),
        def(0x05, "comp", 1, Format::FirstAddr, Semantics::Compare),
        def(0x10, "store", 1, Format::FirstAddr, Semantics::Store),
        arith(0x13, "umul", 1, Format::FirstAddr, AluOp::Umul),
        arith(0x14, "udiv", 1, Format::FirstAddr, AluOp::Udiv),
        def(0x20, "swap", 1, Format::Plain, Semantics::Swap),
        def(0x80, "jump", 1, Format::FirstAddr, Semantics::Jump),
        cond(0x81, "jeq", 1, Format::FirstAddr, Predicate::Equal),
        cond(0x82, "jneq", 1, Format::FirstAddr, Predicate::NotEqual),
        cond(0x83, "sjl", 1, Format::FirstAddr, Predicate::SignedLess),
        cond(0x84, "sjgeq", 1, Format::FirstAddr, Predicate::SignedGreaterOrEqual),
        cond(0x85, "sjleq", 1, Format::FirstAddr, Predicate::SignedLessOrEqual),
        cond(0x86, "sjg", 1, Format::FirstAddr, Predicate::SignedGreater),
        cond(0x93, "ujl", 1, Format::FirstAddr, Predicate::UnsignedLess),
        cond(0x94, "ujgeq", 1, Format::FirstAddr, Predicate::UnsignedGreaterOrEqual),
        cond(0x95, "ujleq", 1, Format::FirstAddr, Predicate::UnsignedLessOrEqual),
        cond(0x96, "ujg", 1, Format::FirstAddr, Predicate::UnsignedGreater),
        def(0x99, "halt", 1, Format::Plain, Semantics::Halt),
    ],
};

pub(super) static MMS: MachineSpec = MachineSpec {
    id: MachineId::Mms,
    cell_bits: 8,
    word_bits: 24,
    ir_bits: 24,
    alu: SCRATCH_R1R2,
    stack: Some(StackSpec {
        slot_cells: 3,
        stack_io: false,
    }),
    jump: JumpRule::Absolute,
    general_registers: false,
    instructions: &[
        arith(0x01, "add", 1, Format::Plain, AluOp::Add),
        arith(0x02, "sub", 1, Format::Plain, AluOp::Sub),
        arith(0x03, "smul", 1, Format::Plain, AluOp::Smul),
        arith(0x04, "sdiv", 1, Format::Plain, AluOp::Sdiv),
        def(0x05, "comp", 1, Format::Plain, Semantics::Compare),
        arith(0x13, "umul", 1, Format::Plain, AluOp::Umul),
        arith(0x14, "udiv", 1, Format::Plain, AluOp::Udiv),
        def(0x5a, "push", 3, Format::FirstAddr, Semantics::Push),
        def(0x5b, "pop", 3, Format::FirstAddr, Semantics::Pop),
        def(0x5c, "dup", 1, Format::Plain, Semantics::Dup),
        def(0x5d, "swap", 1, Format::Plain, Semantics::Swap),
        def(0x80, "jump", 3, Format::FirstAddr, Semantics::Jump),
        cond(0x81, "jeq", 3, Format::FirstAddr, Predicate::Equal),
        cond(0x82, "jneq", 3, Format::FirstAddr, Predicate::NotEqual),
        cond(0x83, "sjl", 3, Format::FirstAddr, Predicate::SignedLess),
        cond(0x84, "sjgeq", 3, Format::FirstAddr, Predicate::SignedGreaterOrEqual),
        cond(0x85, "sjleq", 3, Format::FirstAddr, Predicate::SignedLessOrEqual),
        cond(0x86, "sjg", 3, Format::FirstAddr, Predicate::SignedGreater),
        cond(0x93, "ujl", 3, Format::FirstAddr, Predicate::UnsignedLess),
        cond(0x94, "ujgeq", 3, Format::FirstAddr, Predicate::UnsignedGreaterOrEqual),
        cond(0x95, "ujleq", 3, Format::FirstAddr, Predicate::UnsignedLessOrEqual),
        cond(0x96, "ujg", 3, Format::FirstAddr, Predicate::UnsignedGreater),
        def(0x99, "halt", 1, Format::Plain, Semantics::Halt),
    ],
};

pub(super) static MM0: MachineSpec = MachineSpec {
    id: MachineId::Mm0,
    cell_bits: 16,
    word_bits: 16,
    ir_bits: 16,
    alu: SCRATCH_R1R2,
    stack: Some(StackSpec {
        slot_cells: 1,
        stack_io: true,
    }),
    jump: JumpRule::Relative,
    general_registers: false,
    instructions: &[
        arith(0x01, "add", 1, Format::Byte, AluOp::Add),
        arith(0x02, "sub", 1, Format::Byte, AluOp::Sub),
        arith(0x03, "smul", 1, Format::Byte, AluOp::Smul),
        arith(0x04, "sdiv", 1, Format::Byte, AluOp::Sdiv),
        def(0x05, "comp", 1, Format::Byte, Semantics::Compare),
        arith(0x13, "umul", 1, Format::Byte, AluOp::Umul),
        arith(0x14, "udiv", 1, Format::Byte, AluOp::Udiv),
        def(0x40, "push", 1, Format::Byte, Semantics::Push),
        def(0x5b, "pop", 1, Format::Byte, Semantics::Pop),
        def(0x5c, "dup", 1, Format::Byte, Semantics::Dup),
        def(0x5d, "swap", 1, Format::Byte, Semantics::Swap),
        def(0x80, "jump", 1, Format::Byte, Semantics::Jump),
        cond(0x81, "jeq", 1, Format::Byte, Predicate::Equal),
        cond(0x82, "jneq", 1, Format::Byte, Predicate::NotEqual),
        cond(0x83, "sjl", 1, Format::Byte, Predicate::SignedLess),
        cond(0x84, "sjgeq", 1, Format::Byte, Predicate::SignedGreaterOrEqual),
        cond(0x85, "sjleq", 1, Format::Byte, Predicate::SignedLessOrEqual),
        cond(0x86, "sjg", 1, Format::Byte, Predicate::SignedGreater),
        cond(0x93, "ujl", 1, Format::Byte, Predicate::UnsignedLess),
        cond(0x94, "ujgeq", 1, Format::Byte, Predicate::UnsignedGreaterOrEqual),
        cond(0x95, "ujleq", 1, Format::Byte, Predicate::UnsignedLessOrEqual),
        cond(0x96, "ujg", 1, Format::Byte, Predicate::UnsignedGreater),
        def(0x99, "halt", 1, Format::Plain, Semantics::Halt),
    ],
};

pub(super) static MMR: MachineSpec = MachineSpec {
    id: MachineId::Mmr,
    cell_bits: 16,
    word_bits: 32,
    ir_bits: 32,
    alu: REGISTER_PAIR,
    stack: None,
    jump: JumpRule::Absolute,
    general_registers: true,
    instructions: &[
        def(0x00, "load", 2, Format::RegAddr, Semantics::Load),
        arith(0x01, "add", 2, Format::RegAddr, AluOp::Add),
        arith(0x02, "sub", 2, Format::RegAddr, AluOp::Sub),
        arith(0x03, "smul", 2, Format::RegAddr, AluOp::Smul),
        arith(0x04, "sdiv", 2, Format::RegAddr, AluOp::Sdiv),
        def(0x05, "comp", 2, Format::RegAddr, Semantics::Compare),
        def(0x10, "store", 2, Format::RegAddr, Semantics::Store),
        arith(0x13, "umul", 2, Format::RegAddr, AluOp::Umul),
        arith(0x14, "udiv", 2, Format::RegAddr, AluOp::Udiv),
        def(0x20, "rmove", 1, Format::RegReg, Semantics::RegMove),
        def(0x21, "radd", 1, Format::RegReg, Semantics::RegArith(AluOp::Add)),
        def(0x22, "rsub", 1, Format::RegReg, Semantics::RegArith(AluOp::Sub)),
        def(0x23, "rsmul", 1, Format::RegReg, Semantics::RegArith(AluOp::Smul)),
        def(0x24, "rsdiv", 1, Format::RegReg, Semantics::RegArith(AluOp::Sdiv)),
        def(0x25, "rcomp", 1, Format::RegReg, Semantics::RegCompare),
        def(0x33, "rumul", 1, Format::RegReg, Semantics::RegArith(AluOp::Umul)),
        def(0x34, "rudiv", 1, Format::RegReg, Semantics::RegArith(AluOp::Udiv)),
        def(0x80, "jump", 2, Format::RegAddr, Semantics::Jump),
        cond(0x81, "jeq", 2, Format::RegAddr, Predicate::Equal),
        cond(0x82, "jneq", 2, Format::RegAddr, Predicate::NotEqual),
        cond(0x83, "sjl", 2, Format::RegAddr, Predicate::SignedLess),
        cond(0x84, "sjgeq", 2, Format::RegAddr, Predicate::SignedGreaterOrEqual),
        cond(0x85, "sjleq", 2, Format::RegAddr, Predicate::SignedLessOrEqual),
        cond(0x86, "sjg", 2, Format::RegAddr, Predicate::SignedGreater),
        cond(0x93, "ujl", 2, Format::RegAddr, Predicate::UnsignedLess),
        cond(0x94, "ujgeq", 2, Format::RegAddr, Predicate::UnsignedGreaterOrEqual),
        cond(0x95, "ujleq", 2, Format::RegAddr, Predicate::UnsignedLessOrEqual),
        cond(0x96, "ujg", 2, Format::RegAddr, Predicate::UnsignedGreater),
        def(0x99, "halt", 1, Format::Plain, Semantics::Halt),
    ],
};

pub(super) static MMM: MachineSpec = MachineSpec {
    id: MachineId::Mmm,
    cell_bits: 16,
    word_bits: 32,
    ir_bits: 32,
    alu: REGISTER_PAIR,
    stack: None,
    jump: JumpRule::Modified,
    general_registers: true,
    instructions: &[
        def(0x00, "load", 2, Format::RegAddr, Semantics::Load),
        arith(0x01, "add", 2, Format::RegAddr, AluOp::Add),
        arith(0x02, "sub", 2, Format::RegAddr, AluOp::Sub),
        arith(0x03, "smul", 2, Format::RegAddr, AluOp::Smul),
        arith(0x04, "sdiv", 2, Format::RegAddr, AluOp::Sdiv),
        def(0x05, "comp", 2, Format::RegAddr, Semantics::Compare),
        def(0x10, "store", 2, Format::RegAddr, Semantics::Store),
        def(0x11, "addr", 2, Format::RegAddr, Semantics::EffectiveAddress),
        arith(0x13, "umul", 2, Format::RegAddr, AluOp::Umul),
        arith(0x14, "udiv", 2, Format::RegAddr, AluOp::Udiv),
        def(0x20, "rmove", 1, Format::RegReg, Semantics::RegMove),
        def(0x21, "radd", 1, Format::RegReg, Semantics::RegArith(AluOp::Add)),
        def(0x22, "rsub", 1, Format::RegReg, Semantics::RegArith(AluOp::Sub)),
        def(0x23, "rsmul", 1, Format::RegReg, Semantics::RegArith(AluOp::Smul)),
        def(0x24, "rsdiv", 1, Format::RegReg, Semantics::RegArith(AluOp::Sdiv)),
        def(0x25, "rcomp", 1, Format::RegReg, Semantics::RegCompare),
        def(0x33, "rumul", 1, Format::RegReg, Semantics::RegArith(AluOp::Umul)),
        def(0x34, "rudiv", 1, Format::RegReg, Semantics::RegArith(AluOp::Udiv)),
        def(0x80, "jump", 2, Format::RegAddr, Semantics::Jump),
        cond(0x81, "jeq", 2, Format::RegAddr, Predicate::Equal),
        cond(0x82, "jneq", 2, Format::RegAddr, Predicate::NotEqual),
        cond(0x83, "sjl", 2, Format::RegAddr, Predicate::SignedLess),
        cond(0x84, "sjgeq", 2, Format::RegAddr, Predicate::SignedGreaterOrEqual),
        cond(0x85, "sjleq", 2, Format::RegAddr, Predicate::SignedLessOrEqual),
        cond(0x86, "sjg", 2, Format::RegAddr, Predicate::SignedGreater),
        cond(0x93, "ujl", 2, Format::RegAddr, Predicate::UnsignedLess),
        cond(0x94, "ujgeq", 2, Format::RegAddr, Predicate::UnsignedGreaterOrEqual),
        cond(0x95, "ujleq", 2, Format::RegAddr, Predicate::UnsignedLessOrEqual),
        cond(0x96, "ujg", 2, Format::RegAddr, Predicate::UnsignedGreater),
        def(0x99, "halt", 1, Format::Plain, Semantics::Halt),
    ],
};
