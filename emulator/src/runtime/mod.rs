//! The control unit: one parameterised fetch-decode-execute loop.
//!
//! A single implementation drives all eight machines. Everything that varies
//! between them (instruction encodings, lengths, write-back conventions,
//! stack and jump policy) comes from the machine's
//! [`MachineSpec`](crate::isa::MachineSpec); the loop itself only dispatches
//! on the decoded semantics tag.

use parse_display::Display;
use tracing::debug;

use crate::alu::{Alu, AluOp, Flags, Predicate};
use crate::constants::{ADDRESS_BITS, MEMORY_SIZE, OPCODE_BITS, REG_NO_BITS};
use crate::isa::{Format, InstructionDef, JumpRule, MachineId, MachineSpec, Semantics};
use crate::memory::{Ram, RegisterFile, RegisterName};
use crate::word::Word;

mod exception;

pub use self::exception::Exception;

/// Whether the machine can execute another instruction.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display(style = "lowercase")]
pub enum Status {
    Running,
    /// HALT flag set by the program.
    Halted,
    /// Stopped by a guest fault.
    Failed,
}

/// Why a [`Computer::run`] call returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The program executed `halt`.
    Halted,
    /// A guest fault stopped the machine.
    Failed(Exception),
    /// The step budget ran out; the machine is still runnable.
    StepLimitExceeded,
}

/// An instruction after fetch: its table row plus the decoded operand fields.
#[derive(Debug, Clone, Copy)]
struct Decoded {
    def: &'static InstructionDef,
    /// Address the instruction was fetched from (PC has already advanced).
    at: Word,
    a1: Word,
    a2: Word,
    a3: Word,
    rx: u8,
    ry: u8,
    byte: Word,
}

/// One model machine: register file, RAM and the instruction-set description
/// driving the control unit.
pub struct Computer {
    pub spec: &'static MachineSpec,
    pub registers: RegisterFile,
    pub ram: Ram,
    alu: Alu,
    cycles: u64,
    failure: Option<Exception>,
}

impl Computer {
    pub fn new(id: MachineId, protected: bool) -> Self {
        let spec = MachineSpec::of(id);
        let alu = Alu::new(spec.alu, spec.word_bits);

        let mut registers = RegisterFile::new();
        registers.add(RegisterName::Pc, ADDRESS_BITS);
        registers.add(RegisterName::Addr, ADDRESS_BITS);
        registers.add(RegisterName::Ir, spec.ir_bits);
        alu.install(&mut registers);

        match id {
            MachineId::Mm3 => {
                registers.add(RegisterName::A1, ADDRESS_BITS);
                registers.add(RegisterName::A2, ADDRESS_BITS);
            }
            MachineId::Mm2 => registers.add(RegisterName::A1, ADDRESS_BITS),
            MachineId::Mm0 => {
                registers.add(RegisterName::Sp, ADDRESS_BITS);
                registers.add(RegisterName::A1, 8);
            }
            MachineId::Mms => registers.add(RegisterName::Sp, ADDRESS_BITS),
            MachineId::Mmr | MachineId::Mmm => {
                registers.add(RegisterName::R, REG_NO_BITS);
                registers.add(RegisterName::M, REG_NO_BITS);
                for index in 0..16 {
                    registers.add(RegisterName::general(index), spec.word_bits);
                }
            }
            MachineId::Mmv | MachineId::Mm1 => {}
        }

        Self {
            spec,
            registers,
            ram: Ram::new(spec.cell_bits, ADDRESS_BITS, protected),
            alu,
            cycles: 0,
            failure: None,
        }
    }

    pub fn status(&self) -> Status {
        if self.failure.is_some() {
            Status::Failed
        } else if self.flags().contains(Flags::HALT) {
            Status::Halted
        } else {
            Status::Running
        }
    }

    pub fn flags(&self) -> Flags {
        self.alu.flags(&self.registers)
    }

    /// The recorded fault, if the machine stopped on one.
    pub fn failure(&self) -> Option<&Exception> {
        self.failure.as_ref()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn pc(&self) -> Word {
        self.registers.get(RegisterName::Pc)
    }

    /// Execute one instruction.
    ///
    /// On a fault the machine records the reason, sets the HALT flag and
    /// returns the fault; further steps are no-ops.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn step(&mut self) -> Result<(), Exception> {
        if self.status() != Status::Running {
            return Ok(());
        }
        match self.fetch().and_then(|decoded| self.execute(&decoded)) {
            Ok(()) => {
                self.cycles += 1;
                Ok(())
            }
            Err(fault) => {
                debug!(%fault, "fault, stopping the machine");
                self.failure = Some(fault.clone());
                self.alu.halt(&mut self.registers);
                Err(fault)
            }
        }
    }

    /// Step until halt or fault, with an optional step budget.
    pub fn run(&mut self, limit: Option<u64>) -> StopReason {
        let mut steps = 0;
        while self.status() == Status::Running {
            if limit.is_some_and(|l| steps >= l) {
                return StopReason::StepLimitExceeded;
            }
            let _ = self.step();
            steps += 1;
        }
        match &self.failure {
            Some(fault) => StopReason::Failed(fault.clone()),
            None => StopReason::Halted,
        }
    }

    /// Read the instruction at PC, advance PC past it and split the operand
    /// fields according to the table row.
    fn fetch(&mut self) -> Result<Decoded, Exception> {
        let spec = self.spec;
        let at = self.pc();
        let first = self.ram.fetch(at, spec.cell_bits)?;
        let opcode = first
            .field(spec.cell_bits - OPCODE_BITS..spec.cell_bits)
            .unsigned() as u8;
        let def = spec
            .decode(opcode)
            .ok_or(Exception::InvalidOpcode { opcode })?;

        let instr_bits = def.cells * spec.cell_bits;
        let instr = if def.cells == 1 {
            first
        } else {
            let rest = self
                .ram
                .fetch(at + Word::new(1, ADDRESS_BITS), instr_bits - spec.cell_bits)?;
            Word::new(
                (first.unsigned() << rest.width()) | rest.unsigned(),
                instr_bits,
            )
        };

        // The instruction register is left-aligned so operand fields sit at
        // fixed positions regardless of the instruction length.
        let ir = Word::new(
            instr.unsigned() << (spec.ir_bits - instr_bits),
            spec.ir_bits,
        );
        self.registers.set(RegisterName::Ir, ir);
        self.registers
            .set(RegisterName::Pc, at + Word::new(u64::from(def.cells), ADDRESS_BITS));

        debug!(mnemonic = def.mnemonic, %at, "fetched instruction");
        Ok(self.split_fields(def, at, ir))
    }

    fn split_fields(&mut self, def: &'static InstructionDef, at: Word, ir: Word) -> Decoded {
        let bits = self.spec.ir_bits;
        // A 16-bit field `offset` bits after the opcode's own byte.
        let addr_field = |offset: u32| ir.field(bits - OPCODE_BITS - offset - 16..bits - OPCODE_BITS - offset);

        let mut decoded = Decoded {
            def,
            at,
            a1: Word::zero(ADDRESS_BITS),
            a2: Word::zero(ADDRESS_BITS),
            a3: Word::zero(ADDRESS_BITS),
            rx: 0,
            ry: 0,
            byte: Word::zero(8),
        };

        match def.format {
            Format::Plain => {}
            Format::ThreeAddr => {
                decoded.a1 = addr_field(0);
                decoded.a2 = addr_field(16);
                decoded.a3 = addr_field(32);
            }
            Format::TwoAddr => {
                decoded.a1 = addr_field(0);
                decoded.a2 = addr_field(16);
            }
            Format::FirstAddr => decoded.a1 = addr_field(0),
            Format::SecondAddr => decoded.a2 = addr_field(16),
            Format::Byte => decoded.byte = ir.field(bits - 16..bits - 8),
            Format::RegReg | Format::RegAddr => {
                decoded.rx = ir.field(bits - 12..bits - 8).unsigned() as u8;
                decoded.ry = ir.field(bits - 16..bits - 12).unsigned() as u8;
                if def.format == Format::RegAddr {
                    decoded.a1 = addr_field(8);
                }
            }
        }

        self.mirror_fields(&decoded);
        decoded
    }

    /// Keep the operand registers in sync with the decoded fields so the
    /// debugger shows what the control unit saw.
    fn mirror_fields(&mut self, d: &Decoded) {
        match self.spec.id {
            MachineId::Mm3 => {
                self.registers.set(RegisterName::A1, d.a1);
                self.registers.set(RegisterName::A2, d.a2);
                self.registers.set(RegisterName::Addr, d.a3);
            }
            MachineId::Mm2 => {
                self.registers.set(RegisterName::A1, d.a1);
                self.registers.set(RegisterName::Addr, d.a2);
            }
            MachineId::Mmv | MachineId::Mm1 | MachineId::Mms => {
                self.registers.set(RegisterName::Addr, d.a1);
            }
            MachineId::Mm0 => {
                self.registers.set(RegisterName::A1, Word::new(d.byte.unsigned(), 8));
                let target = d.at + Word::from_signed(d.byte.signed(), ADDRESS_BITS);
                self.registers.set(RegisterName::Addr, target);
            }
            MachineId::Mmr | MachineId::Mmm => {
                self.registers.set(RegisterName::R, Word::new(u64::from(d.rx), REG_NO_BITS));
                self.registers.set(RegisterName::M, Word::new(u64::from(d.ry), REG_NO_BITS));
                self.registers.set(RegisterName::Addr, d.a1);
            }
        }
    }

    // ------------------------------------------------------------------
    // Addressing helpers

    fn word_at(&self, address: Word) -> Result<Word, Exception> {
        Ok(self.ram.fetch(address, self.spec.word_bits)?)
    }

    fn put_word(&mut self, address: Word, value: Word) {
        self.ram.store(address, value);
    }

    /// The word-sized step between two consecutive words in memory.
    fn word_cells(&self) -> Word {
        Word::new(u64::from(self.spec.word_cells()), ADDRESS_BITS)
    }

    /// The modifier contribution on the modification machine: the low 16
    /// bits of the register selected by the ry nibble, zero when ry = 0.
    fn modifier(&self, ry: u8) -> Word {
        if ry == 0 {
            Word::zero(ADDRESS_BITS)
        } else {
            self.registers.get(RegisterName::general(ry)).field(0..ADDRESS_BITS)
        }
    }

    /// Effective address of a memory operand on the register machines.
    fn operand_address(&self, d: &Decoded) -> Word {
        match self.spec.jump {
            JumpRule::Modified => d.a1 + self.modifier(d.ry),
            _ => d.a1,
        }
    }

    fn jump_target(&self, d: &Decoded) -> Word {
        match self.spec.id {
            MachineId::Mm3 => d.a3,
            MachineId::Mm2 => d.a2,
            MachineId::Mmv | MachineId::Mm1 | MachineId::Mms => d.a1,
            MachineId::Mm0 => d.at + Word::from_signed(d.byte.signed(), ADDRESS_BITS),
            MachineId::Mmr => d.a1,
            MachineId::Mmm => d.a1 + self.modifier(d.ry),
        }
    }

    // ------------------------------------------------------------------
    // Stack helpers

    fn slot_cells(&self) -> u64 {
        u64::from(self.spec.stack.map(|s| s.slot_cells).unwrap_or(1))
    }

    /// Number of live stack slots. SP = 0 means an empty stack; the stack
    /// grows downwards from the top of memory.
    pub fn stack_size(&self) -> u64 {
        let sp = self.registers.get(RegisterName::Sp).unsigned();
        if sp == 0 {
            0
        } else {
            (MEMORY_SIZE - sp) / self.slot_cells()
        }
    }

    /// Address of the stack slot `depth` slots below the top.
    fn stack_slot(&self, depth: u64) -> Result<Word, Exception> {
        if self.stack_size() <= depth {
            return Err(Exception::StackUnderflow);
        }
        let sp = self.registers.get(RegisterName::Sp);
        Ok(sp + Word::new(depth * self.slot_cells(), ADDRESS_BITS))
    }

    /// Make room for one more slot and return its address.
    fn stack_push_slot(&mut self) -> Result<Word, Exception> {
        if (self.stack_size() + 1) * self.slot_cells() > MEMORY_SIZE {
            return Err(Exception::StackOverflow);
        }
        let sp = self.registers.get(RegisterName::Sp)
            - Word::new(self.slot_cells(), ADDRESS_BITS);
        self.registers.set(RegisterName::Sp, sp);
        Ok(sp)
    }

    /// Drop `slots` slots off the top of the stack.
    fn stack_drop(&mut self, slots: u64) -> Result<(), Exception> {
        if self.stack_size() < slots {
            return Err(Exception::StackUnderflow);
        }
        let sp = self.registers.get(RegisterName::Sp)
            + Word::new(slots * self.slot_cells(), ADDRESS_BITS);
        self.registers.set(RegisterName::Sp, sp);
        Ok(())
    }

    /// Push one word; used by the control unit and by stack-bound input.
    pub(crate) fn stack_push(&mut self, value: Word) -> Result<(), Exception> {
        let slot = self.stack_push_slot()?;
        self.put_word(slot, value);
        Ok(())
    }

    /// Read and drop the top word; used by stack-bound output.
    pub(crate) fn stack_pop(&mut self) -> Result<Word, Exception> {
        let top = self.stack_slot(0)?;
        let value = self.word_at(top)?;
        self.stack_drop(1)?;
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Execution

    fn set_alu_operands(&mut self, r1: Word, r2: Word) {
        self.registers.set(self.spec.alu.r1, r1);
        self.registers.set(self.spec.alu.r2, r2);
    }

    fn result(&self) -> Word {
        self.registers.get(self.spec.alu.s)
    }

    fn remainder(&self) -> Word {
        self.registers.get(self.spec.alu.res)
    }

    fn execute(&mut self, d: &Decoded) -> Result<(), Exception> {
        match d.def.semantics {
            Semantics::Move => self.exec_move(d),
            Semantics::Load => self.exec_load(d),
            Semantics::Store => self.exec_store(d),
            Semantics::Arith(op) => self.exec_arith(d, op),
            Semantics::Compare => self.exec_compare(d),
            Semantics::RegArith(op) => self.exec_reg_arith(d, op),
            Semantics::RegMove => self.exec_reg_move(d),
            Semantics::RegCompare => self.exec_reg_compare(d),
            Semantics::EffectiveAddress => self.exec_effective_address(d),
            Semantics::Push => self.exec_push(d),
            Semantics::Pop => self.exec_pop(d),
            Semantics::Dup => self.exec_dup(d),
            Semantics::Swap => self.exec_swap(d),
            Semantics::Jump => {
                let target = self.jump_target(d);
                self.registers.set(RegisterName::Addr, target);
                self.alu.jump(&mut self.registers);
                Ok(())
            }
            Semantics::CondJump(predicate) => self.exec_cond_jump(d, predicate),
            Semantics::Halt => {
                self.alu.halt(&mut self.registers);
                Ok(())
            }
        }
    }

    /// Memory-to-memory copy; no ALU, no flag change.
    fn exec_move(&mut self, d: &Decoded) -> Result<(), Exception> {
        let (src, dst) = match self.spec.id {
            MachineId::Mm3 => (d.a1, d.a3),
            // mm-2 and mm-v: move A1, A2 copies [A2] into [A1]
            _ => (d.a2, d.a1),
        };
        let value = self.word_at(src)?;
        self.put_word(dst, value);
        Ok(())
    }

    fn exec_load(&mut self, d: &Decoded) -> Result<(), Exception> {
        match self.spec.id {
            MachineId::Mm1 => {
                let value = self.word_at(d.a1)?;
                self.registers.set(RegisterName::S, value);
            }
            _ => {
                let value = self.word_at(self.operand_address(d))?;
                self.registers.set(RegisterName::general(d.rx), value);
            }
        }
        Ok(())
    }

    fn exec_store(&mut self, d: &Decoded) -> Result<(), Exception> {
        match self.spec.id {
            MachineId::Mm1 => {
                let value = self.registers.get(RegisterName::S);
                self.put_word(d.a1, value);
            }
            _ => {
                let value = self.registers.get(RegisterName::general(d.rx));
                self.put_word(self.operand_address(d), value);
            }
        }
        Ok(())
    }

    fn exec_arith(&mut self, d: &Decoded, op: AluOp) -> Result<(), Exception> {
        let wc = self.word_cells();
        match self.spec.id {
            MachineId::Mm3 => {
                let r1 = self.word_at(d.a1)?;
                let r2 = self.word_at(d.a2)?;
                self.set_alu_operands(r1, r2);
                self.alu.execute(&mut self.registers, op)?;
                self.put_word(d.a3, self.result());
                if op.is_division() {
                    self.put_word(d.a3 + wc, self.remainder());
                }
            }
            MachineId::Mm2 | MachineId::Mmv => {
                let r1 = self.word_at(d.a1)?;
                let r2 = self.word_at(d.a2)?;
                self.set_alu_operands(r1, r2);
                self.alu.execute(&mut self.registers, op)?;
                self.put_word(d.a1, self.result());
                if op.is_division() {
                    self.put_word(d.a1 + wc, self.remainder());
                }
            }
            MachineId::Mm1 => {
                // Accumulator machine: S op= [A], remainder lands in S1
                let operand = self.word_at(d.a1)?;
                self.registers.set(RegisterName::R, operand);
                self.alu.execute(&mut self.registers, op)?;
            }
            MachineId::Mms => {
                let second = self.stack_slot(1)?;
                let top = self.stack_slot(0)?;
                let r1 = self.word_at(second)?;
                let r2 = self.word_at(top)?;
                self.set_alu_operands(r1, r2);
                self.alu.execute(&mut self.registers, op)?;
                if op.is_division() {
                    // quotient below remainder, stack depth unchanged
                    self.put_word(second, self.result());
                    self.put_word(top, self.remainder());
                } else {
                    self.stack_drop(1)?;
                    self.put_word(second, self.result());
                }
            }
            MachineId::Mm0 => {
                let operand = self.stack_slot(u64::from(d.byte.unsigned()))?;
                let top = self.stack_slot(0)?;
                let r1 = self.word_at(operand)?;
                let r2 = self.word_at(top)?;
                self.set_alu_operands(r1, r2);
                self.alu.execute(&mut self.registers, op)?;
                if op.is_division() {
                    // quotient replaces the top, remainder is pushed
                    let slot = self.stack_push_slot()?;
                    self.put_word(top, self.result());
                    self.put_word(slot, self.remainder());
                } else {
                    self.put_word(top, self.result());
                }
            }
            MachineId::Mmr | MachineId::Mmm => {
                let rx = RegisterName::general(d.rx);
                let operand = self.word_at(self.operand_address(d))?;
                self.registers.set(self.spec.alu.r1, self.registers.get(rx));
                self.registers.set(self.spec.alu.r2, operand);
                self.alu.execute(&mut self.registers, op)?;
                self.registers.set(rx, self.result());
                if op.is_division() {
                    self.registers.set(rx.next_general(), self.remainder());
                }
            }
        }
        Ok(())
    }

    /// Subtract, keep the flags, discard the difference.
    fn exec_compare(&mut self, d: &Decoded) -> Result<(), Exception> {
        match self.spec.id {
            MachineId::Mm2 | MachineId::Mmv => {
                // The difference only lands in scratch, nothing writes back
                let r1 = self.word_at(d.a1)?;
                let r2 = self.word_at(d.a2)?;
                self.set_alu_operands(r1, r2);
                self.alu.sub(&mut self.registers);
            }
            MachineId::Mm1 => {
                let operand = self.word_at(d.a1)?;
                self.registers.set(RegisterName::R, operand);
                let saved = self.registers.get(RegisterName::S);
                self.alu.sub(&mut self.registers);
                self.registers.set(RegisterName::S, saved);
            }
            MachineId::Mms => {
                let second = self.stack_slot(1)?;
                let top = self.stack_slot(0)?;
                let r1 = self.word_at(second)?;
                let r2 = self.word_at(top)?;
                self.set_alu_operands(r1, r2);
                self.alu.sub(&mut self.registers);
                self.stack_drop(2)?;
            }
            MachineId::Mm0 => {
                let operand = self.stack_slot(u64::from(d.byte.unsigned()))?;
                let top = self.stack_slot(0)?;
                let r1 = self.word_at(operand)?;
                let r2 = self.word_at(top)?;
                self.set_alu_operands(r1, r2);
                self.alu.sub(&mut self.registers);
                self.stack_drop(1)?;
            }
            MachineId::Mmr | MachineId::Mmm => {
                let rx = self.registers.get(RegisterName::general(d.rx));
                let operand = self.word_at(self.operand_address(d))?;
                self.set_alu_operands(rx, operand);
                self.alu.sub(&mut self.registers);
            }
            MachineId::Mm3 => unreachable!("mm-3 has no compare opcode"),
        }
        Ok(())
    }

    fn exec_reg_arith(&mut self, d: &Decoded, op: AluOp) -> Result<(), Exception> {
        let rx = RegisterName::general(d.rx);
        let ry = RegisterName::general(d.ry);
        self.registers.set(self.spec.alu.r1, self.registers.get(rx));
        self.registers.set(self.spec.alu.r2, self.registers.get(ry));
        self.alu.execute(&mut self.registers, op)?;
        self.registers.set(rx, self.result());
        if op.is_division() {
            self.registers.set(rx.next_general(), self.remainder());
        }
        Ok(())
    }

    fn exec_reg_move(&mut self, d: &Decoded) -> Result<(), Exception> {
        let value = self.registers.get(RegisterName::general(d.ry));
        self.registers.set(RegisterName::general(d.rx), value);
        Ok(())
    }

    fn exec_reg_compare(&mut self, d: &Decoded) -> Result<(), Exception> {
        let rx = self.registers.get(RegisterName::general(d.rx));
        let ry = self.registers.get(RegisterName::general(d.ry));
        self.set_alu_operands(rx, ry);
        self.alu.sub(&mut self.registers);
        Ok(())
    }

    /// `addr RX, A(M)` on the modification machine: RX receives the
    /// effective address itself.
    fn exec_effective_address(&mut self, d: &Decoded) -> Result<(), Exception> {
        let effective = self.operand_address(d);
        self.registers.set(
            RegisterName::general(d.rx),
            Word::new(effective.unsigned(), self.spec.word_bits),
        );
        Ok(())
    }

    fn exec_push(&mut self, d: &Decoded) -> Result<(), Exception> {
        let value = match self.spec.id {
            // The address-less machine pushes its sign-extended immediate
            MachineId::Mm0 => Word::from_signed(d.byte.signed(), self.spec.word_bits),
            _ => self.word_at(d.a1)?,
        };
        self.stack_push(value)
    }

    fn exec_pop(&mut self, d: &Decoded) -> Result<(), Exception> {
        match self.spec.id {
            // `pop N` just drops N slots
            MachineId::Mm0 => self.stack_drop(u64::from(d.byte.unsigned())),
            _ => {
                let value = self.stack_pop()?;
                self.put_word(d.a1, value);
                Ok(())
            }
        }
    }

    fn exec_dup(&mut self, d: &Decoded) -> Result<(), Exception> {
        let depth = match self.spec.id {
            MachineId::Mm0 => u64::from(d.byte.unsigned()),
            _ => 0,
        };
        let value = self.word_at(self.stack_slot(depth)?)?;
        self.stack_push(value)
    }

    fn exec_swap(&mut self, d: &Decoded) -> Result<(), Exception> {
        match self.spec.id {
            // Exchange the accumulator pair
            MachineId::Mm1 => {
                self.alu.swap(&mut self.registers);
                Ok(())
            }
            machine => {
                let depth = match machine {
                    MachineId::Mm0 => u64::from(d.byte.unsigned()),
                    _ => 1,
                };
                let other = self.stack_slot(depth)?;
                let top = self.stack_slot(0)?;
                let r1 = self.word_at(other)?;
                let r2 = self.word_at(top)?;
                self.set_alu_operands(r1, r2);
                self.alu.swap(&mut self.registers);
                self.put_word(other, self.registers.get(self.spec.alu.r1));
                self.put_word(top, self.registers.get(self.spec.alu.r2));
                Ok(())
            }
        }
    }

    fn exec_cond_jump(&mut self, d: &Decoded, predicate: Predicate) -> Result<(), Exception> {
        // The three-address machine compares its operands inline; everyone
        // else tests the flags left by an earlier comp.
        if self.spec.id == MachineId::Mm3 {
            let r1 = self.word_at(d.a1)?;
            let r2 = self.word_at(d.a2)?;
            self.set_alu_operands(r1, r2);
            self.alu.sub(&mut self.registers);
        }
        let target = self.jump_target(d);
        self.registers.set(RegisterName::Addr, target);
        self.alu.cond_jump(&mut self.registers, predicate);
        Ok(())
    }
}

impl std::fmt::Debug for Computer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Computer {{ machine: {}, status: {}, cycles: {} }}",
            self.spec.id,
            self.status(),
            self.cycles
        )
    }
}
