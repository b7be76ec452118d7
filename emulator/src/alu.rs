//! Arithmetic logic unit.
//!
//! The ALU is stateless: it reads its two operand registers from the register
//! file, writes the result (and, for division, the remainder) back, and
//! updates the FLAGS register. Which concrete registers play which role is a
//! per-machine binding given at construction. The ALU never touches memory.

use bitflags::bitflags;
use parse_display::Display;

use crate::memory::{RegisterFile, RegisterName};
use crate::word::{ArithmeticError, Word};

bitflags! {
    /// Condition flags, stored in the FLAGS register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u64 {
        /// Unsigned overflow of the last add/sub (borrow for sub).
        const CARRY    = 0b00001;
        /// Signed overflow of the last operation.
        const OVERFLOW = 0b00010;
        /// The last result was negative under the signed reading.
        const NEGATIVE = 0b00100;
        /// The last result was zero.
        const ZERO     = 0b01000;
        /// Sticky stop bit; once set, the fetch loop stops.
        const HALT     = 0b10000;
    }
}

/// The arithmetic opcode classes shared by all machines.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display(style = "lowercase")]
pub enum AluOp {
    Add,
    Sub,
    Smul,
    Sdiv,
    Umul,
    Udiv,
}

impl AluOp {
    /// Division produces a second result word (the remainder).
    pub fn is_division(self) -> bool {
        matches!(self, Self::Sdiv | Self::Udiv)
    }
}

/// Conditional-jump predicates over the flags of the last subtraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Equal,
    NotEqual,
    SignedLess,
    SignedGreaterOrEqual,
    SignedLessOrEqual,
    SignedGreater,
    UnsignedLess,
    UnsignedGreaterOrEqual,
    UnsignedLessOrEqual,
    UnsignedGreater,
}

impl Predicate {
    /// Evaluate the predicate against flags produced by `sub`/`comp`.
    pub fn holds(self, flags: Flags) -> bool {
        let z = flags.contains(Flags::ZERO);
        let c = flags.contains(Flags::CARRY);
        // Signed "less" after a subtraction: sign and overflow disagree.
        let less = flags.contains(Flags::NEGATIVE) != flags.contains(Flags::OVERFLOW);
        match self {
            Self::Equal => z,
            Self::NotEqual => !z,
            Self::SignedLess => less,
            Self::SignedGreaterOrEqual => !less,
            Self::SignedLessOrEqual => z || less,
            Self::SignedGreater => !z && !less,
            Self::UnsignedLess => c,
            Self::UnsignedGreaterOrEqual => !c,
            Self::UnsignedLessOrEqual => c || z,
            Self::UnsignedGreater => !c && !z,
        }
    }
}

/// Which registers the ALU reads and writes on a given machine.
///
/// `s` receives the result, `res` the remainder of a division; `r1` and `r2`
/// are the operands. On several machines these roles alias the same register
/// (the accumulator machines run with `r1 = s`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluRegisters {
    pub s: RegisterName,
    pub res: RegisterName,
    pub r1: RegisterName,
    pub r2: RegisterName,
}

/// The combinational unit itself: a register binding plus an operand width.
#[derive(Debug, Clone, Copy)]
pub struct Alu {
    pub regs: AluRegisters,
    pub operand_bits: u32,
}

impl Alu {
    pub fn new(regs: AluRegisters, operand_bits: u32) -> Self {
        Self { regs, operand_bits }
    }

    /// Declare the registers the ALU needs on the given file.
    pub fn install(&self, file: &mut RegisterFile) {
        file.add(self.regs.s, self.operand_bits);
        file.add(self.regs.res, self.operand_bits);
        file.add(self.regs.r1, self.operand_bits);
        file.add(self.regs.r2, self.operand_bits);
        file.add(RegisterName::Flags, self.operand_bits);
    }

    fn operands(&self, file: &RegisterFile) -> (Word, Word) {
        (file.get(self.regs.r1), file.get(self.regs.r2))
    }

    /// Derive the flags by comparing the wrapped result in `s` with the
    /// exact signed and unsigned values of the operation.
    fn set_flags(&self, file: &mut RegisterFile, signed: i128, unsigned: i128) {
        let value = file.get(self.regs.s);
        let mut flags = self.flags(file) & Flags::HALT;
        if value.is_zero() {
            flags |= Flags::ZERO;
        }
        if value.is_negative() {
            flags |= Flags::NEGATIVE;
        }
        if i128::from(value.signed()) != signed {
            flags |= Flags::OVERFLOW;
        }
        if i128::from(value.unsigned()) != unsigned {
            flags |= Flags::CARRY;
        }
        file.set(
            RegisterName::Flags,
            Word::new(flags.bits(), self.operand_bits),
        );
    }

    pub fn flags(&self, file: &RegisterFile) -> Flags {
        Flags::from_bits_retain(file.get(RegisterName::Flags).unsigned())
    }

    /// Dispatch one arithmetic opcode class.
    pub fn execute(&self, file: &mut RegisterFile, op: AluOp) -> Result<(), ArithmeticError> {
        match op {
            AluOp::Add => self.add(file),
            AluOp::Sub => self.sub(file),
            AluOp::Smul => self.smul(file),
            AluOp::Umul => self.umul(file),
            AluOp::Sdiv => return self.sdivmod(file),
            AluOp::Udiv => return self.udivmod(file),
        }
        Ok(())
    }

    /// `S := R1 + R2`
    pub fn add(&self, file: &mut RegisterFile) {
        let (a, b) = self.operands(file);
        file.set(self.regs.s, a + b);
        self.set_flags(
            file,
            i128::from(a.signed()) + i128::from(b.signed()),
            i128::from(a.unsigned()) + i128::from(b.unsigned()),
        );
    }

    /// `S := R1 - R2`
    pub fn sub(&self, file: &mut RegisterFile) {
        let (a, b) = self.operands(file);
        file.set(self.regs.s, a - b);
        self.set_flags(
            file,
            i128::from(a.signed()) - i128::from(b.signed()),
            i128::from(a.unsigned()) - i128::from(b.unsigned()),
        );
    }

    /// `S := R1 * R2` (signed); the carry flag is left clear, overflow marks
    /// a truncated product.
    pub fn smul(&self, file: &mut RegisterFile) {
        let (a, b) = self.operands(file);
        let s = a.smul(b);
        file.set(self.regs.s, s);
        let exact = i128::from(a.signed()) * i128::from(b.signed());
        self.set_flags(file, exact, i128::from(s.unsigned()));
    }

    /// `S := R1 * R2` (unsigned); the overflow flag is left clear, carry
    /// marks a truncated product.
    pub fn umul(&self, file: &mut RegisterFile) {
        let (a, b) = self.operands(file);
        let s = a.umul(b);
        file.set(self.regs.s, s);
        let exact = i128::from(a.unsigned()) * i128::from(b.unsigned());
        self.set_flags(file, i128::from(s.signed()), exact);
    }

    /// `S := R1 / R2`, `RES := R1 % R2` (signed, truncated toward zero).
    pub fn sdivmod(&self, file: &mut RegisterFile) -> Result<(), ArithmeticError> {
        let (a, b) = self.operands(file);
        let (q, r) = a.divmod_signed(b)?;
        file.set(self.regs.s, q);
        file.set(self.regs.res, r);
        self.set_flags(file, i128::from(q.signed()), i128::from(q.unsigned()));
        Ok(())
    }

    /// `S := R1 / R2`, `RES := R1 % R2` (unsigned).
    pub fn udivmod(&self, file: &mut RegisterFile) -> Result<(), ArithmeticError> {
        let (a, b) = self.operands(file);
        let (q, r) = a.divmod_unsigned(b)?;
        file.set(self.regs.s, q);
        file.set(self.regs.res, r);
        self.set_flags(file, i128::from(q.signed()), i128::from(q.unsigned()));
        Ok(())
    }

    /// `PC := ADDR`
    pub fn jump(&self, file: &mut RegisterFile) {
        let target = file.get(RegisterName::Addr);
        file.set(RegisterName::Pc, target);
    }

    /// Jump when the predicate holds on the current flags.
    pub fn cond_jump(&self, file: &mut RegisterFile, predicate: Predicate) {
        if predicate.holds(self.flags(file)) {
            self.jump(file);
        }
    }

    /// Set the sticky HALT bit; everything else is left untouched.
    pub fn halt(&self, file: &mut RegisterFile) {
        let flags = self.flags(file) | Flags::HALT;
        file.set(
            RegisterName::Flags,
            Word::new(flags.bits(), self.operand_bits),
        );
    }

    /// `S, RES := RES, S`
    pub fn swap(&self, file: &mut RegisterFile) {
        let s = file.get(self.regs.s);
        let res = file.get(self.regs.res);
        file.set(self.regs.s, res);
        file.set(self.regs.res, s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITS: u32 = 24;

    fn alu() -> (Alu, RegisterFile) {
        let alu = Alu::new(
            AluRegisters {
                s: RegisterName::S,
                res: RegisterName::S1,
                r1: RegisterName::R1,
                r2: RegisterName::R2,
            },
            BITS,
        );
        let mut file = RegisterFile::new();
        file.add(RegisterName::Pc, 16);
        file.add(RegisterName::Addr, 16);
        alu.install(&mut file);
        (alu, file)
    }

    fn run_op(op: AluOp, a: i64, b: i64) -> (Word, Flags, RegisterFile, Alu) {
        let (alu, mut file) = alu();
        file.set(RegisterName::R1, Word::from_signed(a, BITS));
        file.set(RegisterName::R2, Word::from_signed(b, BITS));
        alu.execute(&mut file, op).unwrap();
        let s = file.get(RegisterName::S);
        let flags = alu.flags(&file);
        (s, flags, file, alu)
    }

    #[test]
    fn add_flags_test() {
        // Vectors with 24-bit operands
        let cases = [
            (0x41, 0x10, 0x51, Flags::empty()),
            (0x41, -0x10, 0x31, Flags::CARRY),
            (0x10, -0x41, -0x31, Flags::NEGATIVE),
            (-1, -1, -2, Flags::NEGATIVE | Flags::CARRY),
            (0x7fffff, 1, -0x800000, Flags::NEGATIVE | Flags::OVERFLOW),
        ];
        for (a, b, expected, flags) in cases {
            let (s, got, _, _) = run_op(AluOp::Add, a, b);
            assert_eq!(s.signed(), expected, "{a} + {b}");
            assert_eq!(got, flags, "{a} + {b}");
        }
    }

    #[test]
    fn sub_flags_test() {
        let cases = [
            (0x41, 0x10, 0x31, Flags::empty()),
            (0x10, 0x41, -0x31, Flags::NEGATIVE | Flags::CARRY),
            (0x41, -0x10, 0x51, Flags::CARRY),
            (-1, -1, 0, Flags::ZERO),
        ];
        for (a, b, expected, flags) in cases {
            let (s, got, _, _) = run_op(AluOp::Sub, a, b);
            assert_eq!(s.signed(), expected, "{a} - {b}");
            assert_eq!(got, flags, "{a} - {b}");
        }
    }

    #[test]
    fn mul_flags_test() {
        let (s, flags, _, _) = run_op(AluOp::Smul, -0x41, 0x10);
        assert_eq!(s.signed(), -0x410);
        assert_eq!(flags, Flags::NEGATIVE);

        let (s, flags, _, _) = run_op(AluOp::Umul, 0x1000, 0x1000);
        assert_eq!(s.unsigned(), 0);
        assert_eq!(flags, Flags::ZERO | Flags::CARRY);
    }

    #[test]
    fn divmod_test() {
        let (s, flags, file, _) = run_op(AluOp::Sdiv, 0x41, 0x10);
        assert_eq!(s.unsigned(), 4);
        assert_eq!(file.get(RegisterName::S1).unsigned(), 1);
        assert_eq!(flags, Flags::empty());

        let (alu, mut file) = alu();
        file.set(RegisterName::R1, Word::new(1, BITS));
        file.set(RegisterName::R2, Word::zero(BITS));
        assert_eq!(
            alu.execute(&mut file, AluOp::Udiv),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[test]
    fn predicates_test() {
        // flags from comparing a and b with sub
        let compare = |a: i64, b: i64| run_op(AluOp::Sub, a, b).1;

        let eq = compare(5, 5);
        assert!(Predicate::Equal.holds(eq));
        assert!(Predicate::SignedLessOrEqual.holds(eq));
        assert!(Predicate::UnsignedGreaterOrEqual.holds(eq));
        assert!(!Predicate::SignedLess.holds(eq));

        let lt = compare(-3, 7);
        assert!(Predicate::SignedLess.holds(lt));
        assert!(Predicate::NotEqual.holds(lt));
        // -3 is large unsigned
        assert!(Predicate::UnsignedGreater.holds(lt));

        let gt = compare(7, -3);
        assert!(Predicate::SignedGreater.holds(gt));
        assert!(Predicate::UnsignedLess.holds(gt));
    }

    #[test]
    fn halt_preserves_flags_test() {
        let (_, flags, mut file, alu) = run_op(AluOp::Sub, 5, 5);
        assert!(flags.contains(Flags::ZERO));
        alu.halt(&mut file);
        let after = alu.flags(&file);
        assert!(after.contains(Flags::HALT));
        assert!(after.contains(Flags::ZERO));
    }

    #[test]
    fn swap_test() {
        let (alu, mut file) = alu();
        file.set(RegisterName::S, Word::new(0x41, BITS));
        file.set(RegisterName::S1, Word::new(0x10, BITS));
        alu.swap(&mut file);
        assert_eq!(file.get(RegisterName::S).unsigned(), 0x10);
        assert_eq!(file.get(RegisterName::S1).unsigned(), 0x41);
        // swap does not touch the flags
        assert_eq!(alu.flags(&file), Flags::empty());
    }
}
