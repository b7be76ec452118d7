//! Program image loading and I/O binding.
//!
//! The source parser and the assembler both produce a [`Program`]: a sparse
//! memory image plus ordered input/output bindings and the optional inline
//! input text. The loader turns that into a ready [`Computer`], feeds the
//! input numbers before execution and emits the output bindings after a
//! normal halt. An error halt suppresses all output.

use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_while1};
use nom::character::complete::char;
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::sequence::preceded;
use nom::{Finish, IResult};
use thiserror::Error;
use tracing::{debug, info};

use crate::constants::ADDRESS_BITS;
use crate::isa::MachineId;
use crate::runtime::{Computer, Exception, Status, StopReason};
use crate::word::Word;

/// A contiguous run of cells with its load address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub address: u16,
    pub cells: Vec<Word>,
}

/// One `.input`/`.output`/`.dump` entry.
///
/// On the address-less stack machine the `address` of an input or output
/// binding is a stack-slot count instead of a memory address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoBinding {
    pub address: u16,
    /// Consecutive words bound by this entry (`.dump label(count)`).
    pub count: u16,
    pub message: Option<String>,
}

impl IoBinding {
    pub fn new(address: u16) -> Self {
        Self {
            address,
            count: 1,
            message: None,
        }
    }
}

/// Everything the loader needs: the parsed form of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub machine: MachineId,
    pub spans: Vec<Span>,
    pub inputs: Vec<IoBinding>,
    pub outputs: Vec<IoBinding>,
    pub enter: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    /// Two code sections filled the same cell.
    #[error("code sections overlap at address {address}")]
    OverlappingSpans { address: Word },

    #[error("cannot parse number `{0}`")]
    InvalidNumber(String),

    /// The number does not fit in the machine word.
    #[error("number {value} does not fit in {bits} bits")]
    NumberOutOfRange { value: i64, bits: u32 },

    /// The input stream ran out before every binding was satisfied.
    #[error("missing input value")]
    MissingInput,

    #[error("fault while binding i/o: {0}")]
    Fault(#[from] Exception),
}

/// A loaded machine with its pending I/O bindings.
pub struct Cpu {
    pub computer: Computer,
    pub inputs: Vec<IoBinding>,
    pub outputs: Vec<IoBinding>,
    pub enter: String,
}

/// Build the machine and place the image in memory.
///
/// Overlapping spans are a load-time error; the initialisation bitmap of the
/// RAM is what detects them.
pub fn load(program: &Program, protected: bool) -> Result<Cpu, LoadError> {
    let mut computer = Computer::new(program.machine, protected);
    info!(machine = %program.machine, "loading program image");

    for span in &program.spans {
        for (offset, &cell) in span.cells.iter().enumerate() {
            let address = Word::new(u64::from(span.address) + offset as u64, ADDRESS_BITS);
            if computer.ram.is_filled(address) {
                return Err(LoadError::OverlappingSpans { address });
            }
            computer.ram.store(address, cell);
        }
    }

    Ok(Cpu {
        computer,
        inputs: program.inputs.clone(),
        outputs: program.outputs.clone(),
        enter: program.enter.clone().unwrap_or_default(),
    })
}

fn decimal(input: &str) -> IResult<&str, i64> {
    map_res(take_while1(|c: char| c.is_ascii_digit()), str::parse)(input)
}

fn hexadecimal(input: &str) -> IResult<&str, i64> {
    map_res(
        preceded(
            tag_no_case("0x"),
            take_while1(|c: char| c.is_ascii_hexdigit()),
        ),
        |digits| i64::from_str_radix(digits, 16),
    )(input)
}

/// The numeric input grammar: optional sign, then decimal or `0x` hex.
pub(crate) fn number(input: &str) -> IResult<&str, i64> {
    let (input, sign) = opt(recognize(alt((char('-'), char('+')))))(input)?;
    let (input, magnitude) = alt((hexadecimal, decimal))(input)?;
    let value = if sign == Some("-") { -magnitude } else { magnitude };
    Ok((input, value))
}

/// Parse one whitespace-delimited input token.
pub fn parse_number(token: &str) -> Result<i64, LoadError> {
    all_consuming(number)(token)
        .finish()
        .map(|(_, value)| value)
        .map_err(|_| LoadError::InvalidNumber(token.into()))
}

fn check_range(value: i64, bits: u32) -> Result<Word, LoadError> {
    let min = -(1i128 << (bits - 1));
    let max = 1i128 << bits;
    if !(min..max).contains(&i128::from(value)) {
        return Err(LoadError::NumberOutOfRange { value, bits });
    }
    Ok(Word::from_signed(value, bits))
}

impl Cpu {
    /// Consume the input bindings, reading numbers from `text`.
    ///
    /// Numbers are bound in declaration order; on the address-less stack
    /// machine each input entry pushes `address` values onto the stack.
    pub fn bind_inputs(&mut self, text: &str) -> Result<(), LoadError> {
        let bits = self.computer.spec.word_bits;
        let word_cells = u64::from(self.computer.spec.word_cells());
        let stack_io = self.computer.spec.stack.is_some_and(|s| s.stack_io);
        let mut tokens = text.split_whitespace();

        for binding in &self.inputs {
            if stack_io {
                for _ in 0..binding.address {
                    let token = tokens.next().ok_or(LoadError::MissingInput)?;
                    let value = check_range(parse_number(token)?, bits)?;
                    self.computer.stack_push(value)?;
                }
            } else {
                for i in 0..u64::from(binding.count) {
                    let token = tokens.next().ok_or(LoadError::MissingInput)?;
                    let value = check_range(parse_number(token)?, bits)?;
                    let address =
                        Word::new(u64::from(binding.address) + i * word_cells, ADDRESS_BITS);
                    debug!(%address, value = value.signed(), "binding input");
                    self.computer.ram.store(address, value);
                }
            }
        }
        Ok(())
    }

    pub fn run(&mut self, limit: Option<u64>) -> StopReason {
        self.computer.run(limit)
    }

    /// Collect the output bindings as signed values, in print order.
    ///
    /// Only meaningful after a normal halt; the caller is expected to
    /// suppress output on an error halt. Stack-bound outputs pop the top
    /// `count` slots and report them deepest first.
    pub fn outputs(&mut self) -> Result<Vec<i64>, Exception> {
        debug_assert_eq!(self.computer.status(), Status::Halted);
        let bits = self.computer.spec.word_bits;
        let word_cells = u64::from(self.computer.spec.word_cells());
        let stack_io = self.computer.spec.stack.is_some_and(|s| s.stack_io);
        let mut values = Vec::new();

        for binding in &self.outputs {
            if stack_io {
                let mut popped = Vec::new();
                for _ in 0..binding.address {
                    popped.push(self.computer.stack_pop()?.signed());
                }
                popped.reverse();
                values.extend(popped);
            } else {
                for i in 0..u64::from(binding.count) {
                    let address = u64::from(binding.address) + i * word_cells;
                    if address + word_cells > self.computer.ram.size() {
                        return Err(Exception::AddressOutOfRange {
                            address: Word::new(address, ADDRESS_BITS),
                        });
                    }
                    let word = self
                        .computer
                        .ram
                        .fetch(Word::new(address, ADDRESS_BITS), bits)?;
                    values.push(word.signed());
                }
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    /// Parse, load, bind and run a source file, returning the printed values.
    fn run_source(source: &str, enter: Option<&str>) -> (StopReason, Vec<i64>) {
        let program = parse(source).expect("parse failed");
        let mut cpu = load(&program, true).expect("load failed");
        let text = enter.map(str::to_owned).unwrap_or_else(|| cpu.enter.clone());
        cpu.bind_inputs(&text).expect("input binding failed");
        let stop = cpu.run(Some(100_000));
        let values = match stop {
            StopReason::Halted => cpu.outputs().expect("output failed"),
            _ => Vec::new(),
        };
        (stop, values)
    }

    const FACTORIAL_MM3: &str = "\
.cpu mm-3
.input 0x6 n
.output 0x7 n!
.enter 6
.code
00000800000007 ; [7] := 1
81000600090005 ; if [6] == 0 goto 5
03000700060007 ; [7] := [7] * [6]
02000600080006 ; [6] := [6] - 1
80000000000001 ; goto 1
99000000000000 ; halt
.code 8
00000000000001
00000000000000
";

    #[test]
    fn mm3_factorial_test() {
        let (stop, values) = run_source(FACTORIAL_MM3, None);
        assert_eq!(stop, StopReason::Halted);
        assert_eq!(values, vec![720]);

        for (n, expected) in [(1, 1), (5, 120), (7, 5040)] {
            let (_, values) = run_source(FACTORIAL_MM3, Some(&n.to_string()));
            assert_eq!(values, vec![expected]);
        }
    }

    const POLY_MM3: &str = "\
.cpu mm-3
; x := ((a * -21) % 50 - b) ^ 2
.input 0x100,0x101 a b
.output 0x103
.enter -123 456
.code
03010001040103 ; [103] := a * -21
04010301050106 ; [106] := [103] / 50, [107] := remainder
02010701010103 ; [103] := [107] - b
03010301030103 ; [103] := [103] ^ 2
99000000000000
.code 0x104
ffffffffffffeb ; -21
00000000000032 ; 50
";

    #[test]
    fn mm3_polynomial_test() {
        let (stop, values) = run_source(POLY_MM3, None);
        assert_eq!(stop, StopReason::Halted);
        assert_eq!(values, vec![178929]);
    }

    const POLY_MM0: &str = "\
.cpu mm-0
; same polynomial on the address-less stack machine
.input 2 a b
.output 1
.enter -12 45
.code
40eb ; push -21
0302 ; smul: top := a * -21
4032 ; push 50
0401 ; sdiv: quotient then remainder on top
5d03 ; swap remainder with b
0203 ; sub: top := remainder - b
0300 ; smul: square the top
9900
";

    #[test]
    fn mm0_polynomial_test() {
        let (stop, values) = run_source(POLY_MM0, None);
        assert_eq!(stop, StopReason::Halted);
        assert_eq!(values, vec![1849]);

        let (_, values) = run_source(POLY_MM0, Some("10 2"));
        assert_eq!(values, vec![144]);
        let (_, values) = run_source(POLY_MM0, Some("-10 0"));
        assert_eq!(values, vec![100]);
        let (_, values) = run_source(POLY_MM0, Some("0 0"));
        assert_eq!(values, vec![0]);
    }

    #[test]
    fn division_by_zero_suppresses_output_test() {
        let source = "\
.cpu mm-3
.output 0x7
.code
04000500060007
.code 5
00000000000011
00000000000000
";
        let (stop, values) = run_source(source, None);
        assert_eq!(stop, StopReason::Failed(Exception::DivisionByZero));
        assert_eq!(values, Vec::<i64>::new());
    }

    #[test]
    fn uninitialised_fetch_test() {
        let source = "\
.cpu mm-3
.output 0x7
.code
00005000000007
";
        let (stop, values) = run_source(source, None);
        assert!(matches!(
            stop,
            StopReason::Failed(Exception::UninitialisedRead { .. })
        ));
        assert_eq!(values, Vec::<i64>::new());
    }

    #[test]
    fn overlapping_spans_test() {
        let source = "\
.cpu mm-2
.code
9900000000
.code 0
9900000000
";
        let program = parse(source).unwrap();
        assert!(matches!(
            load(&program, true),
            Err(LoadError::OverlappingSpans { .. })
        ));
    }

    #[test]
    fn number_grammar_test() {
        assert_eq!(parse_number("42").unwrap(), 42);
        assert_eq!(parse_number("-123").unwrap(), -123);
        assert_eq!(parse_number("+7").unwrap(), 7);
        assert_eq!(parse_number("0x2a").unwrap(), 0x2a);
        assert_eq!(parse_number("-0x10").unwrap(), -0x10);
        assert!(parse_number("abc").is_err());
        assert!(parse_number("12x").is_err());
        assert!(parse_number("").is_err());
    }

    #[test]
    fn input_out_of_range_test() {
        let source = "\
.cpu mm-0
.input 1
.code
9900
";
        let program = parse(source).unwrap();
        let mut cpu = load(&program, true).unwrap();
        // 16-bit machine word: 0x10000 does not fit
        assert!(matches!(
            cpu.bind_inputs("65536"),
            Err(LoadError::NumberOutOfRange { .. })
        ));
        let mut cpu = load(&program, true).unwrap();
        assert!(matches!(cpu.bind_inputs(""), Err(LoadError::MissingInput)));
    }

    #[test]
    fn stack_output_order_test() {
        // Push 1 2 3, print the top two slots: deepest first
        let source = "\
.cpu mm-0
.input 3
.output 2
.enter 1 2 3
.code
9900
";
        let (stop, values) = run_source(source, None);
        assert_eq!(stop, StopReason::Halted);
        assert_eq!(values, vec![2, 3]);
    }
}
