//! Assembler for the modification machine (`mm-m`).
//!
//! The dialect is line-oriented like the hex source format: `;` comments,
//! `label:` definitions, symbolic mnemonics, `.word` data and an address
//! operand form `label(reg)` that fills the opcode's modifier nibble. Two
//! passes: the first sizes every statement and assigns label addresses, the
//! second emits cells with all references resolved. The result feeds the
//! loader directly; `.dump` directives become output bindings.

use std::collections::HashMap;

use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, space0, space1};
use nom::combinator::{all_consuming, map, opt, verify};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{Finish, IResult};
use thiserror::Error;

use crate::constants::MEMORY_SIZE;
use crate::isa::{Format, InstructionDef, MachineId, MachineSpec};
use crate::loader::{number, IoBinding, Program, Span};
use crate::word::Word;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AsmError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: unknown mnemonic `{name}`")]
    UnknownMnemonic { line: usize, name: String },

    #[error("line {line}: unknown label `{name}`")]
    UnknownLabel { line: usize, name: String },

    #[error("line {line}: duplicate label `{name}`")]
    DuplicateLabel { line: usize, name: String },

    #[error("line {line}: operands do not match `{mnemonic}`")]
    OperandMismatch { line: usize, mnemonic: String },

    #[error("line {line}: value {value} does not fit in a machine word")]
    WordOutOfRange { line: usize, value: i64 },
}

fn syntax(line: usize, message: impl Into<String>) -> AsmError {
    AsmError::Syntax {
        line,
        message: message.into(),
    }
}

// ---------------------------------------------------------------------
// Line grammar

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

fn identifier(input: &str) -> IResult<&str, &str> {
    verify(take_while1(is_identifier_char), |s: &str| {
        s.chars()
            .next()
            .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
    })(input)
}

/// `R0`..`RF`, case-insensitive.
fn register_of(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('r' | 'R'), Some(digit), None) => digit.to_digit(16).map(|d| d as u8),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Base<'a> {
    Ident(&'a str),
    Number(i64),
}

/// An instruction operand before resolution: a register, a label, an
/// absolute number, any of the latter two with a `(reg)` modifier.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RawOperand<'a> {
    base: Base<'a>,
    modifier: Option<&'a str>,
}

fn operand(input: &str) -> IResult<&str, RawOperand> {
    let base = alt((map(identifier, Base::Ident), map(number, Base::Number)));
    map(
        pair(
            base,
            opt(delimited(
                preceded(space0, char('(')),
                delimited(space0, identifier, space0),
                char(')'),
            )),
        ),
        |(base, modifier)| RawOperand { base, modifier },
    )(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0)(input)
}

#[derive(Debug, PartialEq)]
enum Content<'a> {
    Config(u64),
    Code,
    Words(Vec<i64>),
    Dump(Vec<(&'a str, i64)>),
    Instruction {
        mnemonic: &'a str,
        operands: Vec<RawOperand<'a>>,
    },
}

fn parse_content(input: &str) -> IResult<&str, Content> {
    alt((
        map(
            preceded(pair(nom::bytes::complete::tag(".config"), space1), number),
            |address| Content::Config(address as u64),
        ),
        map(nom::bytes::complete::tag(".code"), |_| Content::Code),
        map(
            preceded(
                pair(nom::bytes::complete::tag(".word"), space1),
                separated_list1(comma, number),
            ),
            Content::Words,
        ),
        map(
            preceded(
                pair(nom::bytes::complete::tag(".dump"), space1),
                separated_list1(
                    comma,
                    pair(
                        identifier,
                        map(
                            opt(delimited(
                                preceded(space0, char('(')),
                                delimited(space0, number, space0),
                                char(')'),
                            )),
                            |count| count.unwrap_or(1),
                        ),
                    ),
                ),
            ),
            Content::Dump,
        ),
        map(
            pair(identifier, opt(preceded(space1, separated_list1(comma, operand)))),
            |(mnemonic, operands)| Content::Instruction {
                mnemonic,
                operands: operands.unwrap_or_default(),
            },
        ),
    ))(input)
}

#[derive(Debug, PartialEq)]
struct ParsedLine<'a> {
    labels: Vec<&'a str>,
    content: Option<Content<'a>>,
}

fn parse_line(input: &str) -> IResult<&str, ParsedLine> {
    let (mut rest, _) = space0(input)?;
    let mut labels = Vec::new();
    // `label:` prefixes, any number of them
    while let (next, Some(label)) = opt(terminated(
        identifier,
        preceded(space0, char(':')),
    ))(rest)?
    {
        labels.push(label);
        let (next, _) = space0(next)?;
        rest = next;
    }
    let (rest, content) = opt(parse_content)(rest)?;
    let (rest, _) = space0(rest)?;
    Ok((rest, ParsedLine { labels, content }))
}

// ---------------------------------------------------------------------
// Two-pass assembly

#[derive(Debug)]
enum Item<'a> {
    Instruction {
        line: usize,
        def: &'static InstructionDef,
        operands: Vec<RawOperand<'a>>,
    },
    DataWord {
        line: usize,
        value: i64,
    },
}

#[derive(Debug)]
struct Block<'a> {
    address: u64,
    items: Vec<Item<'a>>,
}

struct Assembler<'a> {
    spec: &'static MachineSpec,
    labels: HashMap<&'a str, u64>,
    blocks: Vec<Block<'a>>,
    dumps: Vec<(usize, &'a str, u16)>,
    cursor: u64,
}

impl<'a> Assembler<'a> {
    fn new() -> Self {
        Self {
            spec: MachineSpec::of(MachineId::Mmm),
            labels: HashMap::new(),
            blocks: Vec::new(),
            dumps: Vec::new(),
            cursor: 0,
        }
    }

    fn open_block(&mut self, address: u64) {
        self.cursor = address;
        self.blocks.push(Block {
            address,
            items: Vec::new(),
        });
    }

    fn push_item(&mut self, item: Item<'a>, cells: u64, line: usize) -> Result<(), AsmError> {
        if self.cursor + cells > MEMORY_SIZE {
            return Err(syntax(line, "code runs past the end of memory"));
        }
        if self.blocks.is_empty() {
            self.open_block(0);
        }
        // open_block guarantees a last block
        if let Some(block) = self.blocks.last_mut() {
            block.items.push(item);
        }
        self.cursor += cells;
        Ok(())
    }

    fn define_label(&mut self, label: &'a str, line: usize) -> Result<(), AsmError> {
        if self.labels.insert(label, self.cursor).is_some() {
            return Err(AsmError::DuplicateLabel {
                line,
                name: label.into(),
            });
        }
        Ok(())
    }

    fn resolve(&self, label: &str, line: usize) -> Result<u64, AsmError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| AsmError::UnknownLabel {
                line,
                name: label.into(),
            })
    }

    /// First pass: size statements, place labels, collect items.
    fn scan(&mut self, source: &'a str) -> Result<(), AsmError> {
        for (index, raw) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.split(';').next().unwrap_or("").trim_end();
            if line.trim().is_empty() {
                continue;
            }
            let (_, parsed) = all_consuming(parse_line)(line)
                .finish()
                .map_err(|_| syntax(line_no, format!("cannot parse `{}`", line.trim())))?;

            for label in parsed.labels {
                self.define_label(label, line_no)?;
            }

            match parsed.content {
                None => {}
                Some(Content::Config(address)) => {
                    if address >= MEMORY_SIZE {
                        return Err(syntax(line_no, "load address out of range"));
                    }
                    self.open_block(address);
                }
                Some(Content::Code) => self.open_block(0),
                Some(Content::Words(values)) => {
                    let cells = u64::from(self.spec.word_cells());
                    for value in values {
                        self.push_item(
                            Item::DataWord {
                                line: line_no,
                                value,
                            },
                            cells,
                            line_no,
                        )?;
                    }
                }
                Some(Content::Dump(entries)) => {
                    for (label, count) in entries {
                        if !(1..=i64::from(u16::MAX)).contains(&count) {
                            return Err(syntax(line_no, format!("bad dump count {count}")));
                        }
                        self.dumps.push((line_no, label, count as u16));
                    }
                }
                Some(Content::Instruction { mnemonic, operands }) => {
                    let def = self.spec.by_mnemonic(&mnemonic.to_lowercase()).ok_or_else(
                        || AsmError::UnknownMnemonic {
                            line: line_no,
                            name: mnemonic.into(),
                        },
                    )?;
                    let cells = u64::from(def.cells);
                    self.push_item(
                        Item::Instruction {
                            line: line_no,
                            def,
                            operands,
                        },
                        cells,
                        line_no,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn mismatch(&self, line: usize, def: &InstructionDef) -> AsmError {
        AsmError::OperandMismatch {
            line,
            mnemonic: def.mnemonic.into(),
        }
    }

    fn expect_register(
        &self,
        operand: &RawOperand<'a>,
        line: usize,
        def: &InstructionDef,
    ) -> Result<u8, AsmError> {
        match operand {
            RawOperand {
                base: Base::Ident(name),
                modifier: None,
            } => register_of(name).ok_or_else(|| self.mismatch(line, def)),
            _ => Err(self.mismatch(line, def)),
        }
    }

    /// Resolve an address operand to its displacement and modifier nibble.
    fn expect_address(
        &self,
        operand: &RawOperand<'a>,
        line: usize,
        def: &InstructionDef,
    ) -> Result<(u64, u8), AsmError> {
        let displacement = match operand.base {
            // A bare register is not an address
            Base::Ident(name) if operand.modifier.is_none() && register_of(name).is_some() => {
                return Err(self.mismatch(line, def))
            }
            Base::Ident(name) => self.resolve(name, line)?,
            Base::Number(value) => {
                if !(0..MEMORY_SIZE as i64).contains(&value) {
                    return Err(syntax(line, format!("address {value} out of range")));
                }
                value as u64
            }
        };
        let modifier = match operand.modifier {
            None => 0,
            Some(name) => register_of(name).ok_or_else(|| self.mismatch(line, def))?,
        };
        Ok((displacement, modifier))
    }

    fn encode_instruction(
        &self,
        line: usize,
        def: &InstructionDef,
        operands: &[RawOperand<'a>],
        cells: &mut Vec<Word>,
    ) -> Result<(), AsmError> {
        let (rx, ry, address) = match def.format {
            Format::Plain => {
                if !operands.is_empty() {
                    return Err(self.mismatch(line, def));
                }
                (0, 0, None)
            }
            Format::RegReg => match operands {
                [first, second] => {
                    let rx = self.expect_register(first, line, def)?;
                    let ry = self.expect_register(second, line, def)?;
                    (rx, ry, None)
                }
                _ => return Err(self.mismatch(line, def)),
            },
            Format::RegAddr => match (def.semantics.takes_register(), operands) {
                (true, [first, second]) => {
                    let rx = self.expect_register(first, line, def)?;
                    let (address, ry) = self.expect_address(second, line, def)?;
                    (rx, ry, Some(address))
                }
                (false, [target]) => {
                    let (address, ry) = self.expect_address(target, line, def)?;
                    (0, ry, Some(address))
                }
                _ => return Err(self.mismatch(line, def)),
            },
            _ => return Err(self.mismatch(line, def)),
        };

        let first = (u64::from(def.opcode) << 8) | (u64::from(rx) << 4) | u64::from(ry);
        cells.push(Word::new(first, self.spec.cell_bits));
        if let Some(address) = address {
            cells.push(Word::new(address, self.spec.cell_bits));
        }
        Ok(())
    }

    fn encode_word(&self, line: usize, value: i64, cells: &mut Vec<Word>) -> Result<(), AsmError> {
        let bits = self.spec.word_bits;
        let min = -(1i128 << (bits - 1));
        let max = 1i128 << bits;
        if !(min..max).contains(&i128::from(value)) {
            return Err(AsmError::WordOutOfRange { line, value });
        }
        let word = Word::from_signed(value, bits);
        for i in 0..self.spec.word_cells() {
            cells.push(word.field(bits - (i + 1) * self.spec.cell_bits..bits - i * self.spec.cell_bits));
        }
        Ok(())
    }

    /// Second pass: emit cells and resolve the dump bindings.
    fn emit(self) -> Result<Program, AsmError> {
        let mut spans = Vec::new();
        for block in &self.blocks {
            let mut cells = Vec::new();
            for item in &block.items {
                match item {
                    Item::Instruction {
                        line,
                        def,
                        operands,
                    } => self.encode_instruction(*line, def, operands, &mut cells)?,
                    Item::DataWord { line, value } => self.encode_word(*line, *value, &mut cells)?,
                }
            }
            if !cells.is_empty() {
                spans.push(Span {
                    address: block.address as u16,
                    cells,
                });
            }
        }

        let mut outputs = Vec::new();
        for (line, label, count) in &self.dumps {
            let address = self.resolve(label, *line)?;
            outputs.push(IoBinding {
                address: address as u16,
                count: *count,
                message: Some((*label).to_owned()),
            });
        }

        Ok(Program {
            machine: MachineId::Mmm,
            spans,
            inputs: Vec::new(),
            outputs,
            enter: None,
        })
    }
}

impl crate::isa::Semantics {
    /// Does the mnemonic take a leading register operand in assembly?
    fn takes_register(&self) -> bool {
        use crate::isa::Semantics::*;
        !matches!(self, Jump | CondJump(_))
    }
}

/// Assemble an `.mmasm` source into a loadable program.
pub fn assemble(source: &str) -> Result<Program, AsmError> {
    let mut assembler = Assembler::new();
    assembler.scan(source)?;
    assembler.emit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load;
    use crate::runtime::StopReason;
    use pretty_assertions::assert_eq;

    const SUM_SAMPLE: &str = "\
        .code
start:  rsub r2, r2        ; index, in cells
        rsub r3, r3        ; accumulator
        load r5, two
loop:   comp r2, ten
        jeq  done
        add  r3, array(r2)
        radd r2, r5
        jump loop
done:   store r3, sum
        halt

        .config 0x100
array:  .word -1, 2, 3, 4, 5
sum:    .word 0
two:    .word 2
ten:    .word 10
        .dump array(5), sum
";

    #[test]
    fn sum_sample_encoding_test() {
        let program = assemble(SUM_SAMPLE).unwrap();
        assert_eq!(program.machine, MachineId::Mmm);
        assert_eq!(program.spans.len(), 2);

        let code: Vec<u64> = program.spans[0]
            .cells
            .iter()
            .map(|c| c.unsigned())
            .collect();
        assert_eq!(
            code,
            vec![
                0x2222, // rsub r2, r2
                0x2233, // rsub r3, r3
                0x0050, 0x010c, // load r5, two
                0x0520, 0x010e, // comp r2, ten
                0x8100, 0x000d, // jeq done
                0x0132, 0x0100, // add r3, array(r2)
                0x2125, // radd r2, r5
                0x8000, 0x0004, // jump loop
                0x1030, 0x010a, // store r3, sum
                0x9900, // halt
            ]
        );

        assert_eq!(program.spans[1].address, 0x100);
        assert_eq!(
            program.outputs,
            vec![
                IoBinding {
                    address: 0x100,
                    count: 5,
                    message: Some("array".into()),
                },
                IoBinding {
                    address: 0x10a,
                    count: 1,
                    message: Some("sum".into()),
                },
            ]
        );
    }

    #[test]
    fn sum_sample_runs_test() {
        let program = assemble(SUM_SAMPLE).unwrap();
        let mut cpu = load(&program, true).unwrap();
        assert_eq!(cpu.run(Some(10_000)), StopReason::Halted);
        assert_eq!(cpu.outputs().unwrap(), vec![-1, 2, 3, 4, 5, 13]);
    }

    #[test]
    fn numeric_address_operand_test() {
        let program = assemble("load r1, 0x42\nhalt\n").unwrap();
        let code: Vec<u64> = program.spans[0]
            .cells
            .iter()
            .map(|c| c.unsigned())
            .collect();
        assert_eq!(code, vec![0x0010, 0x0042, 0x9900]);
    }

    #[test]
    fn duplicate_label_test() {
        assert_eq!(
            assemble("a: halt\na: halt\n"),
            Err(AsmError::DuplicateLabel {
                line: 2,
                name: "a".into(),
            })
        );
    }

    #[test]
    fn unknown_label_test() {
        assert_eq!(
            assemble("jump nowhere\n"),
            Err(AsmError::UnknownLabel {
                line: 1,
                name: "nowhere".into(),
            })
        );
    }

    #[test]
    fn unknown_mnemonic_test() {
        assert_eq!(
            assemble("frobnicate r1\n"),
            Err(AsmError::UnknownMnemonic {
                line: 1,
                name: "frobnicate".into(),
            })
        );
    }

    #[test]
    fn operand_mismatch_test() {
        // rmove expects two registers
        assert_eq!(
            assemble("x: .word 0\nrmove r1, x\n"),
            Err(AsmError::OperandMismatch {
                line: 2,
                mnemonic: "rmove".into(),
            })
        );
        // halt takes no operands
        assert!(matches!(
            assemble("halt r1\n"),
            Err(AsmError::OperandMismatch { .. })
        ));
    }

    #[test]
    fn word_range_test() {
        assert!(assemble(".word 4294967295\n").is_ok());
        assert_eq!(
            assemble(".word 4294967296\n"),
            Err(AsmError::WordOutOfRange {
                line: 1,
                value: 4294967296,
            })
        );
    }

    #[test]
    fn label_only_line_test() {
        let program = assemble("start:\n  halt\n.dump start\n").unwrap();
        assert_eq!(program.outputs[0].address, 0);
    }
}
