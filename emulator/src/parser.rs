//! Source format parser for `.mmach` files.
//!
//! The format is line-oriented: `;` starts a comment, blank lines are
//! ignored. The first significant line must be `.cpu <id>`; after it come
//! `.input`/`.output` binding directives, optional `.enter` inline input and
//! one or more `.code` sections whose following lines are hex machine words.
//! The parser produces the [`Program`] consumed by the loader.

use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while1};
use nom::character::complete::{char, space0, space1};
use nom::combinator::{all_consuming, map, map_res, opt, rest};
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded};
use nom::{Finish, IResult};
use thiserror::Error;

use crate::isa::{MachineId, MachineSpec};
use crate::loader::{IoBinding, Program, Span};
use crate::word::Word;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: unknown cpu `{name}`")]
    UnknownCpu { line: usize, name: String },

    #[error("missing required .code directive")]
    MissingCode,
}

fn syntax(line: usize, message: impl Into<String>) -> SourceError {
    SourceError::Syntax {
        line,
        message: message.into(),
    }
}

/// A decimal or `0x`-prefixed hexadecimal non-negative integer.
fn unsigned(input: &str) -> IResult<&str, u64> {
    alt((
        map_res(
            preceded(
                tag_no_case("0x"),
                take_while1(|c: char| c.is_ascii_hexdigit()),
            ),
            |digits| u64::from_str_radix(digits, 16),
        ),
        map_res(take_while1(|c: char| c.is_ascii_digit()), str::parse),
    ))(input)
}

fn address_list(input: &str) -> IResult<&str, Vec<u64>> {
    separated_list1(delimited(space0, char(','), space0), unsigned)(input)
}

/// Trailing free text used as a prompt/message.
fn message(input: &str) -> IResult<&str, Option<&str>> {
    map(opt(preceded(space1, rest)), |text: Option<&str>| {
        text.map(str::trim).filter(|t| !t.is_empty())
    })(input)
}

#[derive(Debug, PartialEq)]
enum Directive<'a> {
    Cpu(&'a str),
    Input(Vec<u64>, Option<&'a str>),
    Output(Vec<u64>, Option<&'a str>),
    Enter(&'a str),
    Code(Option<u64>),
}

fn parse_directive(input: &str) -> IResult<&str, Directive> {
    alt((
        map(
            preceded(
                preceded(tag(".cpu"), space1),
                take_while1(|c: char| !c.is_whitespace()),
            ),
            Directive::Cpu,
        ),
        map(
            preceded(
                preceded(tag(".input"), space1),
                nom::sequence::pair(address_list, message),
            ),
            |(addresses, text)| Directive::Input(addresses, text),
        ),
        map(
            preceded(
                preceded(tag(".output"), space1),
                nom::sequence::pair(address_list, message),
            ),
            |(addresses, text)| Directive::Output(addresses, text),
        ),
        map(preceded(preceded(tag(".enter"), space1), rest), |text| {
            Directive::Enter(text)
        }),
        map(
            preceded(tag(".code"), opt(preceded(space1, unsigned))),
            Directive::Code,
        ),
    ))(input)
}

struct HexSection {
    address: u64,
    digits: String,
    line: usize,
}

impl HexSection {
    fn into_span(self, spec: &MachineSpec) -> Result<Span, SourceError> {
        let cell_hex = (spec.cell_bits / 4) as usize;
        if self.digits.len() % cell_hex != 0 {
            return Err(syntax(
                self.line,
                format!(
                    "incomplete machine word: {} hex digits is not a multiple of {cell_hex}",
                    self.digits.len()
                ),
            ));
        }
        let cells = self
            .digits
            .as_bytes()
            .chunks(cell_hex)
            .map(|chunk| {
                // Chunks are pre-validated hex
                let digits = std::str::from_utf8(chunk).map_err(|_| ())?;
                let value = u64::from_str_radix(digits, 16).map_err(|_| ())?;
                Ok(Word::new(value, spec.cell_bits))
            })
            .collect::<Result<Vec<_>, ()>>()
            .map_err(|()| syntax(self.line, "invalid hex code"))?;
        Ok(Span {
            address: self.address as u16,
            cells,
        })
    }
}

fn bindings(
    line: usize,
    addresses: Vec<u64>,
    text: Option<&str>,
) -> Result<Vec<IoBinding>, SourceError> {
    addresses
        .into_iter()
        .map(|address| {
            if address >= crate::constants::MEMORY_SIZE {
                return Err(syntax(line, format!("address {address:#x} out of range")));
            }
            Ok(IoBinding {
                address: address as u16,
                count: 1,
                message: text.map(str::to_owned),
            })
        })
        .collect()
}

/// Parse a whole source file.
pub fn parse(source: &str) -> Result<Program, SourceError> {
    let mut machine: Option<MachineId> = None;
    let mut spans = Vec::new();
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut enter: Option<String> = None;
    let mut section: Option<HexSection> = None;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.split(';').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('.') {
            let (_, directive) = all_consuming(parse_directive)(line)
                .finish()
                .map_err(|_| syntax(line_no, format!("cannot parse directive `{line}`")))?;

            match directive {
                Directive::Cpu(name) => {
                    if machine.is_some() {
                        return Err(syntax(line_no, "duplicate .cpu directive"));
                    }
                    machine = Some(name.parse().map_err(|_| SourceError::UnknownCpu {
                        line: line_no,
                        name: name.into(),
                    })?);
                }
                other => {
                    let Some(id) = machine else {
                        return Err(syntax(line_no, "expected .cpu as the first directive"));
                    };
                    // Every other directive ends an open hex section
                    if let Some(open) = section.take() {
                        spans.push(open.into_span(MachineSpec::of(id))?);
                    }

                    match other {
                        Directive::Cpu(_) => unreachable!(),
                        Directive::Input(addresses, text) => {
                            inputs.extend(bindings(line_no, addresses, text)?);
                        }
                        Directive::Output(addresses, text) => {
                            outputs.extend(bindings(line_no, addresses, text)?);
                        }
                        Directive::Enter(text) => {
                            let joined = enter.get_or_insert_with(String::new);
                            if !joined.is_empty() {
                                joined.push(' ');
                            }
                            joined.push_str(text.trim());
                        }
                        Directive::Code(address) => {
                            let address = address.unwrap_or(0);
                            if address >= crate::constants::MEMORY_SIZE {
                                return Err(syntax(
                                    line_no,
                                    format!("address {address:#x} out of range"),
                                ));
                            }
                            section = Some(HexSection {
                                address,
                                digits: String::new(),
                                line: line_no,
                            });
                        }
                    }
                }
            }
        } else {
            let Some(open) = section.as_mut() else {
                return Err(syntax(line_no, "expected a directive"));
            };
            for c in line.chars() {
                if c.is_ascii_hexdigit() {
                    open.digits.push(c);
                } else if !c.is_whitespace() {
                    return Err(syntax(line_no, format!("`{c}` is not a hex digit")));
                }
            }
        }
    }

    let Some(machine) = machine else {
        return Err(syntax(source.lines().count().max(1), "missing .cpu directive"));
    };
    if let Some(open) = section.take() {
        spans.push(open.into_span(MachineSpec::of(machine))?);
    }
    if spans.is_empty() {
        return Err(SourceError::MissingCode);
    }

    Ok(Program {
        machine,
        spans,
        inputs,
        outputs,
        enter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn minimal_source_test() {
        let program = parse(".cpu mm-2\n.code\n9900000000\n").unwrap();
        assert_eq!(program.machine, MachineId::Mm2);
        assert_eq!(
            program.spans,
            vec![Span {
                address: 0,
                cells: vec![Word::new(0x9900000000, 40)],
            }]
        );
        assert!(program.inputs.is_empty());
        assert!(program.enter.is_none());
    }

    #[test]
    fn directives_test() {
        let source = "\
; leading comment
.cpu mm-1

.input 0x100, 0x101 two numbers
.output 258
.enter 5 ; inline input
.enter 6
.code 0x10
000100 ; load
990000
";
        let program = parse(source).unwrap();
        assert_eq!(program.machine, MachineId::Mm1);
        assert_eq!(
            program.inputs,
            vec![
                IoBinding {
                    address: 0x100,
                    count: 1,
                    message: Some("two numbers".into()),
                },
                IoBinding {
                    address: 0x101,
                    count: 1,
                    message: Some("two numbers".into()),
                },
            ]
        );
        assert_eq!(program.outputs, vec![IoBinding::new(258)]);
        assert_eq!(program.enter.as_deref(), Some("5 6"));
        assert_eq!(program.spans.len(), 1);
        assert_eq!(program.spans[0].address, 0x10);
        assert_eq!(
            program.spans[0].cells,
            vec![Word::new(0x000100, 24), Word::new(0x990000, 24)]
        );
    }

    #[test]
    fn hex_grouping_test() {
        // One word may be split over several groups and lines
        let source = ".cpu mm-v\n.code\n99 01 0005\n0006\n";
        let program = parse(source).unwrap();
        assert_eq!(program.spans[0].cells.len(), 6);
    }

    #[test]
    fn incomplete_word_test() {
        let source = ".cpu mm-3\n.code\n990000\n";
        assert_eq!(
            parse(source),
            Err(SourceError::Syntax {
                line: 2,
                message: "incomplete machine word: 6 hex digits is not a multiple of 14".into(),
            })
        );
    }

    #[test]
    fn unknown_cpu_test() {
        assert_eq!(
            parse(".cpu mm-x\n.code\n99\n"),
            Err(SourceError::UnknownCpu {
                line: 1,
                name: "mm-x".into(),
            })
        );
    }

    #[test]
    fn cpu_must_come_first_test() {
        assert!(matches!(
            parse(".code\n99\n"),
            Err(SourceError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn missing_code_test() {
        assert_eq!(parse(".cpu mm-s\n"), Err(SourceError::MissingCode));
    }

    #[test]
    fn stray_text_test() {
        assert!(matches!(
            parse(".cpu mm-s\nhello\n"),
            Err(SourceError::Syntax { line: 2, .. })
        ));
    }

    #[test]
    fn bad_hex_test() {
        assert!(matches!(
            parse(".cpu mm-s\n.code\n99zz\n"),
            Err(SourceError::Syntax { line: 3, .. })
        ));
    }
}
