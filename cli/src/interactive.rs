//! The interactive debugger prompt.
//!
//! A small REPL over the emulator's debugger surface: stepping, breakpoints
//! and state inspection. Output bindings are printed when the machine halts
//! normally, mirroring the batch `run` command.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use mmach_emulator::constants::ADDRESS_BITS;
use mmach_emulator::debugger::{Debugger, StopCause};
use mmach_emulator::loader::{parse_number, Cpu};
use mmach_emulator::runtime::Status;
use mmach_emulator::word::Word;

use crate::commands::{EXIT_ERROR_HALT, EXIT_OK};

const HELP: &str = "\
commands:
  step [N], s       execute one (or N) instructions
  continue, c       run until halt or breakpoint
  break ADDR, b     set a breakpoint
  registers, r      show the register file
  memory ADDR [N]   show N cells starting at ADDR
  quit, q           leave the debugger";

fn parse_address(token: &str) -> Option<u16> {
    let value = parse_number(token).ok()?;
    u16::try_from(value).ok()
}

fn show_registers(debugger: &Debugger) {
    let state = debugger.computer().registers.state();
    let line: Vec<String> = state
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect();
    println!("{}", line.join(" | "));
}

fn show_memory(debugger: &Debugger, address: u16, count: u16) {
    let computer = debugger.computer();
    for i in 0..u64::from(count) {
        let cell_address = Word::new(u64::from(address) + i, ADDRESS_BITS);
        match computer.ram.fetch(cell_address, computer.spec.cell_bits) {
            Ok(cell) => println!("{cell_address}: {}", cell.hex()),
            Err(_) => println!("{cell_address}: (uninitialised)"),
        }
    }
}

fn report(cause: &StopCause, debugger: &Debugger) {
    match cause {
        StopCause::Paused => show_registers(debugger),
        StopCause::Breakpoint(address) => {
            println!("breakpoint at {address:#06x}");
            show_registers(debugger);
        }
        StopCause::Halted => println!("machine halted after {} cycles", debugger.cycles()),
        StopCause::Failed(fault) => println!("error halt: {fault}"),
        StopCause::StepLimitExceeded => println!("step limit exceeded"),
    }
}

pub fn run_interactive(cpu: &mut Cpu) -> i32 {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("cannot open the terminal: {e}");
            return EXIT_ERROR_HALT;
        }
    };

    {
        let mut debugger = Debugger::new(&mut cpu.computer);
        println!("{HELP}");
        loop {
            let line = match editor.readline("(mmach) ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("input error: {e}");
                    break;
                }
            };
            let _ = editor.add_history_entry(&line);
            let mut words = line.split_whitespace();

            match words.next() {
                None => {}
                Some("step" | "s") => {
                    let count = words.next().and_then(|t| parse_number(t).ok()).unwrap_or(1);
                    let cause = debugger.step(count.max(0) as u64);
                    report(&cause, &debugger);
                }
                Some("continue" | "c") => {
                    let cause = debugger.run(None);
                    report(&cause, &debugger);
                }
                Some("break" | "b") => match words.next().and_then(parse_address) {
                    Some(address) => {
                        debugger.set_breakpoint(address);
                        println!("breakpoint set at {address:#06x}");
                    }
                    None => println!("usage: break ADDR"),
                },
                Some("registers" | "r") => show_registers(&debugger),
                Some("memory" | "m") => {
                    let address = words.next().and_then(parse_address);
                    let count = words
                        .next()
                        .and_then(parse_address)
                        .unwrap_or(8);
                    match address {
                        Some(address) => show_memory(&debugger, address, count),
                        None => println!("usage: memory ADDR [COUNT]"),
                    }
                }
                Some("quit" | "q") => break,
                Some("help") => println!("{HELP}"),
                Some(other) => println!("unknown command `{other}`, try `help`"),
            }

            if debugger.computer().status() != Status::Running {
                break;
            }
        }
    }

    match cpu.computer.status() {
        Status::Halted => match cpu.outputs() {
            Ok(values) => {
                for value in values {
                    println!("{value}");
                }
                EXIT_OK
            }
            Err(e) => {
                eprintln!("{e}");
                EXIT_ERROR_HALT
            }
        },
        Status::Failed => EXIT_ERROR_HALT,
        Status::Running => EXIT_OK,
    }
}
