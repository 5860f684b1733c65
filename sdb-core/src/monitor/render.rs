//! Text rendering of command results

use super::command::COMMANDS;
use super::StepOutcome;
use crate::machine::{Word, WORD_BYTES};
use crate::watch::Watchpoint;

/// Hex digits in a zero-padded word
const HEX_WIDTH: usize = WORD_BYTES * 2 + 2;

/// Words per line in a memory dump
const WORDS_PER_LINE: usize = 4;

pub(super) fn value(value: Word) -> String {
    format!("{} ({:#x})", value, value)
}

pub(super) fn help() -> String {
    let width = COMMANDS.iter().map(|(_, usage, _)| usage.len()).max().unwrap_or(0);
    COMMANDS
        .iter()
        .map(|(_, usage, description)| format!("{:<width$}  {}", usage, description, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn watchpoints<'a>(watchpoints: impl Iterator<Item = &'a Watchpoint>) -> String {
    let mut lines = vec![format!("{:<8}{}", "NUM", "What")];
    lines.extend(watchpoints.map(|wp| format!("{:<8}{}", wp.id, wp.expression)));
    if lines.len() == 1 {
        return "No watchpoints.".to_string();
    }
    lines.join("\n")
}

pub(super) fn registers(registers: &[(&'static str, Word)]) -> String {
    registers
        .iter()
        .map(|(name, value)| format!("{:<6}{:#0w$x}  {}", name, value, value, w = HEX_WIDTH))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn memory(words: &[(Word, Word)]) -> String {
    words
        .chunks(WORDS_PER_LINE)
        .map(|line| {
            let values = line
                .iter()
                .map(|(_, value)| format!("{:#0w$x}", value, w = HEX_WIDTH))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{:#0w$x}: {}", line[0].0, values, w = HEX_WIDTH)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn step(outcome: &StepOutcome, pc: Word) -> String {
    let mut lines: Vec<String> = outcome
        .report
        .failures
        .iter()
        .map(|failure| failure.to_string())
        .collect();
    lines.extend(outcome.report.changes.iter().map(|change| change.to_string()));
    if outcome.stopped_by_watchpoint() {
        lines.push(format!(
            "Stopped after {} instruction(s) at pc = {:#0w$x}",
            outcome.executed,
            pc,
            w = HEX_WIDTH
        ));
    }
    lines.join("\n")
}
