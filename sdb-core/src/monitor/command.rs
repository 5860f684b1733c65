//! Monitor command language
//!
//! One command per line: a command name followed by its arguments. Expression
//! arguments take the rest of the line verbatim.

use thiserror::Error;

use crate::watch::WatchpointId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{name}'")]
    Unknown { name: String },

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{command}': invalid argument '{argument}': {reason}")]
    InvalidArgument {
        command: &'static str,
        argument: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoTarget {
    Registers,
    Watchpoints,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    /// `si [N]`
    Step(u64),
    /// `info r` / `info w`
    Info(InfoTarget),
    /// `x N EXPR`
    Examine { count: usize, expr: String },
    /// `p EXPR`
    Print(String),
    /// `w EXPR`
    Watch(String),
    /// `d N`
    Delete(WatchpointId),
    /// `set $REG EXPR`
    SetRegister { name: String, expr: String },
}

/// Name, usage and description of every command, in help order
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("help", "help", "Display information about all supported commands"),
    ("q", "q", "Exit the debugger"),
    ("si", "si [N]", "Execute N instructions (default 1), stopping when a watchpoint changes"),
    ("info", "info r|w", "Print registers or watchpoints"),
    ("x", "x N EXPR", "Examine N words of memory starting at address EXPR"),
    ("p", "p EXPR", "Evaluate an expression"),
    ("w", "w EXPR", "Stop execution when the value of EXPR changes"),
    ("d", "d N", "Delete watchpoint number N"),
    ("set", "set $REG EXPR", "Assign the value of EXPR to a register"),
];

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name {
            "help" | "h" => Command::Help,
            "q" | "quit" => Command::Quit,
            "si" => Command::Step(parse_step_count(rest)?),
            "info" | "i" => Command::Info(parse_info_target(rest)?),
            "x" => parse_examine(rest)?,
            "p" | "print" => Command::Print(required(rest, "p", "an expression")?),
            "w" | "watch" => Command::Watch(required(rest, "w", "an expression")?),
            "d" | "delete" => Command::Delete(parse_watchpoint_id(rest)?),
            "set" => parse_set(rest)?,
            other => {
                return Err(CommandError::Unknown {
                    name: other.to_string(),
                })
            }
        };
        Ok(Some(command))
    }
}

fn required(rest: &str, command: &'static str, argument: &'static str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(rest.to_string())
    }
}

fn invalid(command: &'static str, argument: &str, reason: impl ToString) -> CommandError {
    CommandError::InvalidArgument {
        command,
        argument: argument.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_step_count(rest: &str) -> Result<u64, CommandError> {
    if rest.is_empty() {
        return Ok(1);
    }
    rest.parse().map_err(|e| invalid("si", rest, e))
}

fn parse_info_target(rest: &str) -> Result<InfoTarget, CommandError> {
    match rest {
        "r" => Ok(InfoTarget::Registers),
        "w" => Ok(InfoTarget::Watchpoints),
        "" => Err(CommandError::MissingArgument {
            command: "info",
            argument: "'r' or 'w'",
        }),
        other => Err(invalid("info", other, "expected 'r' or 'w'")),
    }
}

fn parse_watchpoint_id(rest: &str) -> Result<WatchpointId, CommandError> {
    let arg = required(rest, "d", "a watchpoint number")?;
    arg.parse()
        .map(WatchpointId)
        .map_err(|e| invalid("d", &arg, e))
}

fn parse_examine(rest: &str) -> Result<Command, CommandError> {
    let (count, expr) = rest
        .split_once(char::is_whitespace)
        .map(|(count, expr)| (count, expr.trim()))
        .ok_or(CommandError::MissingArgument {
            command: "x",
            argument: "a word count and an address expression",
        })?;
    let count = count.parse().map_err(|e| invalid("x", count, e))?;
    Ok(Command::Examine {
        count,
        expr: expr.to_string(),
    })
}

fn parse_set(rest: &str) -> Result<Command, CommandError> {
    let (reg, expr) = rest
        .split_once(char::is_whitespace)
        .map(|(reg, expr)| (reg, expr.trim()))
        .ok_or(CommandError::MissingArgument {
            command: "set",
            argument: "a register and an expression",
        })?;
    let name = reg
        .strip_prefix('$')
        .filter(|name| !name.is_empty())
        .ok_or_else(|| invalid("set", reg, "registers are written as $name"))?;
    Ok(Command::SetRegister {
        name: name.to_string(),
        expr: expr.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_expression_keeps_rest_of_line() {
        assert_eq!(parse("p 1 + 2 * $a0"), Command::Print("1 + 2 * $a0".to_string()));
        assert_eq!(parse("w   $pc == 0x80000010 "), Command::Watch("$pc == 0x80000010".to_string()));
    }

    #[test]
    fn test_step_default_and_count() {
        assert_eq!(parse("si"), Command::Step(1));
        assert_eq!(parse("si 10"), Command::Step(10));
        assert!(matches!(
            Command::parse("si ten"),
            Err(CommandError::InvalidArgument { command: "si", .. })
        ));
    }

    #[test]
    fn test_info() {
        assert_eq!(parse("info r"), Command::Info(InfoTarget::Registers));
        assert_eq!(parse("info w"), Command::Info(InfoTarget::Watchpoints));
        assert!(matches!(
            Command::parse("info"),
            Err(CommandError::MissingArgument { command: "info", .. })
        ));
        assert!(Command::parse("info x").is_err());
    }

    #[test]
    fn test_delete() {
        assert_eq!(parse("d 3"), Command::Delete(WatchpointId(3)));
        assert!(matches!(
            Command::parse("d"),
            Err(CommandError::MissingArgument { command: "d", .. })
        ));
        assert!(Command::parse("d -1").is_err());
    }

    #[test]
    fn test_examine() {
        assert_eq!(
            parse("x 4 $sp + 8"),
            Command::Examine {
                count: 4,
                expr: "$sp + 8".to_string()
            }
        );
        assert!(Command::parse("x 4").is_err());
        assert!(Command::parse("x four 0x0").is_err());
    }

    #[test]
    fn test_set_register() {
        assert_eq!(
            parse("set $a0 0x10 + 1"),
            Command::SetRegister {
                name: "a0".to_string(),
                expr: "0x10 + 1".to_string()
            }
        );
        assert!(Command::parse("set a0 1").is_err());
        assert!(Command::parse("set $ 1").is_err());
        assert!(Command::parse("set $a0").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Command::parse("frobnicate 1"),
            Err(CommandError::Unknown {
                name: "frobnicate".to_string()
            })
        );
    }

    #[test]
    fn test_help_table_covers_commands() {
        for (name, _, _) in COMMANDS {
            let line = match *name {
                "info" => "info r".to_string(),
                "x" => "x 1 0".to_string(),
                "p" | "w" => format!("{} 1", name),
                "d" => "d 0".to_string(),
                "set" => "set $a0 1".to_string(),
                other => other.to_string(),
            };
            assert!(Command::parse(&line).is_ok(), "{} failed to parse", line);
        }
    }
}
