//! Interactive command parsing.
//!
//! Each input line is one command word followed by its arguments.

use anyhow::{Context, Result, bail};
use memscan_core::ValueType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// First scan over the whole address space
    Scan(String),
    /// Refine the current candidates
    Next(String),
    /// Change the value type for later passes
    Type(ValueType),
    /// Print the results table
    Results { json: bool },
    /// Re-read the values shown in the results table
    Refresh,
    /// Copy a results row into the selection
    Select(usize),
    /// Print the selection table
    Selection { json: bool },
    /// Replace the value text of a selection row
    Edit(usize, String),
    /// Toggle the freeze flag of a selection row
    Freeze(usize),
    /// Remove a selection row
    Unselect(usize),
    /// Drop candidates, results and selection
    Reset,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  scan <value>          Scan the whole process for <value>
  next <value>          Keep only candidates now holding <value>
  type <name>           Set value type (byte, 2bytes, 4bytes, 8bytes)
  results [--json]      Show the results table
  refresh               Re-read values shown in the results table
  select <row>          Copy a results row into the selection
  selection [--json]    Show the selection table
  edit <row> <value>    Change the value text of a selection row
  freeze <row>          Toggle the freeze flag of a selection row
  unselect <row>        Remove a selection row
  reset                 Clear candidates, results and selection
  help                  Show this help
  quit                  Exit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "scan" | "s" => Command::Scan(required(rest, "value")?.to_string()),
        "next" | "n" => Command::Next(required(rest, "value")?.to_string()),
        "type" | "t" => {
            let name = required(rest, "type name")?;
            Command::Type(
                name.parse()
                    .map_err(|_| anyhow::anyhow!("Unknown value type: {name}"))?,
            )
        }
        "results" | "r" => Command::Results {
            json: json_flag(rest)?,
        },
        "refresh" => Command::Refresh,
        "select" => Command::Select(row(rest)?),
        "selection" | "sel" => Command::Selection {
            json: json_flag(rest)?,
        },
        "edit" => {
            let (index, value) = rest
                .split_once(char::is_whitespace)
                .context("Usage: edit <row> <value>")?;
            Command::Edit(row(index)?, value.trim().to_string())
        }
        "freeze" => Command::Freeze(row(rest)?),
        "unselect" => Command::Unselect(row(rest)?),
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("Unknown command: {other} (type 'help')"),
    };
    Ok(Some(command))
}

fn required<'a>(rest: &'a str, what: &str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("Missing {what}");
    }
    Ok(rest)
}

fn row(text: &str) -> Result<usize> {
    let text = required(text, "row number")?;
    text.parse()
        .with_context(|| format!("Invalid row number: {text}"))
}

fn json_flag(rest: &str) -> Result<bool> {
    match rest {
        "" => Ok(false),
        "--json" => Ok(true),
        other => bail!("Unexpected argument: {other}"),
    }
}
