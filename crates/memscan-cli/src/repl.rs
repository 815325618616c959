//! Read-eval-print loop over a scan session.

use std::io::{BufRead, Write};

use anyhow::Result;
use memscan_core::{Error, ErrorKind, QueryMemory, ReadMemory, ScanSession};
use tracing::warn;

use crate::commands::{self, Command, HELP};

/// Run commands from `input` until `quit` or end of input.
///
/// Recoverable errors are reported on `output` and the loop continues.
pub fn run<M, R, W>(memory: &M, session: &mut ScanSession, input: R, mut output: W) -> Result<()>
where
    M: ReadMemory + QueryMemory,
    R: BufRead,
    W: Write,
{
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        match commands::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(e) = execute(memory, session, command, &mut output) {
                    report(&e, &mut output)?;
                }
            }
            Ok(None) => {}
            Err(e) => writeln!(output, "{e}")?,
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}

fn report<W: Write>(err: &anyhow::Error, output: &mut W) -> Result<()> {
    match err.downcast_ref::<Error>().map(Error::kind) {
        Some(ErrorKind::NoMatch) => writeln!(output, "No matches")?,
        Some(ErrorKind::InvalidInput) => writeln!(output, "Invalid input: {err}")?,
        Some(ErrorKind::Io) => {
            warn!("{}", err);
            writeln!(output, "Error: {err}")?;
        }
        None => writeln!(output, "Error: {err:#}")?,
    }
    Ok(())
}

fn execute<M, W>(
    memory: &M,
    session: &mut ScanSession,
    command: Command,
    output: &mut W,
) -> Result<()>
where
    M: ReadMemory + QueryMemory,
    W: Write,
{
    match command {
        Command::Scan(text) => {
            let outcome = session.first_scan(memory, &text);
            print_summary(session, output)?;
            let stats = outcome?;
            writeln!(
                output,
                "{} regions scanned, {} skipped, {} read errors",
                stats.regions_visited - stats.regions_skipped,
                stats.regions_skipped,
                stats.read_errors
            )?;
        }
        Command::Next(text) => {
            let outcome = session.next_scan(memory, &text);
            print_summary(session, output)?;
            outcome?;
        }
        Command::Type(value_type) => {
            session.set_value_type(value_type);
            writeln!(output, "Value type: {value_type}")?;
        }
        Command::Results { json } => {
            if json {
                writeln!(output, "{}", serde_json::to_string_pretty(session.results())?)?;
            } else {
                print_results(session, output)?;
            }
        }
        Command::Refresh => {
            session.refresh_results(memory);
            print_results(session, output)?;
        }
        Command::Select(index) => {
            let entry = session.add_to_selection(index)?;
            writeln!(output, "Selected 0x{:X} = {}", entry.address, entry.value())?;
        }
        Command::Selection { json } => {
            if json {
                writeln!(output, "{}", serde_json::to_string_pretty(session.selection())?)?;
            } else {
                print_selection(session, output)?;
            }
        }
        Command::Edit(index, value) => {
            let len = session.selection().len();
            let entry = session
                .selection_mut()
                .get_mut(index)
                .ok_or(Error::IndexOutOfBounds { index, len })?;
            entry.edit_value(&value);
            writeln!(output, "0x{:X} = {}", entry.address, entry.value())?;
        }
        Command::Freeze(index) => {
            let len = session.selection().len();
            let entry = session
                .selection_mut()
                .get_mut(index)
                .ok_or(Error::IndexOutOfBounds { index, len })?;
            let state = if entry.toggle_freeze() { "frozen" } else { "unfrozen" };
            writeln!(output, "0x{:X} {}", entry.address, state)?;
        }
        Command::Unselect(index) => {
            let entry = session.selection_mut().remove(index)?;
            writeln!(output, "Removed 0x{:X}", entry.address)?;
        }
        Command::Reset => {
            session.reset();
            writeln!(output, "Session cleared")?;
        }
        Command::Help => writeln!(output, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn print_summary<W: Write>(session: &ScanSession, output: &mut W) -> Result<()> {
    let total = session.candidates().len();
    if total == 0 {
        return Ok(());
    }
    let shown = session.results().len();
    if shown < total {
        writeln!(output, "{total} candidates ({shown} shown)")?;
    } else {
        writeln!(output, "{total} candidates")?;
    }
    Ok(())
}

fn print_results<W: Write>(session: &ScanSession, output: &mut W) -> Result<()> {
    let results = session.results();
    if results.is_empty() {
        writeln!(output, "No results")?;
        return Ok(());
    }
    writeln!(output, "{:>5}  {:<18}  {:<20}  {}", "#", "Address", "Value", "Previous")?;
    for (i, row) in results.entries().iter().enumerate() {
        writeln!(
            output,
            "{:>5}  0x{:<16X}  {:<20}  {}",
            i, row.address, row.value, row.previous_value
        )?;
    }
    Ok(())
}

fn print_selection<W: Write>(session: &ScanSession, output: &mut W) -> Result<()> {
    let selection = session.selection();
    if selection.is_empty() {
        writeln!(output, "Selection is empty")?;
        return Ok(());
    }
    writeln!(output, "{:>5}  {:<18}  {:<20}  {}", "#", "Address", "Value", "Frozen")?;
    for (i, entry) in selection.entries().iter().enumerate() {
        writeln!(
            output,
            "{:>5}  0x{:<16X}  {:<20}  {}",
            i,
            entry.address,
            entry.value(),
            if entry.frozen { "yes" } else { "no" }
        )?;
    }
    Ok(())
}
