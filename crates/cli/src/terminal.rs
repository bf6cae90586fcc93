use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use crate::client::Outcome;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const ACCEPTED: Color = Color::Green;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
}

/// Prints server answers. Bodies go to stdout untouched; the colored status
/// line goes to stderr so output can be piped.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    pub fn print_outcome(&self, outcome: &Outcome) -> Result<()> {
        let mut stderr = io::stderr();
        match outcome {
            Outcome::Accepted { status, job_id, body } => {
                let label = match job_id {
                    Some(id) => format!("accepted ({status}) job_id={id}\n"),
                    None => format!("accepted ({status})\n"),
                };
                execute!(
                    stderr,
                    SetForegroundColor(Colors::ACCEPTED),
                    Print(label),
                    ResetColor,
                )?;
                self.print_body(body)
            }
            Outcome::Rejected { status, body } => {
                execute!(
                    stderr,
                    SetForegroundColor(Colors::ERROR),
                    Print(format!("rejected ({status})\n")),
                    ResetColor,
                )?;
                self.print_body(body)
            }
        }
    }

    pub fn print_body(&self, body: &str) -> Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{body}")?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::DIM),
            Print(msg),
            Print("\n"),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        Ok(())
    }
}
