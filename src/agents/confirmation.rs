use crate::error::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Asks the user before destructive operations.
///
/// Disabled confirmations (`--force`) always answer yes.
pub struct Confirmation {
    enabled: bool,
}

impl Confirmation {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Confirm on the terminal.
    pub fn confirm(&self, warning: &str) -> Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.confirm_with(warning, &mut stdin.lock(), &mut stdout)
    }

    pub fn confirm_with<R: BufRead, W: Write>(
        &self,
        warning: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        if !self.enabled {
            return Ok(true);
        }

        writeln!(output, "{}", warning.red().bold())?;
        writeln!(
            output,
            "Are you sure you want to proceed? (answer 'yes' or 'y' to confirm)"
        )?;
        output.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        let answer = answer.trim().to_lowercase();

        Ok(matches!(answer.as_str(), "y" | "yes"))
    }
}
