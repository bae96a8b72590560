//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips the escapes when stdout
//! isn't a terminal.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Semantic colors for CLI output
pub trait Stylize {
    /// Secondary information
    fn muted(&self) -> String;
    /// Headings
    fn emphasis(&self) -> String;
    /// Names and identifiers
    fn accent(&self) -> String;
    /// Completed actions
    fn success(&self) -> String;
    /// Problems the user should look at
    fn warn(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    fn success(&self) -> String {
        self.green().to_string()
    }

    fn warn(&self) -> String {
        self.yellow().to_string()
    }
}

/// Green check mark
pub fn check() -> String {
    "✓".success()
}
