//! Terminal I/O utilities for CLI.
//!
//! Provides TTY detection for status output.

use std::io::IsTerminal;

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}", message);
    }
}

// log_status! macro is defined in lib.rs (#[macro_export]) and available crate-wide.
