//! Status symbols and one-line message helpers.
//!
//! Colouring goes through `colored`, which already honours `NO_COLOR`,
//! `CLICOLOR` and whether stdout is a terminal.

use colored::{ColoredString, Colorize};

/// Green check mark.
pub fn success_symbol() -> ColoredString {
    "\u{2713}".green().bold()
}

/// Red cross.
pub fn error_symbol() -> ColoredString {
    "\u{2717}".red().bold()
}

/// Yellow warning sign.
pub fn warning_symbol() -> ColoredString {
    "\u{26A0}".yellow().bold()
}

/// Blue info sign.
pub fn info_symbol() -> ColoredString {
    "\u{2139}".blue().bold()
}

/// Dimmed bullet for neutral lines.
pub fn bullet_symbol() -> ColoredString {
    "\u{2022}".dimmed()
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", success_symbol(), message);
}

/// Print an error message to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", error_symbol(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", warning_symbol(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", info_symbol(), message);
}

/// Print a neutral list item.
pub fn print_item(message: &str) {
    println!("{} {}", bullet_symbol(), message);
}

/// Format a byte count in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
