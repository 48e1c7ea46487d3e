//! Progress bar, spinner and the end-of-run summary.

use super::colors::{error_symbol, format_size, info_symbol, success_symbol, warning_symbol};
use crate::error::SaveError;
use crate::normalizer::{FailureAction, FailureHandler};
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

const FILE_TEMPLATE: &str = "[{bar:20.cyan/blue}] {pos}/{len} files ({percent}%) {wide_msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";

/// Bar over the files of a run. Draws nothing when `quiet` or when stderr is
/// not a terminal.
pub fn file_progress(total: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(FILE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("\u{2588}\u{2591}"),
    );
    pb
}

/// Spinner shown while folders are walked.
pub fn spinner(message: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Runs a [`FailureHandler`] with the bar taken off the terminal, so a
/// question never shares a line with it.
pub struct Suspended<'a, H: ?Sized> {
    bar: &'a ProgressBar,
    inner: &'a mut H,
}

impl<'a, H: FailureHandler + ?Sized> Suspended<'a, H> {
    pub fn new(bar: &'a ProgressBar, inner: &'a mut H) -> Self {
        Self { bar, inner }
    }
}

impl<H: FailureHandler + ?Sized> FailureHandler for Suspended<'_, H> {
    fn on_write_failure(&mut self, path: &Path, error: &SaveError) -> FailureAction {
        let inner = &mut *self.inner;
        self.bar.suspend(|| inner.on_write_failure(path, error))
    }
}

/// Tally of a `fix` run.
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    /// Files rewritten without their resolution chunk.
    pub fixed: usize,
    /// Files that had nothing to remove, were not PNGs, or kept their DPI.
    pub compliant: usize,
    /// Files left alone after a failed write.
    pub skipped: usize,
    /// Files that could not be parsed.
    pub failed: usize,
    /// Whether the run was cancelled before the last file.
    pub aborted: bool,
    /// Total bytes removed across all files.
    pub bytes_removed: u64,
    pub duration: Duration,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fixed(&mut self, bytes_removed: u64) {
        self.fixed += 1;
        self.bytes_removed += bytes_removed;
    }

    pub fn add_compliant(&mut self) {
        self.compliant += 1;
    }

    pub fn add_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn add_failure(&mut self) {
        self.failed += 1;
    }

    pub fn set_aborted(&mut self) {
        self.aborted = true;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Number of files that reached a final state.
    pub fn total(&self) -> usize {
        self.fixed + self.compliant + self.skipped + self.failed
    }

    /// Whether the run should exit non-zero.
    pub fn has_problems(&self) -> bool {
        self.failed > 0 || self.aborted
    }
}

const INNER_WIDTH: usize = 38;

/// One line of the summary box; `text` is plain, `mark` is one column wide.
fn summary_row(mark: Option<ColoredString>, text: &str) {
    let (prefix, used) = match mark {
        Some(mark) => (format!("  {} ", mark), 4),
        None => (String::new(), 0),
    };
    let pad = INNER_WIDTH.saturating_sub(used + text.chars().count());
    println!("\u{2502}{}{}{:pad$}\u{2502}", prefix, text, "", pad = pad);
}

/// Print a summary report box.
pub fn print_summary(stats: &ProcessingStats, title: &str, quiet: bool) {
    if quiet {
        return;
    }

    let horizontal: String = "\u{2500}".repeat(INNER_WIDTH);

    println!();
    println!("\u{256D}{}\u{256E}", horizontal);

    let left = INNER_WIDTH.saturating_sub(title.chars().count()) / 2;
    let right = INNER_WIDTH.saturating_sub(left + title.chars().count());
    println!(
        "\u{2502}{:left$}{}{:right$}\u{2502}",
        "",
        title.bold(),
        "",
        left = left,
        right = right
    );

    println!("\u{251C}{}\u{2524}", horizontal);

    summary_row(Some(success_symbol()), &format!("Fixed:      {} files", stats.fixed));
    summary_row(Some(info_symbol()), &format!("Compliant:  {} files", stats.compliant));
    if stats.skipped > 0 {
        summary_row(Some(warning_symbol()), &format!("Skipped:    {} files", stats.skipped));
    }
    if stats.failed > 0 {
        summary_row(Some(error_symbol()), &format!("Failed:     {} files", stats.failed));
    }
    if stats.aborted {
        summary_row(Some(error_symbol()), "Cancelled before finishing");
    }

    summary_row(None, "");
    summary_row(
        None,
        &format!("  Metadata removed: {}", format_size(stats.bytes_removed)),
    );
    summary_row(
        None,
        &format!("  Time elapsed: {:.1}s", stats.duration.as_secs_f64()),
    );

    println!("\u{2570}{}\u{256F}", horizontal);
}
