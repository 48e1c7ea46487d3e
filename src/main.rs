//! dpifix - strip resolution metadata from PNG images

use clap::Parser;
use dpifix::cli::{Cli, Config};
use dpifix::processor::Processor;
use dpifix::settings::Settings;
use dpifix::terminal::{print_error, print_summary};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let settings_path = cli.settings.clone().or_else(Settings::default_path);
    let mut settings = settings_path
        .as_deref()
        .map(Settings::load_or_default)
        .unwrap_or_default();

    let config = match Config::from_cli(&cli, &settings) {
        Ok(c) => c,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::from(2);
        }
    };

    let mut processor = Processor::new(config.clone());
    let code = match processor.run() {
        Ok(stats) => {
            if matches!(config.mode, dpifix::cli::Mode::Fix) {
                let title = if config.dry_run { "Dry Run Complete" } else { "Fix Complete" };
                print_summary(&stats, title, config.quiet);
            }
            if stats.has_problems() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            print_error(&e.to_string());
            ExitCode::from(1)
        }
    };

    if let (Some(path), Some(folder)) = (settings_path, config.remembered_folder()) {
        settings.folder = Some(folder.canonicalize().unwrap_or(folder));
        if let Err(e) = settings.save(&path) {
            tracing::warn!(error = %e, "could not save settings");
        }
    }

    code
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) | (false, 0) => "error",
        (false, 1) => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dpifix={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}
