//! Command-line argument parsing for dpifix.

use crate::error::{Error, Result};
use crate::normalizer::Policy;
use crate::png::{PHYS, Tag};
use crate::settings::Settings;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Application name.
pub const NAME: &str = "dpifix";

/// Resolution left in place unless `--keep-dpi` or `--any-dpi` says otherwise.
pub const DEFAULT_KEEP_DPI: u32 = 96;

/// dpifix - strip resolution metadata from PNG images
#[derive(Parser, Debug)]
#[command(name = NAME, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show more detail (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Settings file (default: platform config directory)
    #[arg(long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List PNG images and their resolution metadata
    Scan(TargetArgs),
    /// Remove the resolution chunk from every PNG image
    Fix(FixArgs),
}

/// Which files to look at.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Image files or folders (default: the folder used last time)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Only look at the top level of each folder
    #[arg(long)]
    pub no_recursive: bool,

    /// Chunk type to look for
    #[arg(long, value_name = "TAG", default_value = "pHYs", value_parser = parse_tag)]
    pub tag: Tag,
}

#[derive(Args, Debug, Clone)]
pub struct FixArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// What to do when a file cannot be written
    #[arg(long, value_enum, default_value_t = OnError::Prompt)]
    pub on_error: OnError,

    /// Attempts per file with --on-error retry before skipping it
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub max_retries: u32,

    /// Show what would be fixed without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Leave images whose pHYs already records this resolution
    #[arg(long, value_name = "DPI", default_value_t = DEFAULT_KEEP_DPI)]
    pub keep_dpi: u32,

    /// Remove pHYs whatever resolution it records
    #[arg(long, conflicts_with = "keep_dpi")]
    pub any_dpi: bool,
}

/// Write-failure behaviour.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    /// Ask on the terminal; falls back to skip when stdin is not a terminal
    Prompt,
    /// Retry up to --max-retries times, then skip
    Retry,
    /// Leave the file and continue
    Skip,
    /// Stop the whole run
    Abort,
}

fn parse_tag(s: &str) -> std::result::Result<Tag, String> {
    Tag::parse(s).ok_or_else(|| format!("'{}' is not a four-letter chunk type", s))
}

/// What the run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Scan,
    Fix,
}

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    /// Input paths (files or directories).
    pub paths: Vec<PathBuf>,
    /// Walk directories recursively.
    pub recursive: bool,
    /// Chunk type to remove.
    pub tag: Tag,
    /// Write-failure behaviour.
    pub on_error: OnError,
    pub max_retries: u32,
    /// Show what would be done without making changes.
    pub dry_run: bool,
    /// Files whose `pHYs` rounds to this many dpi are left alone.
    pub keep_dpi: Option<u32>,
    pub verbose: u8,
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Scan,
            paths: Vec::new(),
            recursive: true,
            tag: PHYS,
            on_error: OnError::Prompt,
            max_retries: 3,
            dry_run: false,
            keep_dpi: Some(DEFAULT_KEEP_DPI),
            verbose: 0,
            quiet: false,
        }
    }
}

impl Config {
    /// Resolve parsed arguments, taking the folder from `settings` when no
    /// path was given.
    pub fn from_cli(cli: &Cli, settings: &Settings) -> Result<Self> {
        let (mode, target, on_error, max_retries, dry_run, keep_dpi) = match &cli.command {
            Command::Scan(t) => (Mode::Scan, t, OnError::Prompt, 3, false, None),
            Command::Fix(f) => (
                Mode::Fix,
                &f.target,
                f.on_error,
                f.max_retries,
                f.dry_run,
                (!f.any_dpi).then_some(f.keep_dpi),
            ),
        };

        let paths = if target.paths.is_empty() {
            vec![settings.folder.clone().ok_or(Error::NoFolder)?]
        } else {
            target.paths.clone()
        };

        if on_error == OnError::Retry && max_retries == 0 {
            return Err(Error::InvalidArgument {
                argument: String::from("--max-retries"),
                reason: String::from("must be at least 1 with --on-error retry"),
            });
        }

        Ok(Self {
            mode,
            paths,
            recursive: !target.no_recursive,
            tag: target.tag,
            on_error,
            max_retries,
            dry_run,
            keep_dpi,
            verbose: cli.verbose,
            quiet: cli.quiet,
        })
    }

    /// The folder to remember for next time, if this run targeted one.
    pub fn remembered_folder(&self) -> Option<PathBuf> {
        self.paths.iter().find(|p| p.is_dir()).cloned()
    }

    /// Non-interactive policy for `on_error`, or `None` for the prompt.
    pub fn policy(&self) -> Option<Policy> {
        match self.on_error {
            OnError::Prompt => None,
            OnError::Retry => Some(Policy::Retry {
                max_retries: self.max_retries,
            }),
            OnError::Skip => Some(Policy::Skip),
            OnError::Abort => Some(Policy::Abort),
        }
    }
}
