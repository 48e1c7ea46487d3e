//! Interactive retry/skip/cancel question for failed writes.

use super::colors::error_symbol;
use crate::error::SaveError;
use crate::normalizer::{FailureAction, FailureHandler};
use dialoguer::Select;
use std::path::Path;
use tracing::warn;

const CHOICES: [&str; 3] = ["Retry", "Skip this file", "Cancel the run"];

/// Highlighted when the question opens.
const DEFAULT_CHOICE: usize = 0;

/// Asks on the terminal what to do each time a write fails.
///
/// Enter confirms the highlighted choice, which starts on Retry. Only an
/// explicit Cancel, Escape or an unreadable terminal stops the run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Prompt;

impl FailureHandler for Prompt {
    fn on_write_failure(&mut self, path: &Path, error: &SaveError) -> FailureAction {
        eprintln!(
            "{} Error fixing image {}: {}",
            error_symbol(),
            path.display(),
            error
        );

        let selection = Select::new()
            .with_prompt("What now?")
            .items(&CHOICES)
            .default(DEFAULT_CHOICE)
            .interact_opt();

        match selection {
            Ok(choice) => action_for(choice),
            Err(e) => {
                warn!(error = %e, "could not read an answer");
                FailureAction::Abort
            }
        }
    }
}

/// Map a selection, or `None` for Escape, to an action.
fn action_for(choice: Option<usize>) -> FailureAction {
    match choice {
        Some(0) => FailureAction::Retry,
        Some(1) => FailureAction::Skip,
        _ => FailureAction::Abort,
    }
}
