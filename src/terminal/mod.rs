//! Terminal output: coloured status lines, progress reporting and prompts.

pub mod colors;
pub mod progress;
pub mod prompt;

pub use colors::{
    bullet_symbol, error_symbol, format_size, info_symbol, print_error, print_info, print_item,
    print_success, print_warning, success_symbol, warning_symbol,
};
pub use progress::{ProcessingStats, Suspended, file_progress, print_summary, spinner};
pub use prompt::Prompt;
