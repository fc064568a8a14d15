//! Logging utilities for operations and console output
//!
//! `log` provides consistent log lines for loading and recording, `console`
//! renders results and history for a terminal.

pub mod console;
pub mod log;

// Re-export commonly used functions for convenience
pub use self::console::{NO_NORM_WARNING, format_z, render_history, render_results};
pub use self::log::{log_operation_complete, log_operation_start, log_submission, log_warning};
