//! Logging for parse and validation runs.
//!
//! `log_info!` / `log_warn!` / `log_debug!` write UPPER_SNAKE events
//! prefixed with a [`LogContext`].

pub mod structured;

pub use structured::*;
