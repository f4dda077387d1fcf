//! Event-style log lines for parse and validation runs.
//!
//! Every line reads `[run=<id>] [source=<label>] EVENT key=value ...`.
//! The run id ties together everything one `parse_adapters`,
//! `parse_fields` or config check emitted; the source label names the
//! adapter instance or settings set the line is about. Events are
//! UPPER_SNAKE names such as `ADAPTER_PARSED` or `FILE_UPLOAD_PATH` and
//! values are `Debug`-formatted so strings stay quoted.

use std::fmt;

/// Run id plus optional source label, rendered as the line prefix.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub source: Option<String>,
}

impl LogContext {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            source: None,
        }
    }

    /// Same run, narrowed to one adapter or settings set.
    pub fn with_source(&self, source: &str) -> Self {
        Self {
            run_id: self.run_id.clone(),
            source: Some(source.to_string()),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[run={}]", self.run_id)?;
        if let Some(source) = &self.source {
            write!(f, " [source={}]", source)?;
        }
        Ok(())
    }
}

/// Stands in for password and file setting values, and for the
/// UNCHANGED marker, wherever a setting value is logged.
pub const REDACTED: &str = "<redacted>";

/// Emit one event line at `$level`. Use the level-named wrappers.
#[doc(hidden)]
#[macro_export]
macro_rules! log_event {
    ($level:expr, $ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::log!(
            $level,
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// Run progress and uploads.
#[macro_export]
macro_rules! log_info {
    ($($args:tt)*) => {
        $crate::log_event!(log::Level::Info, $($args)*)
    };
}

/// Payload oddities that do not fail the parse.
#[macro_export]
macro_rules! log_warn {
    ($($args:tt)*) => {
        $crate::log_event!(log::Level::Warn, $($args)*)
    };
}

/// Per-setting and per-adapter decisions.
#[macro_export]
macro_rules! log_debug {
    ($($args:tt)*) => {
        $crate::log_event!(log::Level::Debug, $($args)*)
    };
}
