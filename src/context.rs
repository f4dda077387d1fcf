//! Parse run context.
//!
//! Provides the run id and timing used to correlate log lines of one
//! normalization or validation call.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

/// Context for one parse call.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
}

impl ParseContext {
    pub fn new() -> Self {
        let run_id = format!("parse-{}", &Uuid::new_v4().simple().to_string()[..8]);
        Self {
            run_id,
            started_at: Utc::now(),
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.run_id)
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}
