//! Structured trace events for download runs (run start/finish, per-track state
//! changes, match confidence) written as JSON lines next to the debug log.

use crate::config::AppConfig;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// `$TMPDIR/ssdl_trace.jsonl` unless `SSDL_TRACE_LOG` points elsewhere.
pub(crate) fn tracing_log_path() -> PathBuf {
    env::var("SSDL_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("ssdl_trace.jsonl"))
}

/// Install the subscriber once. Off unless file logging is on, like the debug log.
pub fn init_tracing(config: &AppConfig) {
    if !config.logging_enabled() {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let path = tracing_log_path();
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(_) => return,
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(Mutex::new(file))
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
