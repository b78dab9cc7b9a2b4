//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise `intake_server=<level>,tower_http=info`.
//! With a log directory that exists, output rolls daily into it instead of stdout.

use std::path::Path;
use tracing_subscriber::EnvFilter;

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("intake_server={level},tower_http=info").into())
}

/// Initialize the global subscriber. Safe to call more than once.
pub fn init_logger(log_level: &str, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(default_filter(log_level))
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(log_path, "intake-server");
            let _ = subscriber.with_writer(file_appender).try_init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    let _ = subscriber.try_init();
}
