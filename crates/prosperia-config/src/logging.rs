//! Logging initialization.
//!
//! Hosts call [`init_logging`] once at startup. Every crate in the workspace
//! logs through `tracing`; this routes events into the JSONL file at
//! `~/.prosperia/logs/app.jsonl` and, when asked, onto stderr.

use crate::{Config, Paths};

/// Initialize the logging system from the loaded configuration.
///
/// `RUST_LOG` still wins over `config.log_level` when set.
///
/// ```ignore
/// let paths = Paths::new()?;
/// let config = Config::load(&paths)?;
/// init_logging(&config, &paths);
/// tracing::info!("ProsperIA started");
/// ```
pub fn init_logging(config: &Config, paths: &Paths) {
    observability::init_with_config(observability::LogConfig {
        service_name: "prosperia".into(),
        default_level: parse_level(&config.log_level).to_string().to_lowercase(),
        log_path: Some(paths.log_file()),
        also_stderr: config.log_to_stderr,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
