//! # Observability
//!
//! Centralized tracing setup for the ProsperIA crates.
//!
//! Library crates only emit events through the `tracing` macros. The process
//! that hosts them (a UI shell, a test harness, a tool) calls
//! [`init_with_config`] once and decides where those events end up:
//!
//! - a JSONL file, one structured entry per line
//!   (`~/.prosperia/logs/app.jsonl` unless overridden)
//! - optionally a compact human-readable stream on stderr
//!
//! ## Usage
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "prosperia".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! });
//!
//! tracing::info!(user_id = %uid, "signed in");
//! ```

mod file_sink;
mod json_layer;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

pub use file_sink::FileSink;
pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name written into every JSONL entry (e.g. "prosperia", "tests").
    pub service_name: String,

    /// Default filter when `RUST_LOG` is not set (e.g. "info", "debug").
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.prosperia/logs/app.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit a compact stream on stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "prosperia".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

impl LogConfig {
    /// Resolve the JSONL file path for this configuration.
    pub fn resolved_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(default_log_path)
    }
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".prosperia").join("logs").join("app.jsonl"))
}

/// Initialize logging with default settings for the given service.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with a custom configuration.
///
/// Installing a global subscriber twice is not an error here: the second call
/// is ignored, which keeps test binaries that initialize per test working.
/// If the log file cannot be opened, logging falls back to stderr only.
pub fn init_with_config(config: LogConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer};

    let env_filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.default_level))
    };

    let log_path = config.resolved_log_path();
    let sink = log_path.as_ref().and_then(|path| match FileSink::open(path) {
        Ok(sink) => Some(sink),
        Err(e) => {
            eprintln!("observability: cannot open {}: {}", path.display(), e);
            None
        }
    });
    let file_unavailable = sink.is_none();

    let json_layer = sink
        .map(|sink| JsonLayer::new(config.service_name.clone(), sink).with_filter(env_filter()));

    let stderr_layer = if config.also_stderr || file_unavailable {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .compact()
                .with_writer(std::io::stderr)
                .with_filter(env_filter()),
        )
    } else {
        None
    };

    let installed = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            service = %config.service_name,
            log_path = ?log_path,
            "observability initialized"
        );
    }
}

/// Loggable stand-in for an upstream response body: its length and a hash,
/// never the content.
pub fn summarize_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
