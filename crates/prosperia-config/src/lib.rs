//! Configuration, file system layout and logging setup for ProsperIA.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, FirebaseConfig, GeminiConfig, DEFAULT_FIREBASE_AUTH_BASE_URL, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_MODEL, DEFAULT_LOG_LEVEL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
