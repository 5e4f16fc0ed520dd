//! Logging setup for binaries and tests embedding the library.
//!
//! The library itself only emits `tracing` events (spawn/completion at
//! debug, kill-on-cancel at warn). This module wires a stderr subscriber
//! for hosts that have none; stdout stays clean for the tool's own output.

use tracing_subscriber::{fmt, EnvFilter};

/// Log level for the stderr subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Install a global stderr subscriber at the given level.
///
/// `RUST_LOG` overrides `level` when set. Returns false if a global
/// subscriber was already installed; the existing one is left in place.
pub fn init_logging(level: LogLevel) -> bool {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level.directive())
    };

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
