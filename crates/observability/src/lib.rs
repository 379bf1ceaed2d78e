//! Process-wide logging setup.

/// Tracing subscriber configuration (format, filters).
pub mod tracing;

pub use self::tracing::{LOG_FORMAT_ENV, LogFormat, ParseLogFormatError};

/// Initialize logging using `STOCKCAT_LOG_FORMAT` and `RUST_LOG`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default();
    self::tracing::init(format);
}
