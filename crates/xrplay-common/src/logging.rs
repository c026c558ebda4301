use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "XRPLAY_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize structured logging with environment filter.
/// Set XRPLAY_LOG=debug (or trace, info, warn, error) for verbosity control.
///
/// Panics if a global subscriber is already installed; embedders that may
/// have their own subscriber should call [`try_init_logging`].
pub fn init_logging() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Like [`init_logging`], but reports an already-installed subscriber
/// instead of panicking.
pub fn try_init_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
}
