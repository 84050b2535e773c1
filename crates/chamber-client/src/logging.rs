//! Log output for binaries driving client handles.
//!
//! The library only emits `tracing` events (spawns, control exchanges,
//! failures). A binary installs [`init_subscriber`] once to see them.

use chamber_settings::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// Pick the filter directive: `RUST_LOG`, then the command-line override,
/// then the configured level.
fn resolve_filter(settings: &LoggingSettings, level_override: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(level_override.unwrap_or(settings.level.as_str()))
    })
}

/// Route handle events to stderr.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case nothing changes.
pub fn init_subscriber(settings: &LoggingSettings, level_override: Option<&str>) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(resolve_filter(settings, level_override))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
