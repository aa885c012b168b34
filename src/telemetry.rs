//! Tracing subscriber set-up.

use crate::settings::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins when set; otherwise `settings.level` applies to this crate's
/// targets and the HTTP trace layer. Safe to call more than once.
pub fn init_tracing(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&settings.level));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "bookshelf_api={level},bookshelf_server={level},tower_http={level}"
    ))
}
