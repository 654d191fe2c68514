//! Tracing setup emitting JSON lines (or plain text for local debugging).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::config::{LogFormat, WireCfg};

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init(cfg: &WireCfg) {
    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match cfg.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(filter = %cfg.log_filter, format = ?cfg.log_format, "tracing initialised");
    }
}
