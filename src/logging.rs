use anyhow::Result;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Initialize logging and tracing subsystem
pub fn init(config: &Config) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // JSON formatting for structured logs
    let json_layer = config.log_json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_thread_ids(true)
            .with_target(true)
    });
    let text_layer = (!config.log_json).then(|| fmt::layer().with_target(true));

    Registry::default()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "deckrender starting");

    Ok(())
}

/// Log configuration
pub fn log_config(config: &Config) {
    tracing::info!(
        bind = %config.bind,
        template = %config.template_path.display(),
        soffice = %config.soffice.display(),
        conversion_timeout_secs = config.conversion_timeout_secs,
        "Service configuration loaded"
    );

    if !config.template_available() {
        tracing::warn!(
            template = %config.template_path.display(),
            "Template not found, render requests will fail until it exists"
        );
    }
}
