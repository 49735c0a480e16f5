use std::process::ExitCode;

use menuwise_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    init_tracing();
    menuwise_cli::run()
}

/// Logs go to stderr; stdout carries the JSON command payload. `RUST_LOG`
/// wins over the configured level; a broken config file falls back to the
/// default logging setup and the command itself reports the config error.
fn init_tracing() {
    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Compact => registry.with(fmt.compact()).init(),
        LogFormat::Pretty => registry.with(fmt.pretty()).init(),
        LogFormat::Json => registry.with(fmt.json()).init(),
    }
}
