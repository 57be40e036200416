mod api;
mod application;
mod cli;
mod data;
mod domain;
mod frontend;
mod infra;
mod ml;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Human-readable logs to stdout and to logs/main_api.log.
/// RUST_LOG overrides the default `mobilepc=info`.
fn init_logging() {
    let file_layer = fmt::layer()
        .with_writer(rolling::never("logs", "main_api.log"))
        .with_ansi(false);

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mobilepc=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    cli.run()
}
