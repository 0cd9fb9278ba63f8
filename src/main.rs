use clap::Parser;
use psearch::cli::Cli;
use psearch_core::config::Config;
use psearch_core::Transport;
use psearch_http::HttpTransport;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/psearch-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("psearch debug log started, tail -f /tmp/psearch-debug.log");
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to built-in config");
            Config::defaults()
        }),
    };

    // The one process-wide transport; everything below receives it explicitly.
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::from_config(&config.server)?);

    let stdout = std::io::stdout();
    psearch::cli::run(&cli, &config, transport, &mut stdout.lock())
}
