use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use chatdeck::App;
use chatdeck::api::ApiClient;
use chatdeck::config::Settings;
use chatdeck::storage::SqliteStore;

#[derive(Parser, Debug)]
#[command(name = "chatdeck", version, about = "A minimal multi-provider terminal chat client")]
struct Cli {
    /// Backend URL. Saved for later runs.
    #[arg(long)]
    server: Option<String>,
    /// Provider to switch to at startup.
    #[arg(long)]
    provider: Option<String>,
}

fn init_logging(settings: &Settings) {
    let fallback = settings.log_filter.as_deref().unwrap_or("warn");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load();
    init_logging(&settings);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if let Some(server) = cli.server.as_deref() {
        settings.base_url = chatdeck::utils::normalize_url(server);
        if let Err(e) = settings.save() {
            log::warn!("could not save settings: {e}");
        }
    }
    if !settings.is_configured() {
        chatdeck::ui::login::prompt_server(&mut settings, &mut lines).await?;
    }

    let client = ApiClient::new(&settings.base_url, settings.timeout())
        .with_context(|| format!("invalid server URL {}", settings.base_url))?;
    let store = SqliteStore::open_default().context("opening local state")?;

    let mut app = App::new(Arc::new(client), Box::new(store));
    app.start();
    if let Some(provider) = cli.provider.as_deref() {
        app.select_provider(Some(provider))?;
    }
    chatdeck::ui::main_window::run(app, &mut lines).await?;
    Ok(())
}
