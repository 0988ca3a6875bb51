use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use huntoru_judge::{ApiKey, Credentials, InMemoryCatalog, Judge, JudgeConfig, ThemeCatalog};
use huntoru_server::cli::{Args, LogFormat};
use huntoru_server::{cors_layer, router, serve, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = JudgeConfig::from_env();
    let credentials = Credentials::from_env().context("GOOGLE_CLOUD_SERVICE_ACCOUNT_KEY")?;
    let api_key = ApiKey::from_env();
    if credentials.is_none() || api_key.is_none() {
        warn!("provider credentials missing; /judge will answer 500 until configured");
    }

    let judge = Judge::from_config(&config, credentials, api_key)?;
    let catalog: Arc<dyn ThemeCatalog> = match &args.themes {
        Some(path) => Arc::new(InMemoryCatalog::load(path)?),
        None => Arc::new(InMemoryCatalog::builtin()),
    };

    info!(
        themes = catalog.len(),
        token_cache = config.token_cache,
        timeout_secs = config.timeout_secs,
        "Initialized state"
    );

    let app = router(
        Arc::new(AppState { judge, catalog }),
        cors_layer(args.allowed_origins),
    );

    info!("Binding to {}", args.bind);
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    serve(listener, app).await?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
