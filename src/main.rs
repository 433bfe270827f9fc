use anyhow::{Context, Result};
use assistant_gateway::{
    create_router, AppState, Config, EchoBrain, InMemoryUserState, MessagePipeline,
    ServiceContainer, WebMessagingAdapter,
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "assistant-gateway", about = "Conversational assistant message gateway")]
struct Args {
    /// Config file path (extension optional)
    #[arg(long, default_value = "config/assistant-gateway")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("Assistant Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    if cfg.pipeline.log_pseudonym_secret.is_empty() {
        warn!("pipeline.log_pseudonym_secret is empty; log user ids are only weakly pseudonymized");
    }

    let services = ServiceContainer::new(
        Arc::new(WebMessagingAdapter::new()),
        Arc::new(InMemoryUserState::new()),
        Arc::new(EchoBrain),
    );
    let state = AppState::new(
        MessagePipeline::new(cfg.pipeline.clone()),
        services,
        cfg.service.http.request_timeout(),
    );

    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(
        listener,
        create_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server error")?;

    Ok(())
}
