use clap::Parser;
use dotenvy::dotenv;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use truck_card_relay::config::RelayConfig;
use truck_card_relay::services::telegram::{Messenger, TelegramClient};
use truck_card_relay::{AppState, UPLOAD_ROUTE, create_app};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the HTTP server
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & logging
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "truck_card_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Truck Card Relay...");

    // 2. Configuration
    let config = RelayConfig::from_env();
    info!(
        "🛡️  Relay Config: Max Size={}MB, Telegram={}, Bot API={}",
        config.max_file_size / 1024 / 1024,
        if config.telegram.is_configured() { "configured" } else { "missing" },
        config.telegram.api_base_url
    );
    if !config.telegram.is_configured() {
        warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is not set; uploads will fail with 500");
    }

    // 3. Messaging client
    let messenger: Arc<dyn Messenger> =
        Arc::new(TelegramClient::new(config.telegram.api_base_url.clone())?);

    let state = AppState { config, messenger };

    // 4. Serve
    let app = create_app(state);
    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Relay listening on: http://{}{}", addr, UPLOAD_ROUTE);
    info!("📖 OpenAPI document: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Relay exited cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }
}
