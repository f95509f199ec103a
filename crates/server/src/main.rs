use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classrelay_core::{
    create_authenticator, load_config, validate_config, Authenticator, CheckPipeline,
    CommandListener, Config, OriginClient, SqliteRegistry, TelegramClient, YtDlpMaterializer,
};
use classrelay_server::api::create_router;
use classrelay_server::state::AppState;

/// How long a running check may take to finish after shutdown is requested.
const LISTENER_STOP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("CLASSRELAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Create SQLite registry
    let registry = Arc::new(
        SqliteRegistry::new(&config.database.path).context("Failed to open registry")?,
    );
    info!("Registry initialized");

    // Start the command listener if a bot is configured
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener = match &config.telegram {
        Some(_) => Some(spawn_listener(&config, Arc::clone(&registry), shutdown_rx)?),
        None => {
            info!("Telegram not configured, command listener disabled");
            None
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), authenticator, registry));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let tcp = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = listener {
        match tokio::time::timeout(LISTENER_STOP_TIMEOUT, handle).await {
            Ok(Ok(())) => info!("Command listener stopped"),
            Ok(Err(e)) => error!("Command listener task failed: {}", e),
            Err(_) => warn!("Command listener did not stop in time, abandoning running check"),
        }
    }

    Ok(())
}

/// Build the check pipeline over the real collaborators and run the
/// listener on its own task.
fn spawn_listener(
    config: &Config,
    registry: Arc<SqliteRegistry>,
    shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>> {
    let telegram_config = config
        .telegram
        .clone()
        .context("Telegram section missing")?;
    let drop_pending = telegram_config.drop_pending_updates;

    let telegram = Arc::new(
        TelegramClient::new(telegram_config).context("Failed to create Telegram client")?,
    );
    let origin = Arc::new(
        OriginClient::new(&config.origin).context("Failed to create course site client")?,
    );
    let materializer = Arc::new(YtDlpMaterializer::new(config.downloader.clone()));
    info!(
        "Downloads go to {:?} via {:?}",
        config.downloader.output_dir, config.downloader.ytdlp_path
    );

    let pipeline = Arc::new(CheckPipeline::new(
        config.pipeline.clone(),
        registry,
        origin.clone(),
        origin,
        materializer,
        telegram.clone(),
        config.downloader.output_dir.clone(),
    ));

    let listener = CommandListener::new(telegram.clone(), telegram, pipeline)
        .drop_pending(drop_pending);

    info!("Starting command listener");
    Ok(tokio::spawn(listener.run(shutdown)))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
