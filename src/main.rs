use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shokudo::{
    config::{AppConfig, Config, LogFormat},
    database::Database,
    repository::{InMemoryReservationRepository, PostgresReservationRepository, ReservationRepository},
    AppState,
};

fn init_tracing(app: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::new(&app.rust_log);
    let registry = tracing_subscriber::registry().with(filter);
    match app.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
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

    info!("Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    init_tracing(&config.app);

    info!("Starting Honda Shokudo API ({})", config.app.environment);

    // --- Storage ---
    let (repo, db): (Arc<dyn ReservationRepository>, Option<Database>) = match &config.database.url {
        Some(url) => {
            let db = Database::new(url, config.database.pool_size).await?;
            info!("Database connected");
            if config.database.run_migrations {
                db.run_migrations().await?;
            }
            let repo: Arc<dyn ReservationRepository> =
                Arc::new(PostgresReservationRepository::new(db.clone()));
            (repo, Some(db))
        }
        None => {
            warn!("DATABASE_URL is not set - using in-memory reservations, data is lost on restart");
            let repo: Arc<dyn ReservationRepository> = Arc::new(InMemoryReservationRepository::new());
            (repo, None)
        }
    };

    if config.admin.password.is_none() {
        warn!("ADMIN_PASSWORD is not set - GET /api/reservations is public");
    }
    if config.features.enable_chatbot && config.openai.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set - chatbot requests will fail with 503");
    }

    let state = AppState::new(config.clone(), repo)?;

    // --- Start the web server ---
    let app = shokudo::router(state);

    let listener = tokio::net::TcpListener::bind((config.app.host.as_str(), config.app.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);
    info!("Health check: /api/health, reservations: /api/reservations, chatbot: /api/chatbot/chat");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
    info!("Server stopped");
    Ok(())
}
