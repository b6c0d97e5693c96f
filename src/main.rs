use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fire_dispatch::config::environment::EnvironmentConfig;
use fire_dispatch::services::{DisplayTicker, HttpFireAnalysisBackend};
use fire_dispatch::utils::clock::{Clock, SystemClock};
use fire_dispatch::{create_app_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🔥 Fire Dispatch - Fire Monitoring Dashboard");
    info!("============================================");

    let config = EnvironmentConfig::from_env()?;
    info!("⚙️ Environment: {}", config.environment);
    info!("🛰️ Analysis backend: {}", config.analysis_backend_url);
    if config.cors_origins.is_empty() && !config.is_development() {
        warn!("⚠️ CORS_ORIGINS is empty, any origin will be accepted");
    }

    let backend = HttpFireAnalysisBackend::new(&config.analysis_backend_url, config.backend_timeout())?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::new(config.clone(), Arc::new(backend), clock.clone());

    // Ticker de pantalla, se detiene con el servidor
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ticker = DisplayTicker::new(config.display_tick(), state.live.clone(), clock).spawn(shutdown_rx);

    let app = create_app_router(state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Server starting at {}", config.server_url());
    info!("🔍 Available endpoints:");
    info!("   GET  /health - Health check");
    info!("   GET  /api/dashboard/config - Dashboard configuration");
    info!("🚒 Dispatch:");
    info!("   GET  /api/dispatch/vehicles - List vehicles");
    info!("   GET  /api/dispatch/availability - Available vehicles per type");
    info!("   POST /api/dispatch/proposals - Propose a dispatch");
    info!("   POST /api/dispatch/commit - Commit a proposal");
    info!("   POST /api/dispatch/vehicles/:id/recall - Recall vehicle");
    info!("   POST /api/dispatch/vehicles/:id/arrival - Record arrival");
    info!("   POST /api/dispatch/vehicles/:id/maintenance - Toggle maintenance");
    info!("   GET  /api/dispatch/board - Dispatched vehicles");
    info!("🔥 Analysis:");
    info!("   POST /api/analysis/image - Analyze uploaded image");
    info!("   POST /api/analysis/zone - Analyze zone");
    info!("   GET  /api/analysis/heatmap - Current heatmap");
    info!("   GET  /api/location/search - Search location");
    info!("📍 Incidents & cases:");
    info!("   GET  /api/incidents - Incidents and heat points");
    info!("   PUT  /api/incidents/zone - Correct zone type");
    info!("   GET  /api/cases - List case reports");
    info!("   POST /api/cases - Submit case report");
    info!("📡 Live:");
    info!("   POST /api/live/updates - Ingest live update");
    info!("   GET  /ws/live - WebSocket stream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = ticker.await {
        error!("❌ Display ticker ended abnormally: {}", e);
    }

    if let Err(e) = served {
        error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    info!("👋 Server stopped");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 SIGTERM received, shutting down...");
        },
    }
}
