use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fleetflow::config::{DatabaseConfig, EnvironmentConfig};
use fleetflow::database::init_pool;
use fleetflow::repositories::{FleetStore, MemoryFleetStore, PgFleetStore};
use fleetflow::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fleetflow=debug,tower_http=info")),
        )
        .init();

    info!("🚚 FleetFlow - API de gestión de flotas");
    info!("=======================================");

    let config = EnvironmentConfig::from_env()?;
    let db_config = DatabaseConfig::from_env();

    // Inicializar el store
    let store: Arc<dyn FleetStore> = match db_config.url.as_deref() {
        Some(url) => match init_pool(&db_config, url).await {
            Ok(pool) => Arc::new(PgFleetStore::new(pool)),
            Err(e) => {
                error!("❌ Error conectando a la base de datos: {:#}", e);
                return Err(e);
            }
        },
        None => {
            warn!("⚠️ DATABASE_URL no configurada, usando store en memoria");
            Arc::new(MemoryFleetStore::new())
        }
    };
    info!("✅ Store inicializado: {}", store.backend());

    let addr: SocketAddr = config.server_url().parse()?;
    if config.is_production() && config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío en producción: se acepta cualquier origen");
    }

    let app = create_router(AppState::new(store, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("🚗 /api/vehicles  👤 /api/drivers  🧭 /api/trips");
    info!("🔧 /api/maintenance  💶 /api/expenses  📊 /api/dashboard");
    info!("⚠️ /api/incidents  🏷️ /api/meta");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
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
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
