mod cleanup;
mod config;
mod seed;

use tracing::{info, warn};

use barter_api::{ApiConfig, AppStateInner};
use barter_db::Database;

use crate::config::Config;

/// How often expired sessions are swept.
const SESSION_SWEEP_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "barter=debug,barter_api=debug,barter_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    if config.development {
        warn!("Running in development mode: error details are shown to clients");
    }

    let db = Database::open(&config.db_path)?;

    if config.seed_demo {
        if seed::seed_demo_data(&db)? {
            info!("Demo accounts use the password {}", seed::SAMPLE_PASSWORD);
        } else {
            info!(
                "Store already populated ({} users, {} items, {} swap requests), skipping demo data",
                db.count_users()?,
                db.count_items()?,
                db.count_swap_requests()?
            );
        }
    }
    if let Some(last) = db.recent_logs(1)?.pop() {
        info!("Last recorded activity: {} at {}", last.action, last.timestamp);
    }

    let state = AppStateInner::new(
        db,
        ApiConfig {
            session_ttl: chrono::Duration::hours(config.session_ttl_hours),
            cookie_secure: config.cookie_secure,
            development: config.development,
            static_dir: config.static_dir.clone(),
        },
    );

    tokio::spawn(cleanup::run_cleanup_loop(state.clone(), SESSION_SWEEP_SECS));

    let app = barter_api::router(state);

    let addr = config.addr()?;
    info!("Barter listening on {}", addr);
    info!(
        "Sessions last {} hours, static files from {}",
        config.session_ttl_hours,
        config.static_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
