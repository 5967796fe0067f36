use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use tracing::{error, warn};

use barter_db::Database;

use crate::error::AppError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: ApiConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    /// Expose error details in responses.
    pub development: bool,
    pub static_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(168),
            cookie_secure: false,
            development: false,
            static_dir: PathBuf::from("./static"),
        }
    }
}

impl AppStateInner {
    pub fn new(db: Database, config: ApiConfig) -> AppState {
        Arc::new(Self { db, config })
    }

    /// Run blocking store work off the async runtime.
    pub async fn db<F, T>(self: &Arc<Self>, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Database) -> barter_db::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || f(&state.db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                AppError::Internal(e.into())
            })?
            .map_err(AppError::from)
    }

    /// Append an audit entry without holding up the response.
    pub fn audit(self: &Arc<Self>, action: &'static str, user_id: Option<String>) {
        let state = self.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = state.db.append_log(action, user_id.as_deref()) {
                warn!("Failed to record {} audit entry: {}", action, e);
            }
        });
    }
}
