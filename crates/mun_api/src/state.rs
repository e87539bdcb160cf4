//! Application state for the API server

use mun_core::StoreResult;
use mun_core::db::DbPool;
use rusqlite::Connection;

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub version: String,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Runs `f` on a pooled connection off the async runtime. The connection
    /// goes back to the pool when `f` returns.
    pub async fn with_connection<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || -> StoreResult<T> {
            let mut conn = pool.get()?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Blocking database task failed");
            ApiError::Internal("Internal server error".to_string())
        })?
        .map_err(ApiError::from)
    }
}
