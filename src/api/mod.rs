pub mod handlers;

pub use handlers::{health_check, reconcile, reconcile_inline};

use crate::config::AppConfig;
use crate::service::ReconciliationEngine;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<ReconciliationEngine>,
    pub pool: PgPool,
}

impl AppState {
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let engine = ReconciliationEngine::new(&config.matching);
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            pool,
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/reconcile", post(reconcile))
        .route("/api/reconcile/inline", post(reconcile_inline))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(body_limit)))
}
