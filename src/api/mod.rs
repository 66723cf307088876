pub mod dashboard;
pub mod health;
pub mod kpi;
pub mod session;

use crate::config::Config;
use crate::datasource::RecordSource;
use crate::db::Repository;
use crate::domain::parse_record_date;
use crate::error::AppError;
use crate::identity::IdentityProvider;
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub records: Arc<dyn RecordSource>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        config: Config,
        records: Arc<dyn RecordSource>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            repo,
            config,
            records,
            identity,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/session", post(session::post_session))
        .route("/v1/dashboard", post(dashboard::post_dashboard))
        .route("/v1/kpi", post(kpi::post_kpi))
        .layer(cors)
        .with_state(state)
}

/// Parse an optional date bound from a request body.
///
/// Absent or blank means "not supplied"; anything else must parse.
pub(crate) fn parse_bound(
    field: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, AppError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_record_date(s)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid {}: {}", field, s))),
    }
}
