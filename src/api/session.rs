use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::AppState;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    /// Session expiry in milliseconds since Unix epoch.
    pub expires: i64,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub btag: String,
}

/// Sign an affiliate in and resolve the tracking tag shown on the dashboard.
pub async fn post_session(
    State(state): State<AppState>,
    Json(body): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let email = body.email.trim();
    if email.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".into()));
    }

    let signed_in = state.identity.sign_in(email, &body.password).await?;

    let btag = state
        .repo
        .tags_for(&signed_in.affiliate)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Could not resolve a btag for this user".into()))?;

    let expires = Utc::now() + Duration::seconds(state.config.session_ttl_secs);
    info!("Session issued for affiliate {}", signed_in.affiliate);

    Ok(Json(SessionResponse {
        token: signed_in.access_token,
        expires: expires.timestamp_millis(),
        user: SessionUser {
            id: signed_in.affiliate.to_string(),
            email: email.to_string(),
            btag: btag.to_string(),
        },
    }))
}
