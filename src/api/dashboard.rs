use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::Utc;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{parse_bound, AppState};
use crate::domain::AffiliateId;
use crate::engine::{aggregate, resolve_windows, DashboardView, RangeMode, ReportingWindow};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardRequest {
    pub range: RangeMode,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub view: DashboardView,
    pub window: ReportingWindow,
    pub previous_window: ReportingWindow,
}

/// Extract the credential from `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().nth(1))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Token not provided".into()))
}

pub async fn post_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<DashboardRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let token = bearer_token(&headers)?;
    let affiliate: AffiliateId = state.identity.resolve(token).await?;

    let from = parse_bound("from", request.from.as_deref())?;
    let to = parse_bound("to", request.to.as_deref())?;

    let tags = state.repo.tags_for(&affiliate).await?;
    if tags.is_empty() {
        return Err(AppError::NotFound("No btag found for this user".into()));
    }

    let batches = try_join_all(tags.iter().map(|tag| state.records.fetch_records(tag))).await?;
    let records: Vec<_> = batches.into_iter().flatten().collect();

    let plan = state.repo.plan_for(&affiliate).await?;
    let windows = resolve_windows(request.range, from, to, Utc::now());
    let aggregation = aggregate(&records, &windows, plan.as_ref());

    info!(
        "Dashboard for affiliate {}: {} tags, {} records, {} in window",
        affiliate,
        tags.len(),
        records.len(),
        aggregation.deposits.len()
    );

    Ok(Json(DashboardResponse {
        view: DashboardView::from_aggregation(aggregation, Vec::new()),
        window: windows.current,
        previous_window: windows.previous,
    }))
}
