use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::api::parse_bound;
use crate::domain::CommissionPlanConfig;
use crate::engine::{aggregate_payload, resolve_windows, DashboardView, RangeMode};
use crate::error::AppError;

/// Stateless preview: aggregate a caller-supplied payload.
#[derive(Debug, Deserialize)]
pub struct KpiRequest {
    /// Untyped `{dailyDeposits, referredUsers}` payload; malformed shapes yield zero KPIs.
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub range: RangeMode,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Reference instant; defaults to the server clock.
    pub now: Option<String>,
    pub plan: Option<CommissionPlanConfig>,
}

pub async fn post_kpi(Json(request): Json<KpiRequest>) -> Result<Json<DashboardView>, AppError> {
    let from = parse_bound("from", request.from.as_deref())?;
    let to = parse_bound("to", request.to.as_deref())?;
    let now = parse_bound("now", request.now.as_deref())?.unwrap_or_else(Utc::now);

    let windows = resolve_windows(request.range, from, to, now);
    Ok(Json(aggregate_payload(
        &request.data,
        &windows,
        request.plan.as_ref(),
    )))
}
