//! Window partitioning, base sums, period-over-period change and KPI assembly.

use crate::domain::{normalize_rows, CommissionPlanConfig, Decimal, DepositRecord};
use crate::engine::commission::compute_commission;
use crate::engine::window::ResolvedWindows;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// KPI summary handed to presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_deposits: Decimal,
    pub previous_total_deposits: Decimal,
    pub ftds: u64,
    pub cpas: u64,
    pub cpa_amount: Decimal,
    pub estimated_commission: Decimal,
    /// Configured revenue-share rate as a percentage.
    pub rev_share: Decimal,
    /// Percent change of total deposits vs. the previous window.
    pub deposit_change: Decimal,
}

/// Aggregation result: KPIs plus the current-window records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub kpi: KpiSummary,
    pub deposits: Vec<DepositRecord>,
}

/// Dashboard view built from an untyped `{dailyDeposits, referredUsers}` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub kpi: KpiSummary,
    pub deposits: Vec<DepositRecord>,
    pub referred_users: Vec<Value>,
}

impl DashboardView {
    pub fn from_aggregation(aggregation: Aggregation, referred_users: Vec<Value>) -> Self {
        Self {
            kpi: aggregation.kpi,
            deposits: aggregation.deposits,
            referred_users,
        }
    }
}

/// Aggregate normalized records over the resolved windows.
///
/// Current membership is `start <= date <= end`, previous membership is
/// `start <= date < end`. Without a plan the commission and the ftd/cpa
/// counts are all zero.
pub fn aggregate(
    records: &[DepositRecord],
    windows: &ResolvedWindows,
    plan: Option<&CommissionPlanConfig>,
) -> Aggregation {
    let current: Vec<DepositRecord> = records
        .iter()
        .filter(|r| windows.current.contains(r.date))
        .cloned()
        .collect();

    let total: Decimal = current.iter().map(|r| r.amount).sum();
    let previous_total: Decimal = records
        .iter()
        .filter(|r| windows.previous.contains_half_open(r.date))
        .map(|r| r.amount)
        .sum();

    let deposit_change = percent_change(total, previous_total);
    let commission = plan
        .map(|p| compute_commission(&current, p))
        .unwrap_or_default();

    debug!(
        records = records.len(),
        matched = current.len(),
        %total,
        %previous_total,
        "aggregated deposit records"
    );

    Aggregation {
        kpi: KpiSummary {
            total_deposits: total,
            previous_total_deposits: previous_total,
            ftds: commission.ftd_units,
            cpas: commission.cpa_count,
            cpa_amount: commission.cpa,
            estimated_commission: commission.total(),
            rev_share: commission.rev_share_pct,
            deposit_change,
        },
        deposits: current,
    }
}

/// Aggregate an untyped payload.
///
/// A payload whose `dailyDeposits` is not an array (or whose `referredUsers`
/// is present but not an array) degrades to an all-zero view. Rows inside a
/// valid array are normalized individually; undated rows are dropped.
pub fn aggregate_payload(
    payload: &Value,
    windows: &ResolvedWindows,
    plan: Option<&CommissionPlanConfig>,
) -> DashboardView {
    let Some(rows) = payload.get("dailyDeposits").and_then(Value::as_array) else {
        debug!("payload has no dailyDeposits array; returning empty view");
        return DashboardView::default();
    };

    let referred_users = match payload.get("referredUsers") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(users)) => users.clone(),
        Some(_) => {
            debug!("payload referredUsers is not an array; returning empty view");
            return DashboardView::default();
        }
    };

    let records = normalize_rows(rows);
    DashboardView::from_aggregation(aggregate(&records, windows, plan), referred_users)
}

/// `(total - previous) / previous * 100`, or zero when there is no prior activity.
pub fn percent_change(total: Decimal, previous_total: Decimal) -> Decimal {
    if previous_total.is_positive() {
        (total - previous_total) / previous_total * Decimal::hundred()
    } else {
        Decimal::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::window::{resolve_windows, RangeMode};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn week_at(now: DateTime<Utc>) -> ResolvedWindows {
        resolve_windows(RangeMode::Week, None, None, now)
    }

    #[test]
    fn week_scenario_includes_only_recent_record() {
        let records = vec![
            DepositRecord::new(at(2024, 1, 1), dec("100")),
            DepositRecord::new(at(2024, 1, 10), dec("200")),
        ];
        let result = aggregate(&records, &week_at(at(2024, 1, 10)), None);

        assert_eq!(result.deposits.len(), 1);
        assert_eq!(result.kpi.total_deposits, dec("200"));
        // 2024-01-01 falls in [2023-12-27, 2024-01-03)
        assert_eq!(result.kpi.previous_total_deposits, dec("100"));
        assert_eq!(result.kpi.deposit_change, dec("100"));
    }

    #[test]
    fn no_prior_activity_reports_zero_change() {
        let records = vec![
            DepositRecord::new(at(2023, 12, 20), dec("100")),
            DepositRecord::new(at(2024, 1, 10), dec("200")),
        ];
        let result = aggregate(&records, &week_at(at(2024, 1, 10)), None);

        assert_eq!(result.kpi.total_deposits, dec("200"));
        assert!(result.kpi.previous_total_deposits.is_zero());
        assert!(result.kpi.deposit_change.is_zero());
    }

    #[test]
    fn boundary_instants_follow_window_asymmetry() {
        let now = at(2024, 1, 10);
        let records = vec![
            // current end: included in current
            DepositRecord::new(now, dec("10")),
            // previous end == current start: current only
            DepositRecord::new(at(2024, 1, 3), dec("20")),
            // previous start: included in previous
            DepositRecord::new(at(2023, 12, 27), dec("40")),
        ];
        let result = aggregate(&records, &week_at(now), None);
        assert_eq!(result.kpi.total_deposits, dec("30"));
        assert_eq!(result.kpi.previous_total_deposits, dec("40"));
    }

    #[test]
    fn percent_change_against_previous_window() {
        let now = at(2024, 1, 10);
        let records = vec![
            DepositRecord::new(at(2024, 1, 5), dec("150")),
            DepositRecord::new(at(2023, 12, 30), dec("100")),
        ];
        let result = aggregate(&records, &week_at(now), None);
        assert_eq!(result.kpi.deposit_change, dec("50"));
    }

    #[test]
    fn percent_change_is_zero_without_prior_activity() {
        assert!(percent_change(dec("500"), Decimal::zero()).is_zero());
        assert!(percent_change(Decimal::zero(), Decimal::zero()).is_zero());
        assert_eq!(percent_change(Decimal::zero(), dec("80")), dec("-100"));
    }

    #[test]
    fn plan_scenario_estimates_sixty_five() {
        let now = at(2024, 1, 10);
        let records = vec![DepositRecord::new(at(2024, 1, 9), dec("200"))
            .with_cpa(dec("25"))
            .with_rev(dec("0.05"))];
        let plan = CommissionPlanConfig {
            ftd_rate: Some(dec("30")),
            cpa_enabled: true,
            rev_rate: Some(dec("0.05")),
            ..Default::default()
        };
        let result = aggregate(&records, &week_at(now), Some(&plan));
        assert_eq!(result.kpi.estimated_commission, dec("65"));
        assert_eq!(result.kpi.rev_share, dec("5"));
        assert_eq!(result.kpi.ftds, 1);
        assert_eq!(result.kpi.cpas, 1);
        assert_eq!(result.kpi.cpa_amount, dec("25"));
    }

    #[test]
    fn commission_ignores_previous_window_records() {
        let now = at(2024, 1, 10);
        let records = vec![
            DepositRecord::new(at(2024, 1, 9), dec("100")).with_cpa(dec("10")),
            DepositRecord::new(at(2024, 1, 1), dec("100")).with_cpa(dec("99")),
        ];
        let plan = CommissionPlanConfig {
            cpa_enabled: true,
            ..Default::default()
        };
        let result = aggregate(&records, &week_at(now), Some(&plan));
        assert_eq!(result.kpi.estimated_commission, dec("10"));
    }

    #[test]
    fn no_plan_suppresses_counts_and_commission() {
        let now = at(2024, 1, 10);
        let records = vec![DepositRecord::new(at(2024, 1, 9), dec("200"))
            .with_cpa(dec("25"))
            .with_ftds(3)];
        let result = aggregate(&records, &week_at(now), None);
        assert_eq!(result.kpi.ftds, 0);
        assert_eq!(result.kpi.cpas, 0);
        assert!(result.kpi.estimated_commission.is_zero());
        assert!(result.kpi.rev_share.is_zero());
        assert_eq!(result.kpi.total_deposits, dec("200"));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let now = at(2024, 1, 10);
        let records = vec![
            DepositRecord::new(at(2024, 1, 9), dec("12.5")).with_rev(dec("0.1")),
            DepositRecord::new(at(2024, 1, 2), dec("7")),
        ];
        let plan = CommissionPlanConfig {
            rev_rate: Some(dec("0.1")),
            ..Default::default()
        };
        let first = aggregate(&records, &week_at(now), Some(&plan));
        let second = aggregate(&records, &week_at(now), Some(&plan));
        assert_eq!(first, second);
    }

    const DECIMAL_MAX: &str = "79228162514264337593543950335";

    #[test]
    fn oversized_amounts_saturate_total() {
        let payload = json!({
            "dailyDeposits": [
                {"date": "2024-01-09", "amount": DECIMAL_MAX},
                {"date": "2024-01-08", "amount": "1"}
            ]
        });
        let view = aggregate_payload(&payload, &week_at(at(2024, 1, 10)), None);
        assert_eq!(view.kpi.total_deposits, dec(DECIMAL_MAX));
        assert_eq!(view.deposits.len(), 2);
    }

    #[test]
    fn tiny_previous_total_saturates_change() {
        let payload = json!({
            "dailyDeposits": [
                {"date": "2024-01-09", "amount": 1000},
                {"date": "2023-12-30", "amount": "0.0000000000000000000000000001"}
            ]
        });
        let view = aggregate_payload(&payload, &week_at(at(2024, 1, 10)), None);
        assert_eq!(view.kpi.deposit_change, dec(DECIMAL_MAX));
    }

    #[test]
    fn oversized_rev_product_saturates_commission() {
        let payload = json!({
            "dailyDeposits": [{"date": "2024-01-09", "amount": 1e20, "rev": 1e20}]
        });
        let plan = CommissionPlanConfig {
            rev_rate: Some(dec("0.05")),
            ..Default::default()
        };
        let view = aggregate_payload(&payload, &week_at(at(2024, 1, 10)), Some(&plan));
        assert_eq!(view.kpi.estimated_commission, dec(DECIMAL_MAX));
        assert_eq!(view.kpi.rev_share, dec("5"));
    }

    #[test]
    fn payload_null_degrades_to_zero() {
        let view = aggregate_payload(&Value::Null, &week_at(at(2024, 1, 10)), None);
        assert_eq!(view, DashboardView::default());
    }

    #[test]
    fn payload_non_array_deposits_degrades_to_zero() {
        let payload = json!({"dailyDeposits": "not-an-array", "referredUsers": []});
        let plan = CommissionPlanConfig {
            cpa_enabled: true,
            ..Default::default()
        };
        let view = aggregate_payload(&payload, &week_at(at(2024, 1, 10)), Some(&plan));
        assert_eq!(view.kpi, KpiSummary::default());
        assert!(view.deposits.is_empty());
        assert!(view.referred_users.is_empty());
    }

    #[test]
    fn payload_non_array_referred_users_degrades_to_zero() {
        let payload = json!({
            "dailyDeposits": [{"date": "2024-01-09", "amount": 10}],
            "referredUsers": {"oops": true}
        });
        let view = aggregate_payload(&payload, &week_at(at(2024, 1, 10)), None);
        assert_eq!(view, DashboardView::default());
    }

    #[test]
    fn payload_rows_are_normalized_and_users_passed_through() {
        let payload = json!({
            "dailyDeposits": [
                {"date": "2024-01-09", "amount": "120"},
                {"date": "", "amount": 999},
                {"date": "2024-01-08", "amount": null}
            ],
            "referredUsers": [{"id": 1}]
        });
        let view = aggregate_payload(&payload, &week_at(at(2024, 1, 10)), None);
        assert_eq!(view.deposits.len(), 2);
        assert_eq!(view.kpi.total_deposits, dec("120"));
        assert_eq!(view.referred_users, vec![json!({"id": 1})]);
    }
}
