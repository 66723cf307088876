//! Commission estimation under FTD bonus, CPA and revenue-share models.

use crate::domain::{CommissionPlanConfig, Decimal, DepositRecord, FtdCounting};

/// Per-component commission for one window.
///
/// Each component is zero when its plan field is unset, and so are the
/// display counts tied to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommissionBreakdown {
    pub ftd_units: u64,
    pub ftd: Decimal,
    pub cpa_count: u64,
    pub cpa: Decimal,
    pub rev: Decimal,
    /// Configured revenue-share rate as a percentage, not an effective rate.
    pub rev_share_pct: Decimal,
}

impl CommissionBreakdown {
    /// Strict sum of the three components.
    pub fn total(&self) -> Decimal {
        self.ftd + self.cpa + self.rev
    }
}

/// Compute the commission breakdown for records already inside the window.
pub fn compute_commission(
    records: &[DepositRecord],
    plan: &CommissionPlanConfig,
) -> CommissionBreakdown {
    let mut breakdown = CommissionBreakdown::default();

    if let Some(rate) = plan.active_ftd_rate() {
        let units = match plan.ftd_counting {
            FtdCounting::Records => records.len() as u64,
            FtdCounting::FtdField => records
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.ftds)),
        };
        breakdown.ftd_units = units;
        breakdown.ftd = Decimal::from(units) * rate;
    }

    if plan.cpa_enabled {
        breakdown.cpa_count = records.len() as u64;
        breakdown.cpa = records.iter().map(|r| r.cpa).sum();
    }

    if let Some(rate) = plan.active_rev_rate() {
        // per-record rate, not the plan rate
        breakdown.rev = records.iter().map(|r| r.rev * r.amount).sum();
        breakdown.rev_share_pct = rate * Decimal::hundred();
    }

    breakdown
}
