//! Repository for the affiliate directory: tracking tags and commission plans.

use crate::domain::{AffiliateId, CommissionPlanConfig, Decimal, FtdCounting, TrackingTag};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Cheap connectivity check for readiness probes.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Tracking tags
    // =========================================================================

    /// Associate `tag` with `user`. Returns false when the pair already exists.
    pub async fn insert_tag(
        &self,
        user: &AffiliateId,
        tag: &TrackingTag,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO affiliate_tags (user_id, btag)
            VALUES (?, ?)
            ON CONFLICT(user_id, btag) DO NOTHING
            "#,
        )
        .bind(user.as_str())
        .bind(tag.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tags registered for `user`, in registration order.
    pub async fn tags_for(&self, user: &AffiliateId) -> Result<Vec<TrackingTag>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT btag FROM affiliate_tags
            WHERE user_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| TrackingTag::parse(row.get::<String, _>("btag").as_str()))
            .collect())
    }

    // =========================================================================
    // Commission plans
    // =========================================================================

    /// Insert or replace the commission plan for `user`.
    pub async fn upsert_plan(
        &self,
        user: &AffiliateId,
        plan: &CommissionPlanConfig,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO commission_plans (user_id, ftd_rate, cpa_enabled, rev_rate, ftd_counting)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                ftd_rate = excluded.ftd_rate,
                cpa_enabled = excluded.cpa_enabled,
                rev_rate = excluded.rev_rate,
                ftd_counting = excluded.ftd_counting
            "#,
        )
        .bind(user.as_str())
        .bind(plan.ftd_rate.map(|d| d.to_canonical_string()))
        .bind(plan.cpa_enabled)
        .bind(plan.rev_rate.map(|d| d.to_canonical_string()))
        .bind(plan.ftd_counting.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Commission plan for `user`, if one is configured.
    pub async fn plan_for(
        &self,
        user: &AffiliateId,
    ) -> Result<Option<CommissionPlanConfig>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT ftd_rate, cpa_enabled, rev_rate, ftd_counting
            FROM commission_plans
            WHERE user_id = ?
            "#,
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let ftd_counting: String = row.get("ftd_counting");
        let ftd_counting = ftd_counting.parse().unwrap_or_else(|e| {
            warn!("Invalid ftd_counting for user {}: {}", user, e);
            FtdCounting::default()
        });

        Ok(Some(CommissionPlanConfig {
            ftd_rate: parse_rate(user, "ftd_rate", row.get("ftd_rate")),
            cpa_enabled: row.get::<i64, _>("cpa_enabled") != 0,
            rev_rate: parse_rate(user, "rev_rate", row.get("rev_rate")),
            ftd_counting,
        }))
    }
}

fn parse_rate(user: &AffiliateId, column: &str, value: Option<String>) -> Option<Decimal> {
    let value = value?;
    match Decimal::from_str_canonical(&value) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!("Invalid {} '{}' for user {}: {}", column, value, user, e);
            None
        }
    }
}
