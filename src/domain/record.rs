//! Deposit records and their normalization from untyped upstream rows.

use crate::domain::{Decimal, TrackingTag};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::Value;

/// One reporting-period entry attributed to a tracking tag.
///
/// Records are only ever built through [`DepositRecord::from_raw`] or
/// [`DepositRecord::new`], so every numeric field is already coerced and the
/// date is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    pub date: DateTime<Utc>,
    /// Deposit volume; never negative.
    pub amount: Decimal,
    /// Money already earned under a per-acquisition model.
    pub cpa: Decimal,
    /// Revenue-share rate as a fraction (0.05 = 5%).
    pub rev: Decimal,
    /// First-time deposits represented by this row.
    pub ftds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btag: Option<TrackingTag>,
}

impl DepositRecord {
    pub fn new(date: DateTime<Utc>, amount: Decimal) -> Self {
        Self {
            date,
            amount: non_negative(amount),
            cpa: Decimal::zero(),
            rev: Decimal::zero(),
            ftds: 0,
            btag: None,
        }
    }

    pub fn with_cpa(mut self, cpa: Decimal) -> Self {
        self.cpa = cpa;
        self
    }

    pub fn with_rev(mut self, rev: Decimal) -> Self {
        self.rev = rev;
        self
    }

    pub fn with_ftds(mut self, ftds: u64) -> Self {
        self.ftds = ftds;
        self
    }

    pub fn with_btag(mut self, btag: TrackingTag) -> Self {
        self.btag = Some(btag);
        self
    }

    /// Normalize one untyped row.
    ///
    /// Returns `None` when the row is not an object or has no parseable
    /// `date`; such rows cannot be placed in a window. Numeric fields that are
    /// missing or invalid become zero. `ftdCount` is accepted as an alias of `ftds`.
    pub fn from_raw(row: &Value) -> Option<Self> {
        let obj = row.as_object()?;
        let date = obj.get("date").and_then(parse_date_value)?;

        let ftds = obj
            .get("ftds")
            .or_else(|| obj.get("ftdCount"))
            .map(coerce_count)
            .unwrap_or(0);

        let btag = obj
            .get("btag")
            .and_then(Value::as_str)
            .and_then(TrackingTag::parse);

        Some(Self {
            date,
            amount: non_negative(Decimal::coerce(obj.get("amount"))),
            cpa: Decimal::coerce(obj.get("cpa")),
            rev: Decimal::coerce(obj.get("rev")),
            ftds,
            btag,
        })
    }
}

/// Normalize a collection of rows, dropping the ones without a usable date.
pub fn normalize_rows(rows: &[Value]) -> Vec<DepositRecord> {
    rows.iter().filter_map(DepositRecord::from_raw).collect()
}

/// Parse a record date.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and a
/// plain `YYYY-MM-DD` (midnight UTC). Empty strings yield `None`.
pub fn parse_record_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_date_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_record_date(s),
        // epoch milliseconds
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn coerce_count(value: &Value) -> u64 {
    let d = Decimal::coerce(Some(value));
    if d.is_negative() {
        return 0;
    }
    d.inner().trunc().to_u64().unwrap_or(0)
}

fn non_negative(amount: Decimal) -> Decimal {
    if amount.is_negative() {
        Decimal::zero()
    } else {
        amount
    }
}
