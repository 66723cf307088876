//! Domain types for affiliate reporting.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: AffiliateId, TrackingTag
//! - Deposit records and their normalization from untyped upstream rows
//! - Commission plan configuration

pub mod decimal;
pub mod plan;
pub mod primitives;
pub mod record;

pub use decimal::Decimal;
pub use plan::{CommissionPlanConfig, FtdCounting};
pub use primitives::{AffiliateId, TrackingTag};
pub use record::{normalize_rows, parse_record_date, DepositRecord};
