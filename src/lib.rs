pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod identity;

pub use config::Config;
pub use datasource::{MockRecordSource, NotionRecordSource, RecordSource, RecordSourceError};
pub use db::{init_db, Repository};
pub use domain::{
    AffiliateId, CommissionPlanConfig, Decimal, DepositRecord, FtdCounting, TrackingTag,
};
pub use engine::{
    aggregate, aggregate_payload, resolve_windows, Aggregation, DashboardView, KpiSummary,
    RangeMode, ReportingWindow, ResolvedWindows,
};
pub use error::AppError;
pub use identity::{IdentityProvider, StaticIdentityProvider, SupabaseIdentityProvider};
