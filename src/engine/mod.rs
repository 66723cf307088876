//! Pure aggregation engine for affiliate performance reporting.
//!
//! Nothing in here reads the clock, touches the network or fails: callers
//! pass `now` explicitly and malformed input degrades to zero-valued output.

pub mod aggregate;
pub mod commission;
pub mod window;

pub use aggregate::{
    aggregate, aggregate_payload, percent_change, Aggregation, DashboardView, KpiSummary,
};
pub use commission::{compute_commission, CommissionBreakdown};
pub use window::{resolve_windows, RangeMode, ReportingWindow, ResolvedWindows};
