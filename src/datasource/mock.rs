//! Mock record source for testing without network calls.

use super::{RecordSource, RecordSourceError};
use crate::domain::{DepositRecord, TrackingTag};
use async_trait::async_trait;
use std::collections::HashMap;

/// Mock record source that returns predefined records per tag.
#[derive(Debug, Clone, Default)]
pub struct MockRecordSource {
    records: HashMap<TrackingTag, Vec<DepositRecord>>,
    failing: Option<RecordSourceError>,
}

impl MockRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record under `tag`.
    pub fn with_record(mut self, tag: &str, record: DepositRecord) -> Self {
        let tag = TrackingTag::new(tag.to_string());
        let record = record.with_btag(tag.clone());
        self.records.entry(tag).or_default().push(record);
        self
    }

    /// Add multiple records under `tag`.
    pub fn with_records(self, tag: &str, records: Vec<DepositRecord>) -> Self {
        records
            .into_iter()
            .fold(self, |source, record| source.with_record(tag, record))
    }

    /// Make every fetch fail with `error`.
    pub fn failing_with(mut self, error: RecordSourceError) -> Self {
        self.failing = Some(error);
        self
    }
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn fetch_records(
        &self,
        tag: &TrackingTag,
    ) -> Result<Vec<DepositRecord>, RecordSourceError> {
        if let Some(err) = &self.failing {
            return Err(err.clone());
        }
        Ok(self.records.get(tag).cloned().unwrap_or_default())
    }
}
