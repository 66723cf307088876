//! Notion database client for affiliate activity rows.

use super::{RecordSource, RecordSourceError};
use crate::domain::{DepositRecord, TrackingTag};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const PAGE_SIZE: u32 = 100;

/// Connection settings for the Notion record store.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub base_url: String,
    pub token: String,
    pub database_id: String,
    pub api_version: String,
}

/// Record source backed by a Notion database query filtered on the `btag` property.
#[derive(Debug, Clone)]
pub struct NotionRecordSource {
    client: Client,
    config: NotionConfig,
}

impl NotionRecordSource {
    pub fn new(config: NotionConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn query_page(&self, payload: &Value) -> Result<Value, RecordSourceError> {
        let url = format!(
            "{}/v1/databases/{}/query",
            self.config.base_url.trim_end_matches('/'),
            self.config.database_id
        );
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.config.token)
                .header("Notion-Version", &self.config.api_version)
                .json(payload)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(RecordSourceError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(RecordSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(RecordSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(RecordSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response.json::<Value>().await.map_err(|e| {
                backoff::Error::permanent(RecordSourceError::ParseError(e.to_string()))
            })
        })
        .await
    }
}

#[async_trait]
impl RecordSource for NotionRecordSource {
    async fn fetch_records(
        &self,
        tag: &TrackingTag,
    ) -> Result<Vec<DepositRecord>, RecordSourceError> {
        debug!("Fetching records for btag={}", tag);

        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let payload = query_payload(tag, cursor.as_deref());
            let page = self.query_page(&payload).await?;
            let (mut batch, next) = parse_query_page(&page, tag)?;
            records.append(&mut batch);

            match next {
                Some(next_cursor) => cursor = Some(next_cursor),
                None => break,
            }
        }

        debug!("Fetched {} records for btag={}", records.len(), tag);
        Ok(records)
    }
}

fn query_payload(tag: &TrackingTag, cursor: Option<&str>) -> Value {
    let mut payload = json!({
        "filter": {
            "property": "btag",
            "rich_text": { "equals": tag.as_str() }
        },
        "page_size": PAGE_SIZE
    });
    if let Some(cursor) = cursor {
        payload["start_cursor"] = Value::String(cursor.to_string());
    }
    payload
}

/// Parse one query response page into records and the next cursor, if any.
fn parse_query_page(
    page: &Value,
    tag: &TrackingTag,
) -> Result<(Vec<DepositRecord>, Option<String>), RecordSourceError> {
    let results = page
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| RecordSourceError::ParseError("Expected results array".to_string()))?;

    let mut records = Vec::new();
    for row in results {
        match map_row(row, tag) {
            Some(record) => records.push(record),
            None => debug!("Skipping row without date or deposit amount"),
        }
    }

    let has_more = page
        .get("has_more")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let next = page
        .get("next_cursor")
        .and_then(Value::as_str)
        .map(str::to_string);

    let next = match (has_more, next) {
        (true, Some(cursor)) => Some(cursor),
        (true, None) => {
            warn!("Response has_more without next_cursor; stopping pagination");
            None
        }
        (false, _) => None,
    };

    Ok((records, next))
}

/// Map a Notion page to a record.
///
/// Rows without a date or with a non-positive deposit amount are dropped.
fn map_row(row: &Value, tag: &TrackingTag) -> Option<DepositRecord> {
    let props = row.get("properties")?;
    let number = |name: &str| {
        props
            .get(name)
            .and_then(|p| p.get("number"))
            .cloned()
            .unwrap_or(Value::Null)
    };
    let date = props
        .get("Date/Hora")
        .and_then(|p| p.get("date"))
        .and_then(|d| d.get("start"))
        .cloned()
        .unwrap_or(Value::Null);

    let raw = json!({
        "date": date,
        "amount": number("Deposits amount"),
        "cpa": number("CPA"),
        "rev": number("RevShare"),
        "ftds": number("FTDs"),
    });

    DepositRecord::from_raw(&raw)
        .filter(|r| r.amount.is_positive())
        .map(|r| r.with_btag(tag.clone()))
}
