use crate::domain::model::{CostDataset, DailyCostSnapshot};
use crate::domain::ports::CostSource;
use crate::utils::error::{Result, SentinelError};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct DailyCostEntry {
    date: NaiveDate,
    categories: BTreeMap<String, f64>,
}

/// Cost API returning `[{"date": "YYYY-MM-DD", "categories": {"name": cost}}]`
/// for `GET <endpoint>?start=..&end=..`.
pub struct HttpCostSource {
    endpoint: String,
    client: Client,
}

impl HttpCostSource {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CostSource for HttpCostSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_daily_costs(&self, start: NaiveDate, end: NaiveDate) -> Result<CostDataset> {
        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("start", start.to_string()), ("end", end.to_string())])
            .send()
            .await
            .map_err(|e| SentinelError::upstream(self.name(), e.to_string()))?;

        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(SentinelError::upstream(
                self.name(),
                format!("unexpected status {}", response.status()),
            ));
        }

        let entries: Vec<DailyCostEntry> = response
            .json()
            .await
            .map_err(|e| SentinelError::upstream(self.name(), format!("invalid body: {}", e)))?;

        let snapshots = entries
            .into_iter()
            .filter(|entry| entry.date >= start && entry.date <= end)
            .map(|entry| DailyCostSnapshot::from_categories(entry.date, entry.categories))
            .collect();
        CostDataset::from_snapshots(snapshots)
    }
}
