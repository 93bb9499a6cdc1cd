#[cfg(feature = "lambda")]
use crate::core::report::truncate_subject;
#[cfg(feature = "lambda")]
use crate::domain::model::{AlertReport, CostDataset, DailyCostSnapshot};
#[cfg(feature = "lambda")]
use crate::domain::ports::{CostSource, NotificationSink};
#[cfg(feature = "lambda")]
use crate::utils::error::{Result, SentinelError};
#[cfg(feature = "lambda")]
use async_trait::async_trait;
#[cfg(feature = "lambda")]
use aws_sdk_costexplorer::types::{
    DateInterval, Granularity, GroupDefinition, GroupDefinitionType, ResultByTime,
};
#[cfg(feature = "lambda")]
use aws_sdk_costexplorer::Client as CostExplorerClient;
#[cfg(feature = "lambda")]
use aws_sdk_sns::Client as SnsClient;
#[cfg(feature = "lambda")]
use chrono::{Days, NaiveDate};
#[cfg(feature = "lambda")]
use std::collections::BTreeMap;

#[cfg(feature = "lambda")]
const COST_METRIC: &str = "UnblendedCost";
#[cfg(feature = "lambda")]
const SOURCE_NAME: &str = "cost-explorer";

/// AWS Cost Explorer daily costs grouped by service.
#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct CostExplorerSource {
    client: CostExplorerClient,
}

#[cfg(feature = "lambda")]
impl CostExplorerSource {
    pub fn new(client: CostExplorerClient) -> Self {
        Self { client }
    }
}

#[cfg(feature = "lambda")]
#[async_trait]
impl CostSource for CostExplorerSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_daily_costs(&self, start: NaiveDate, end: NaiveDate) -> Result<CostDataset> {
        // Cost Explorer 的 End 為排除端點：昨天為 end 時送出 End = 今天
        let exclusive_end = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| SentinelError::upstream(self.name(), "end date out of range"))?;
        let period = DateInterval::builder()
            .start(start.to_string())
            .end(exclusive_end.to_string())
            .build()
            .map_err(|e| SentinelError::upstream(self.name(), e.to_string()))?;
        let group_by = GroupDefinition::builder()
            .r#type(GroupDefinitionType::Dimension)
            .key("SERVICE")
            .build();

        let mut days = BTreeMap::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .get_cost_and_usage()
                .time_period(period.clone())
                .granularity(Granularity::Daily)
                .metrics(COST_METRIC)
                .group_by(group_by.clone())
                .set_next_page_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    SentinelError::upstream(
                        self.name(),
                        aws_sdk_costexplorer::error::DisplayErrorContext(e).to_string(),
                    )
                })?;

            fold_results(response.results_by_time(), &mut days)?;

            match response.next_page_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!("Cost Explorer returned {} days", days.len());
        into_dataset(days)
    }
}

#[cfg(feature = "lambda")]
type DailyGroups = BTreeMap<NaiveDate, BTreeMap<String, f64>>;

/// Adds one page of results to `days`. A day's groups may be split across
/// pages, so costs for the same date and service are summed.
#[cfg(feature = "lambda")]
fn fold_results(results: &[ResultByTime], days: &mut DailyGroups) -> Result<()> {
    for result in results {
        let raw_date = result
            .time_period()
            .map(|p| p.start())
            .ok_or_else(|| SentinelError::upstream(SOURCE_NAME, "result without time period"))?;
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
            SentinelError::upstream(SOURCE_NAME, format!("invalid date '{}': {}", raw_date, e))
        })?;

        // 沒有任何群組的日子也要保留 (花費為 0)
        let categories = days.entry(date).or_default();
        for group in result.groups() {
            let Some(service) = group.keys().first() else {
                continue;
            };
            let amount = group
                .metrics()
                .and_then(|m| m.get(COST_METRIC))
                .and_then(|v| v.amount())
                .unwrap_or("0");
            let cost: f64 = amount.trim().parse().map_err(|_| {
                SentinelError::upstream(
                    SOURCE_NAME,
                    format!("invalid amount '{}' for {}", amount, service),
                )
            })?;
            *categories.entry(service.clone()).or_insert(0.0) += cost;
        }
    }
    Ok(())
}

#[cfg(feature = "lambda")]
fn into_dataset(days: DailyGroups) -> Result<CostDataset> {
    let snapshots = days
        .into_iter()
        .map(|(date, categories)| DailyCostSnapshot::from_categories(date, categories))
        .collect();
    CostDataset::from_snapshots(snapshots)
}

/// Publishes the text report to an SNS topic.
#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct SnsTopicSink {
    client: SnsClient,
    topic_arn: String,
}

#[cfg(feature = "lambda")]
impl SnsTopicSink {
    pub fn new(client: SnsClient, topic_arn: String) -> Self {
        Self { client, topic_arn }
    }
}

#[cfg(feature = "lambda")]
#[async_trait]
impl NotificationSink for SnsTopicSink {
    fn name(&self) -> &str {
        "sns"
    }

    async fn send(&self, report: &AlertReport) -> Result<()> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(truncate_subject(&report.subject))
            .message(&report.text_body)
            .send()
            .await
            .map_err(|e| {
                SentinelError::transport(
                    self.name(),
                    aws_sdk_sns::error::DisplayErrorContext(e).to_string(),
                )
            })?;

        tracing::debug!("SNS alert published to {}", self.topic_arn);
        Ok(())
    }
}
