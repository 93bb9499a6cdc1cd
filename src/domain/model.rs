use crate::utils::error::{Result, SentinelError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category label used on aggregate findings.
pub const ALL_CATEGORIES: &str = "ALL SERVICES";

/// Cost of a single day, broken down by spend category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCostSnapshot {
    pub date: NaiveDate,
    pub total: f64,
    pub categories: BTreeMap<String, f64>,
}

impl DailyCostSnapshot {
    /// Builds a snapshot whose total is the sum of its category costs.
    pub fn from_categories(date: NaiveDate, categories: BTreeMap<String, f64>) -> Self {
        let total = categories.values().sum();
        Self {
            date,
            total,
            categories,
        }
    }

    pub fn category_cost(&self, category: &str) -> f64 {
        self.categories.get(category).copied().unwrap_or(0.0)
    }
}

/// Daily snapshots sorted ascending by date. The last entry is the day under
/// evaluation, everything before it is the baseline window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostDataset {
    snapshots: Vec<DailyCostSnapshot>,
}

impl CostDataset {
    pub fn from_snapshots(mut snapshots: Vec<DailyCostSnapshot>) -> Result<Self> {
        snapshots.sort_by_key(|s| s.date);

        if let Some(pair) = snapshots.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SentinelError::invalid_data(format!(
                "duplicate snapshot for {}",
                pair[0].date
            )));
        }

        Ok(Self { snapshots })
    }

    pub fn snapshots(&self) -> &[DailyCostSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current(&self) -> Option<&DailyCostSnapshot> {
        self.snapshots.last()
    }

    pub fn baseline(&self) -> &[DailyCostSnapshot] {
        match self.snapshots.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    #[serde(rename = "total")]
    Aggregate,
    #[serde(rename = "service")]
    PerCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFinding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    #[serde(rename = "service")]
    pub category: String,
    pub date: NaiveDate,
    #[serde(rename = "current")]
    pub current_value: f64,
    #[serde(rename = "average")]
    pub baseline_average: f64,
    #[serde(rename = "deviation_pct")]
    pub deviation_percent: f64,
}

impl AnomalyFinding {
    pub fn is_increase(&self) -> bool {
        self.deviation_percent > 0.0
    }
}

/// Inclusive date range evaluated by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionOutcome {
    pub anomalies_detected: usize,
    pub anomalies: Vec<AnomalyFinding>,
    pub period: DetectionPeriod,
}

impl DetectionOutcome {
    pub fn new(anomalies: Vec<AnomalyFinding>, period: DetectionPeriod) -> Self {
        Self {
            anomalies_detected: anomalies.len(),
            anomalies,
            period,
        }
    }
}

/// Rendered alert handed to every notification sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertReport {
    pub subject: String,
    pub text_body: String,
    pub chat_message: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn snapshot(d: u32, costs: &[(&str, f64)]) -> DailyCostSnapshot {
        DailyCostSnapshot::from_categories(
            day(d),
            costs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        )
    }

    #[test]
    fn test_snapshot_total_is_category_sum() {
        let s = snapshot(1, &[("Amazon EC2", 120.5), ("Amazon S3", 9.5)]);
        assert_eq!(s.total, 130.0);
        assert_eq!(s.category_cost("Amazon S3"), 9.5);
        assert_eq!(s.category_cost("AWS Lambda"), 0.0);
    }

    #[test]
    fn test_dataset_sorts_and_splits() {
        let dataset = CostDataset::from_snapshots(vec![
            snapshot(3, &[("EC2", 3.0)]),
            snapshot(1, &[("EC2", 1.0)]),
            snapshot(2, &[("EC2", 2.0)]),
        ])
        .unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.current().unwrap().date, day(3));
        let baseline: Vec<_> = dataset.baseline().iter().map(|s| s.date).collect();
        assert_eq!(baseline, vec![day(1), day(2)]);
    }

    #[test]
    fn test_dataset_rejects_duplicate_dates() {
        let result = CostDataset::from_snapshots(vec![
            snapshot(1, &[("EC2", 1.0)]),
            snapshot(1, &[("EC2", 2.0)]),
        ]);
        assert!(matches!(result, Err(SentinelError::InvalidData { .. })));
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = CostDataset::default();
        assert!(dataset.is_empty());
        assert!(dataset.current().is_none());
        assert!(dataset.baseline().is_empty());
    }

    #[test]
    fn test_finding_serializes_with_alert_field_names() {
        let finding = AnomalyFinding {
            kind: FindingKind::Aggregate,
            category: ALL_CATEGORIES.to_string(),
            date: day(17),
            current_value: 140.0,
            baseline_average: 100.0,
            deviation_percent: 40.0,
        };

        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["type"], "total");
        assert_eq!(json["service"], "ALL SERVICES");
        assert_eq!(json["date"], "2026-10-17");
        assert_eq!(json["deviation_pct"], 40.0);
    }
}
