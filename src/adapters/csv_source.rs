use crate::domain::model::{CostDataset, DailyCostSnapshot};
use crate::domain::ports::CostSource;
use crate::utils::error::{Result, SentinelError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CostRow {
    date: String,
    category: String,
    cost: f64,
}

/// Reads a cost export with a `date,category,cost` header.
#[derive(Debug, Clone)]
pub struct CsvCostSource {
    path: PathBuf,
}

impl CsvCostSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse<R: std::io::Read>(
        reader: R,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CostDataset> {
        let mut days: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        for (line, row) in csv_reader.deserialize::<CostRow>().enumerate() {
            let row = row?;
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
                SentinelError::invalid_data(format!(
                    "row {}: invalid date '{}': {}",
                    line + 1,
                    row.date,
                    e
                ))
            })?;
            if !row.cost.is_finite() || row.cost < 0.0 {
                return Err(SentinelError::invalid_data(format!(
                    "row {}: cost must be a non-negative number, got {}",
                    line + 1,
                    row.cost
                )));
            }
            if date < start || date > end {
                continue;
            }

            // 同一天同一類別可能分多列 (例如不同帳號)，加總即可
            *days
                .entry(date)
                .or_default()
                .entry(row.category)
                .or_insert(0.0) += row.cost;
        }

        let snapshots = days
            .into_iter()
            .map(|(date, categories)| DailyCostSnapshot::from_categories(date, categories))
            .collect();
        CostDataset::from_snapshots(snapshots)
    }
}

#[async_trait]
impl CostSource for CsvCostSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch_daily_costs(&self, start: NaiveDate, end: NaiveDate) -> Result<CostDataset> {
        tracing::debug!("Reading cost export from {}", self.path.display());
        let file = std::fs::File::open(&self.path).map_err(|e| {
            SentinelError::upstream(
                self.name(),
                format!("cannot open {}: {}", self.path.display(), e),
            )
        })?;
        Self::parse(file, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_rows_fold_into_snapshots() {
        let data = "\
date,category,cost
2026-10-01,Amazon EC2,100.0
2026-10-01,Amazon S3,4.5
2026-10-02,Amazon EC2,60.0
2026-10-02,Amazon EC2,50.0
";
        let dataset = CsvCostSource::parse(data.as_bytes(), day(1), day(2)).unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.snapshots()[0];
        assert_eq!(first.total, 104.5);
        assert_eq!(first.category_cost("Amazon S3"), 4.5);
        assert_eq!(dataset.current().unwrap().category_cost("Amazon EC2"), 110.0);
    }

    #[test]
    fn test_rows_outside_window_are_ignored() {
        let data = "\
date,category,cost
2026-09-30,EC2,1.0
2026-10-05,EC2,2.0
2026-10-09,EC2,3.0
";
        let dataset = CsvCostSource::parse(data.as_bytes(), day(1), day(8)).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.current().unwrap().date, day(5));
    }

    #[test]
    fn test_invalid_rows() {
        let bad_date = "date,category,cost\n10/01/2026,EC2,1.0\n";
        assert!(matches!(
            CsvCostSource::parse(bad_date.as_bytes(), day(1), day(8)),
            Err(SentinelError::InvalidData { .. })
        ));

        let negative = "date,category,cost\n2026-10-01,EC2,-1.0\n";
        assert!(CsvCostSource::parse(negative.as_bytes(), day(1), day(8)).is_err());

        let not_a_number = "date,category,cost\n2026-10-01,EC2,lots\n";
        assert!(matches!(
            CsvCostSource::parse(not_a_number.as_bytes(), day(1), day(8)),
            Err(SentinelError::CsvError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_upstream_error() {
        let source = CsvCostSource::new("/nonexistent/costs.csv");
        let result = source.fetch_daily_costs(day(1), day(8)).await;
        assert!(matches!(result, Err(SentinelError::UpstreamError { .. })));
    }
}
