use crate::domain::model::{AlertReport, CostDataset};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Billing data provider. `start` and `end` are both inclusive.
#[async_trait]
pub trait CostSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_daily_costs(&self, start: NaiveDate, end: NaiveDate) -> Result<CostDataset>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, report: &AlertReport) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[async_trait]
impl<T: CostSource + ?Sized> CostSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_daily_costs(&self, start: NaiveDate, end: NaiveDate) -> Result<CostDataset> {
        (**self).fetch_daily_costs(start, end).await
    }
}
