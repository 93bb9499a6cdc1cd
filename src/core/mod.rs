pub mod detector;
pub mod engine;
pub mod report;
pub mod window;

pub use crate::domain::model::{AnomalyFinding, CostDataset, DailyCostSnapshot};
pub use crate::domain::ports::{CostSource, NotificationSink};
pub use crate::utils::error::Result;
