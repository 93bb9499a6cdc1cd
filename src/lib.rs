pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{DetectorSettings, LambdaConfig};
pub use crate::core::detector::detect_anomalies;
pub use crate::core::engine::{DetectionEngine, RunReport};
pub use domain::model::{AnomalyFinding, CostDataset, DailyCostSnapshot, DetectionOutcome};
pub use utils::error::{Result, SentinelError};
