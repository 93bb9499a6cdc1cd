use crate::core::report::RunMetadata;
use crate::utils::error::{Result, SentinelError};
use crate::utils::validation::{
    validate_non_empty_string, validate_optional_url, validate_positive_percent, validate_range,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_THRESHOLD_PERCENT: f64 = 30.0;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;
pub const DEFAULT_ENVIRONMENT: &str = "production";
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Immutable per-run settings. Empty targets disable the matching sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSettings {
    pub threshold_percent: f64,
    pub lookback_days: u32,
    pub alert_topic_target: String,
    pub webhook_target: String,
    pub environment_label: String,
    pub webhook_timeout_secs: u64,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            alert_topic_target: String::new(),
            webhook_target: String::new(),
            environment_label: DEFAULT_ENVIRONMENT.to_string(),
            webhook_timeout_secs: DEFAULT_WEBHOOK_TIMEOUT_SECS,
        }
    }
}

impl DetectorSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 從任意 key/value 來源讀取設定 (測試時不需改動行程環境變數)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let settings = Self {
            threshold_percent: parse_or("ANOMALY_THRESHOLD", &lookup, defaults.threshold_percent)?,
            lookback_days: parse_or("LOOKBACK_DAYS", &lookup, defaults.lookback_days)?,
            alert_topic_target: lookup("SNS_TOPIC_ARN").unwrap_or_default(),
            webhook_target: lookup("SLACK_WEBHOOK_URL").unwrap_or_default(),
            environment_label: lookup("ENVIRONMENT").unwrap_or(defaults.environment_label),
            webhook_timeout_secs: parse_or(
                "WEBHOOK_TIMEOUT_SECS",
                &lookup,
                defaults.webhook_timeout_secs,
            )?,
        };
        Ok(settings)
    }

    pub fn topic_enabled(&self) -> bool {
        !self.alert_topic_target.is_empty()
    }

    pub fn webhook_enabled(&self) -> bool {
        !self.webhook_target.is_empty()
    }

    pub fn run_metadata(&self) -> RunMetadata {
        RunMetadata {
            environment: self.environment_label.clone(),
            threshold_percent: self.threshold_percent,
            lookback_days: self.lookback_days,
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|_| SentinelError::InvalidConfigValueError {
                    field: key.to_string(),
                    value: raw.clone(),
                    reason: "Value is not a valid number".to_string(),
                })
        }
        _ => Ok(default),
    }
}

impl Validate for DetectorSettings {
    fn validate(&self) -> Result<()> {
        validate_positive_percent("threshold_percent", self.threshold_percent)?;
        validate_range("lookback_days", self.lookback_days, 1, 365)?;
        validate_optional_url("webhook_target", &self.webhook_target)?;
        validate_non_empty_string("environment_label", &self.environment_label)?;
        validate_range("webhook_timeout_secs", self.webhook_timeout_secs, 1, 300)?;

        tracing::debug!("✅ Detector settings validation passed");
        Ok(())
    }
}
