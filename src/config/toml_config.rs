use crate::config::settings::DetectorSettings;
use crate::utils::error::{Result, SentinelError};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub threshold_percent: Option<f64>,
    pub lookback_days: Option<u32>,
    pub environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Csv { path: String },
    Http { endpoint: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub topic_arn: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SentinelError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SLACK_WEBHOOK_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SentinelError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Layers the file values over the defaults.
    pub fn to_settings(&self) -> DetectorSettings {
        let defaults = DetectorSettings::default();
        DetectorSettings {
            threshold_percent: self
                .detection
                .threshold_percent
                .unwrap_or(defaults.threshold_percent),
            lookback_days: self.detection.lookback_days.unwrap_or(defaults.lookback_days),
            alert_topic_target: self.notifications.topic_arn.clone().unwrap_or_default(),
            webhook_target: self.notifications.webhook_url.clone().unwrap_or_default(),
            environment_label: self
                .detection
                .environment
                .clone()
                .unwrap_or(defaults.environment_label),
            webhook_timeout_secs: self
                .notifications
                .webhook_timeout_secs
                .unwrap_or(defaults.webhook_timeout_secs),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        match &self.source {
            Some(SourceConfig::Csv { path }) => validate_non_empty_string("source.path", path)?,
            Some(SourceConfig::Http { endpoint }) => validate_url("source.endpoint", endpoint)?,
            None => {}
        }
        self.to_settings().validate()
    }
}
