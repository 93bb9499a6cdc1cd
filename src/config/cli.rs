use crate::adapters::{CsvCostSource, HttpCostSource, StdoutSink, WebhookSink};
use crate::config::settings::DetectorSettings;
use crate::config::toml_config::{SourceConfig, TomlConfig};
use crate::domain::ports::{CostSource, NotificationSink};
use crate::utils::error::{Result, SentinelError};
use crate::utils::validation::Validate;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "cost-sentinel")]
#[command(about = "Detects daily cloud spend anomalies against a rolling baseline")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Cost export CSV with date,category,cost columns")]
    pub csv: Option<PathBuf>,

    #[arg(long, help = "HTTP cost API endpoint", conflicts_with = "csv")]
    pub api_endpoint: Option<String>,

    #[arg(long, help = "Alert threshold in percent [default: 30]")]
    pub threshold: Option<f64>,

    #[arg(long, help = "Number of baseline days [default: 7]")]
    pub lookback_days: Option<u32>,

    #[arg(long, help = "Environment label shown in alerts [default: production]")]
    pub environment: Option<String>,

    #[arg(long, help = "Incoming webhook URL for chat alerts")]
    pub webhook_url: Option<String>,

    #[arg(long, help = "Evaluate as if today were this date (YYYY-MM-DD, UTC)")]
    pub as_of: Option<NaiveDate>,

    #[arg(long, help = "Print the text report when anomalies are found")]
    pub print_report: bool,

    #[arg(long, help = "Write the detection result as JSON to stdout")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn load_file(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Ok(file)
            }
            None => Ok(TomlConfig::default()),
        }
    }

    /// Command-line flags win over file values, which win over defaults.
    pub fn settings(&self, file: &TomlConfig) -> Result<DetectorSettings> {
        let mut settings = file.to_settings();
        if let Some(threshold) = self.threshold {
            settings.threshold_percent = threshold;
        }
        if let Some(days) = self.lookback_days {
            settings.lookback_days = days;
        }
        if let Some(environment) = &self.environment {
            settings.environment_label = environment.clone();
        }
        if let Some(url) = &self.webhook_url {
            settings.webhook_target = url.clone();
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn source(&self, file: &TomlConfig) -> Result<Box<dyn CostSource>> {
        if let Some(path) = &self.csv {
            return Ok(Box::new(CsvCostSource::new(path.clone())));
        }
        if let Some(endpoint) = &self.api_endpoint {
            crate::utils::validation::validate_url("api_endpoint", endpoint)?;
            return Ok(Box::new(HttpCostSource::new(endpoint.clone())));
        }

        match &file.source {
            Some(SourceConfig::Csv { path }) => Ok(Box::new(CsvCostSource::new(path))),
            Some(SourceConfig::Http { endpoint }) => {
                Ok(Box::new(HttpCostSource::new(endpoint.clone())))
            }
            None => Err(SentinelError::MissingConfigError {
                field: "source (--csv, --api-endpoint or [source] in the config file)"
                    .to_string(),
            }),
        }
    }

    /// The topic target needs AWS credentials and is only honoured by the Lambda binary.
    pub fn sinks(&self, settings: &DetectorSettings) -> Result<Vec<Box<dyn NotificationSink>>> {
        let mut sinks: Vec<Box<dyn NotificationSink>> = Vec::new();
        if self.print_report {
            sinks.push(Box::new(StdoutSink));
        }
        if settings.webhook_enabled() {
            sinks.push(Box::new(WebhookSink::new(
                settings.webhook_target.clone(),
                Duration::from_secs(settings.webhook_timeout_secs),
            )?));
        }
        if settings.topic_enabled() {
            tracing::warn!("SNS topic target is ignored by the CLI");
        }
        Ok(sinks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file() {
        let cli = CliConfig::parse_from([
            "cost-sentinel",
            "--csv",
            "costs.csv",
            "--threshold",
            "45",
            "--environment",
            "dev",
        ]);
        let file = TomlConfig::from_toml_str(
            r#"
[detection]
threshold_percent = 20
lookback_days = 10
"#,
        )
        .unwrap();

        let settings = cli.settings(&file).unwrap();
        assert_eq!(settings.threshold_percent, 45.0);
        assert_eq!(settings.lookback_days, 10);
        assert_eq!(settings.environment_label, "dev");
        assert_eq!(cli.source(&file).unwrap().name(), "csv");
    }

    #[test]
    fn test_source_from_file() {
        let cli = CliConfig::parse_from(["cost-sentinel"]);
        let file = TomlConfig::from_toml_str(
            r#"
[source]
type = "http"
endpoint = "https://billing.example.com/daily"
"#,
        )
        .unwrap();
        assert_eq!(cli.source(&file).unwrap().name(), "http");
    }

    #[test]
    fn test_missing_source() {
        let cli = CliConfig::parse_from(["cost-sentinel"]);
        assert!(matches!(
            cli.source(&TomlConfig::default()),
            Err(SentinelError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_threshold_flag() {
        let cli = CliConfig::parse_from(["cost-sentinel", "--threshold", "0"]);
        assert!(cli.settings(&TomlConfig::default()).is_err());
    }

    #[test]
    fn test_sinks() {
        let cli = CliConfig::parse_from([
            "cost-sentinel",
            "--print-report",
            "--webhook-url",
            "https://hooks.example.com/x",
        ]);
        let settings = cli.settings(&TomlConfig::default()).unwrap();
        let sinks = cli.sinks(&settings).unwrap();
        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["stdout", "webhook"]);
    }

    #[test]
    fn test_as_of_parses_date() {
        let cli = CliConfig::parse_from(["cost-sentinel", "--as-of", "2026-10-17"]);
        assert_eq!(cli.as_of, NaiveDate::from_ymd_opt(2026, 10, 17));
    }
}
