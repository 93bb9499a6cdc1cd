use crate::config::settings::DetectorSettings;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// Lambda configuration, read from the function's environment variables.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub settings: DetectorSettings,
    pub aws_region: Option<String>,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            settings: DetectorSettings::from_lookup(&lookup)?,
            aws_region: lookup("AWS_REGION").filter(|r| !r.is_empty()),
        })
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        if let Some(region) = &self.aws_region {
            validate_aws_region("aws_region", region)?;
        }

        if !self.settings.topic_enabled() && !self.settings.webhook_enabled() {
            tracing::warn!("No SNS topic or webhook configured; anomalies will only be logged");
        }

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    use crate::utils::error::SentinelError;
    use crate::utils::validation::validate_non_empty_string;

    validate_non_empty_string(field_name, region)?;

    // AWS region format validation
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SentinelError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}
