use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Billing source '{source_name}' failed: {message}")]
    UpstreamError { source_name: String, message: String },

    #[error("Notification sink '{sink}' failed: {message}")]
    TransportError { sink: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid cost data: {message}")]
    InvalidData { message: String },
}

impl SentinelError {
    pub fn upstream(source_name: &str, message: impl Into<String>) -> Self {
        Self::UpstreamError {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn transport(sink: &str, message: impl Into<String>) -> Self {
        Self::TransportError {
            sink: sink.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. }
                | Self::InvalidConfigValueError { .. }
                | Self::MissingConfigError { .. }
        )
    }

    /// 傳輸錯誤只記錄，不中斷整個執行
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::TransportError { .. })
    }

    /// Process exit code used by the CLI binary.
    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }
}

pub type Result<T> = std::result::Result<T, SentinelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_not_fatal() {
        assert!(!SentinelError::transport("webhook", "timeout").is_fatal());
        assert!(SentinelError::upstream("cost-explorer", "denied").is_fatal());
    }

    #[test]
    fn test_exit_codes() {
        let config = SentinelError::MissingConfigError {
            field: "csv_path".to_string(),
        };
        assert_eq!(config.exit_code(), 2);
        assert_eq!(SentinelError::upstream("http", "boom").exit_code(), 1);
    }

    #[test]
    fn test_display_includes_context() {
        let err = SentinelError::upstream("cost-explorer", "AccessDenied");
        assert_eq!(
            err.to_string(),
            "Billing source 'cost-explorer' failed: AccessDenied"
        );
    }
}
