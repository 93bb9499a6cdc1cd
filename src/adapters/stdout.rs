use crate::domain::model::AlertReport;
use crate::domain::ports::NotificationSink;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::Write;

/// Prints the plain-text report, for local runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait]
impl NotificationSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn send(&self, report: &AlertReport) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", report.subject)?;
        writeln!(out, "{}", report.text_body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prints_without_error() {
        let report = AlertReport {
            subject: "⚠️ FinOps Alert: 1 cost anomalies detected".to_string(),
            text_body: "↑ Amazon EC2: $300.00 (avg: $200.00) — +50.0%".to_string(),
            chat_message: serde_json::json!({}),
        };
        assert!(tokio_test::block_on(StdoutSink.send(&report)).is_ok());
        assert_eq!(StdoutSink.name(), "stdout");
    }
}
