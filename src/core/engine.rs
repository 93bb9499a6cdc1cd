use crate::config::settings::DetectorSettings;
use crate::core::detector::detect_anomalies;
use crate::core::report::build_alert_report;
use crate::core::window::evaluation_window;
use crate::domain::model::{AlertReport, DetectionOutcome};
use crate::domain::ports::{Clock, CostSource, NotificationSink, SystemClock};
use crate::utils::error::Result;
use serde::Serialize;

/// Result of a single sink delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryReport {
    pub sink: String,
    pub delivered: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub outcome: DetectionOutcome,
    pub deliveries: Vec<DeliveryReport>,
}

/// Drives one detection run: fetch, score, notify.
pub struct DetectionEngine<S: CostSource> {
    source: S,
    sinks: Vec<Box<dyn NotificationSink>>,
    settings: DetectorSettings,
    clock: Box<dyn Clock>,
}

impl<S: CostSource> DetectionEngine<S> {
    pub fn new(source: S, settings: DetectorSettings) -> Self {
        Self {
            source,
            sinks: Vec::new(),
            settings,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_sinks(mut self, sinks: Vec<Box<dyn NotificationSink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!(
            "Running anomaly detection with threshold={}%, lookback={} days",
            self.settings.threshold_percent,
            self.settings.lookback_days
        );

        let period = evaluation_window(self.clock.today(), self.settings.lookback_days);
        tracing::debug!(
            "Fetching daily costs from '{}' for {} .. {}",
            self.source.name(),
            period.start,
            period.end
        );

        let dataset = self
            .source
            .fetch_daily_costs(period.start, period.end)
            .await
            .inspect_err(|e| tracing::error!("❌ Anomaly detection failed: {}", e))?;
        tracing::debug!("Fetched {} daily snapshots", dataset.len());

        let findings = detect_anomalies(&dataset, self.settings.threshold_percent);

        let deliveries = if findings.is_empty() {
            tracing::info!("No anomalies detected - all clear");
            Vec::new()
        } else {
            tracing::info!("Detected {} anomalies", findings.len());
            let report = build_alert_report(&findings, &self.settings.run_metadata());
            self.dispatch(&report).await
        };

        Ok(RunReport {
            outcome: DetectionOutcome::new(findings, period),
            deliveries,
        })
    }

    /// Sends the report to every sink; a failing sink never affects the others.
    pub async fn dispatch(&self, report: &AlertReport) -> Vec<DeliveryReport> {
        let mut deliveries = Vec::with_capacity(self.sinks.len());

        for sink in &self.sinks {
            let delivery = match sink.send(report).await {
                Ok(()) => {
                    tracing::info!("📨 Alert sent via {}", sink.name());
                    DeliveryReport {
                        sink: sink.name().to_string(),
                        delivered: true,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to send alert via {}: {}", sink.name(), e);
                    DeliveryReport {
                        sink: sink.name().to_string(),
                        delivered: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            deliveries.push(delivery);
        }

        deliveries
    }
}
