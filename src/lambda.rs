#[cfg(feature = "lambda")]
use aws_config::{BehaviorVersion, Region};
#[cfg(feature = "lambda")]
use cost_sentinel::adapters::{CostExplorerSource, SnsTopicSink, WebhookSink};
#[cfg(feature = "lambda")]
use cost_sentinel::domain::model::DetectionOutcome;
#[cfg(feature = "lambda")]
use cost_sentinel::domain::ports::NotificationSink;
#[cfg(feature = "lambda")]
use cost_sentinel::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use cost_sentinel::{DetectionEngine, LambdaConfig};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::Serialize;
#[cfg(feature = "lambda")]
use std::time::Duration;

#[cfg(feature = "lambda")]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: DetectionOutcome,
}

/// The scheduled event payload is not used.
#[cfg(feature = "lambda")]
async fn function_handler(_event: LambdaEvent<serde_json::Value>) -> Result<Response, Error> {
    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;
    let settings = lambda_config.settings;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = lambda_config.aws_region {
        loader = loader.region(Region::new(region));
    }
    let aws = loader.load().await;

    let mut sinks: Vec<Box<dyn NotificationSink>> = Vec::new();
    if settings.topic_enabled() {
        sinks.push(Box::new(SnsTopicSink::new(
            aws_sdk_sns::Client::new(&aws),
            settings.alert_topic_target.clone(),
        )));
    }
    if settings.webhook_enabled() {
        sinks.push(Box::new(WebhookSink::new(
            settings.webhook_target.clone(),
            Duration::from_secs(settings.webhook_timeout_secs),
        )?));
    }

    let source = CostExplorerSource::new(aws_sdk_costexplorer::Client::new(&aws));
    let engine = DetectionEngine::new(source, settings).with_sinks(sinks);

    let report = engine.run().await?;

    tracing::info!(
        anomalies = report.outcome.anomalies_detected,
        "Anomaly detection Lambda completed"
    );
    Ok(Response {
        status_code: 200,
        body: report.outcome,
    })
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
