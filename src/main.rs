use clap::Parser;
use cost_sentinel::domain::ports::FixedClock;
use cost_sentinel::utils::logger;
use cost_sentinel::{CliConfig, DetectionEngine, SentinelError};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting cost-sentinel CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        tracing::error!("❌ Anomaly detection failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(config: CliConfig) -> Result<(), SentinelError> {
    let file = config.load_file()?;
    let settings = config.settings(&file)?;
    let source = config.source(&file)?;
    let sinks = config.sinks(&settings)?;

    let mut engine = DetectionEngine::new(source, settings).with_sinks(sinks);
    if let Some(date) = config.as_of {
        engine = engine.with_clock(Box::new(FixedClock(date)));
    }

    let report = engine.run().await?;

    for delivery in report.deliveries.iter().filter(|d| !d.delivered) {
        tracing::warn!(
            "Alert not delivered via {}: {}",
            delivery.sink,
            delivery.error.as_deref().unwrap_or("unknown error")
        );
    }

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report.outcome)?);
    } else {
        println!(
            "✅ {} anomalies detected for {} .. {}",
            report.outcome.anomalies_detected, report.outcome.period.start, report.outcome.period.end
        );
    }

    Ok(())
}
