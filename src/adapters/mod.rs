// Adapters layer: concrete cost sources and notification sinks.

pub mod aws;
pub mod csv_source;
pub mod http_source;
pub mod stdout;
pub mod webhook;

pub use csv_source::CsvCostSource;
pub use http_source::HttpCostSource;
pub use stdout::StdoutSink;
pub use webhook::WebhookSink;

#[cfg(feature = "lambda")]
pub use aws::{CostExplorerSource, SnsTopicSink};
