use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to build span exporter: {0}")]
    Exporter(String),
    #[error("failed to install subscriber: {0}")]
    Subscriber(String),
}
