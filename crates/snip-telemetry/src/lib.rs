//! Process-wide tracing setup.
//!
//! [`init`] installs a `tracing` subscriber made of an `EnvFilter`, a `fmt`
//! layer (human readable or JSON) and, when an OTLP endpoint is configured,
//! an OpenTelemetry layer exporting spans over gRPC. `log` records from
//! dependencies are forwarded through `tracing-log`.

mod config;
mod error;

pub use config::{LogFormat, TelemetryConfig};
pub use error::TelemetryError;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_log::LogTracer;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Keeps the span exporter alive. Dropping it flushes pending spans.
#[must_use = "dropping the guard shuts down span export"]
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {err}");
            }
        }
    }
}

/// Installs the global subscriber. Call once, early in `main`.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_directive()))
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(config.log_format())];

    let provider = match config.otlp_endpoint() {
        Some(endpoint) => {
            let provider = tracer_provider(config.service_name(), endpoint)?;
            let tracer = provider.tracer(config.service_name().to_owned());
            layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());
            opentelemetry::global::set_tracer_provider(provider.clone());
            Some(provider)
        }
        None => None,
    };

    LogTracer::init().map_err(|e| TelemetryError::Subscriber(e.to_string()))?;
    Registry::default()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;

    tracing::debug!(
        format = %config.log_format(),
        otlp = provider.is_some(),
        "telemetry initialized"
    );
    Ok(TelemetryGuard { provider })
}

fn fmt_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .boxed(),
    }
}

fn tracer_provider(
    service_name: &str,
    endpoint: &str,
) -> Result<SdkTracerProvider, TelemetryError> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_owned())
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}
