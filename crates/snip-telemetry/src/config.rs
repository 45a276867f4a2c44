use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use typed_builder::TypedBuilder;

/// Output format of the `fmt` layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Error)]
#[error("unknown log format '{0}', expected 'pretty' or 'json'")]
pub struct ParseLogFormatError(String);

impl FromStr for LogFormat {
    type Err = ParseLogFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ParseLogFormatError(s.to_owned())),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    #[builder(setter(into))]
    service_name: String,
    #[builder(default)]
    log_format: LogFormat,
    /// gRPC endpoint of an OTLP collector, e.g. `http://localhost:4317`.
    #[builder(default, setter(into))]
    otlp_endpoint: Option<String>,
    /// Filter used when `RUST_LOG` is unset.
    #[builder(default = "info".to_string(), setter(into))]
    default_directive: String,
}

impl TelemetryConfig {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otlp_endpoint.as_deref().filter(|e| !e.is_empty())
    }

    pub fn default_directive(&self) -> &str {
        &self.default_directive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_formats() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn builder_defaults() {
        let config = TelemetryConfig::builder().service_name("snip").build();

        assert_eq!(config.service_name(), "snip");
        assert_eq!(config.log_format(), LogFormat::Pretty);
        assert_eq!(config.otlp_endpoint(), None);
        assert_eq!(config.default_directive(), "info");
    }

    #[test]
    fn empty_otlp_endpoint_disables_export() {
        let config = TelemetryConfig::builder()
            .service_name("snip")
            .otlp_endpoint(Some(String::new()))
            .build();

        assert_eq!(config.otlp_endpoint(), None);
    }
}
