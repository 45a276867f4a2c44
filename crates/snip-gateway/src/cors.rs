use std::str::FromStr;

use axum::http::header::{InvalidHeaderValue, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Allowed cross-origin callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsOrigin {
    /// `*`: any origin, without credentials.
    #[default]
    Any,
    /// Explicit origins; credentials are allowed.
    List(Vec<HeaderValue>),
}

impl FromStr for CorsOrigin {
    type Err = InvalidHeaderValue;

    /// Parses `*` or a comma-separated origin list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let origins: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect();

        if origins.is_empty() || origins.contains(&"*") {
            return Ok(Self::Any);
        }

        origins
            .into_iter()
            .map(HeaderValue::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::List)
    }
}

pub fn layer(origin: &CorsOrigin) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    match origin {
        CorsOrigin::Any => cors.allow_origin(AllowOrigin::any()),
        CorsOrigin::List(origins) => cors
            .allow_origin(AllowOrigin::list(origins.iter().cloned()))
            .allow_credentials(true),
    }
}
