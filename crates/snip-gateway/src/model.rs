mod health;
mod url;

pub use self::health::HealthResponse;
pub use self::url::{
    ExpandResponse, ListResponse, RedirectQuery, RedirectTarget, ShortenRequest, ShortenResponse,
    UrlItem,
};

use serde::Serialize;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
