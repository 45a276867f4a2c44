use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use snip_core::{ExpandedUrl, ListedUrl, ShortenedUrl};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub success: bool,
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
}

impl From<ShortenedUrl> for ShortenResponse {
    fn from(value: ShortenedUrl) -> Self {
        Self {
            success: true,
            short_code: value.short_code.to_string(),
            original_url: value.original_url,
            short_url: value.short_url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandResponse {
    pub success: bool,
    pub short_code: String,
    pub original_url: String,
    pub created_at: Timestamp,
}

impl From<ExpandedUrl> for ExpandResponse {
    fn from(value: ExpandedUrl) -> Self {
        Self {
            success: true,
            short_code: value.short_code.to_string(),
            original_url: value.original_url,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlItem {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub created_at: Timestamp,
}

impl From<ListedUrl> for UrlItem {
    fn from(value: ListedUrl) -> Self {
        Self {
            short_code: value.short_code.to_string(),
            original_url: value.original_url,
            short_url: value.short_url,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub urls: Vec<UrlItem>,
}

/// Query string of redirect routes. `?format=json` answers with the target
/// instead of redirecting.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub format: Option<String>,
}

impl RedirectQuery {
    pub fn wants_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("json"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectTarget {
    pub original_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use snip_core::ShortCode;

    #[test]
    fn responses_use_camel_case() {
        let response = ShortenResponse::from(ShortenedUrl {
            short_code: ShortCode::new_unchecked("aB3x"),
            original_url: "https://example.com".into(),
            short_url: "http://localhost:3000/api/aB3x".into(),
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "shortCode": "aB3x",
                "originalUrl": "https://example.com",
                "shortUrl": "http://localhost:3000/api/aB3x",
            })
        );
    }

    #[test]
    fn created_at_serializes_as_rfc3339() {
        let created_at: Timestamp = "2024-05-01T12:30:00Z".parse().unwrap();
        let item = UrlItem {
            short_code: "aB3x".into(),
            original_url: "https://example.com".into(),
            short_url: "http://localhost:3000/api/aB3x".into(),
            created_at,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn format_query_is_case_insensitive() {
        let query = RedirectQuery {
            format: Some("JSON".into()),
        };
        assert!(query.wants_json());
        assert!(!RedirectQuery::default().wants_json());
    }
}
