use snip_core::ShortCode;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Where short links are served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShortLinkRoute {
    /// `{base}/api/{code}`
    #[default]
    Api,
    /// `{base}/{code}`
    Root,
}

#[derive(Debug, Clone, Error)]
#[error("unknown short link route '{0}', expected 'api' or 'root'")]
pub struct ParseShortLinkRouteError(String);

impl FromStr for ShortLinkRoute {
    type Err = ParseShortLinkRouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "root" => Ok(Self::Root),
            _ => Err(ParseShortLinkRouteError(s.to_owned())),
        }
    }
}

impl Display for ShortLinkRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api => f.write_str("api"),
            Self::Root => f.write_str("root"),
        }
    }
}

/// Composes absolute short links from a public base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLinkFormat {
    base_url: String,
    route: ShortLinkRoute,
}

impl ShortLinkFormat {
    pub fn new(base_url: impl Into<String>, route: ShortLinkRoute) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, route }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn route(&self) -> ShortLinkRoute {
        self.route
    }

    pub fn link(&self, code: &ShortCode) -> String {
        match self.route {
            ShortLinkRoute::Api => code.to_url(&format!("{}/api", self.base_url)),
            ShortLinkRoute::Root => code.to_url(&self.base_url),
        }
    }
}
