use clap::{Parser, ValueEnum};
use snip_gateway::CorsOrigin;
use snip_shortener::ShortLinkRoute;
use snip_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const CORS_ORIGIN_ENV: &str = "CORS_ORIGIN";
pub const SHORT_LINK_ROUTE_ENV: &str = "SHORT_LINK_ROUTE";
pub const STATIC_DIR_ENV: &str = "STATIC_DIR";
pub const DB_TYPE_ENV: &str = "DB_TYPE";
pub const DB_PATH_ENV: &str = "DB_PATH";
pub const DB_CONNECTION_STRING_ENV: &str = "DB_CONNECTION_STRING";
pub const OBJECT_STORE_URL_ENV: &str = "OBJECT_STORE_URL";
pub const DYNAMODB_TABLE_ENV: &str = "DYNAMODB_TABLE";
pub const DYNAMODB_ENDPOINT_ENV: &str = "DYNAMODB_ENDPOINT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_PATH: &str = "./urls.db";
pub const DEFAULT_DYNAMODB_TABLE: &str = "urls";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DbType {
    #[value(name = "sqlite", alias = "embedded-file")]
    Sqlite,
    #[value(name = "postgres", aliases = ["postgresql", "relational"])]
    Postgres,
    #[value(name = "mysql")]
    Mysql,
    #[value(name = "object-store", alias = "cloud-document")]
    ObjectStore,
    #[value(name = "dynamodb", alias = "cloud-table")]
    DynamoDb,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for DbType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::Sqlite => write!(f, "sqlite"),
            DbType::Postgres => write!(f, "postgres"),
            DbType::Mysql => write!(f, "mysql"),
            DbType::ObjectStore => write!(f, "object-store"),
            DbType::DynamoDb => write!(f, "dynamodb"),
            DbType::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snip", about = "URL shortener HTTP server")]
pub struct CLI {
    #[arg(long, env = HOST_ENV, default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Public prefix of short links. Defaults to `http://localhost:{port}`.
    #[arg(long, env = BASE_URL_ENV)]
    pub base_url: Option<String>,

    /// `*` or a comma-separated list of origins.
    #[arg(long, env = CORS_ORIGIN_ENV, default_value = "*")]
    pub cors_origin: CorsOrigin,

    /// `api` serves links at `/api/{code}`; `root` also at `/{code}`.
    #[arg(long, env = SHORT_LINK_ROUTE_ENV, default_value_t = ShortLinkRoute::Api)]
    pub short_link_route: ShortLinkRoute,

    #[arg(long, env = STATIC_DIR_ENV)]
    pub static_dir: Option<PathBuf>,

    #[arg(long, env = DB_TYPE_ENV, value_enum, default_value_t = DbType::Sqlite)]
    pub db_type: DbType,

    #[arg(long, env = DB_PATH_ENV, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    #[arg(long, env = DB_CONNECTION_STRING_ENV)]
    pub db_connection_string: Option<String>,

    /// `s3://bucket/prefix`, `az://container/prefix`, `file:///dir` or `memory://`.
    #[arg(long, env = OBJECT_STORE_URL_ENV)]
    pub object_store_url: Option<String>,

    #[arg(long, env = DYNAMODB_TABLE_ENV, default_value = DEFAULT_DYNAMODB_TABLE)]
    pub dynamodb_table: String,

    #[arg(long, env = DYNAMODB_ENDPOINT_ENV)]
    pub dynamodb_endpoint: Option<String>,

    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[arg(long = "otlp-endpoint", env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }
}
