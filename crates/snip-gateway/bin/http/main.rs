mod cli;

use crate::cli::{DbType, CLI};
use anyhow::Context;
use clap::Parser;
use snip_gateway::{App, AppState, HttpOptions};
use snip_generator::RandomGenerator;
use snip_shortener::{ShortLinkFormat, ShortenerService};
use snip_storage::{
    DocumentRepository, DynamoDbRepository, InMemoryRepository, MySqlRepository,
    PostgresRepository, Repository, SqliteRepository,
};
use snip_telemetry::TelemetryConfig;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = CLI::parse();

    let _telemetry = snip_telemetry::init(
        &TelemetryConfig::builder()
            .service_name("snip")
            .log_format(config.log_format)
            .otlp_endpoint(config.otlp_endpoint.clone())
            .build(),
    )?;

    info!(
        host = %config.host,
        port = config.port,
        backend = %config.db_type,
        route = %config.short_link_route,
        "starting snip"
    );

    match config.db_type {
        DbType::Sqlite => {
            let repository = SqliteRepository::connect(&config.db_path)
                .await
                .with_context(|| {
                    format!("failed to open sqlite database {}", config.db_path.display())
                })?;
            run(&config, repository).await
        }
        DbType::Postgres => {
            let repository = PostgresRepository::connect(connection_string(&config)?)
                .await
                .context("failed to connect to postgres")?;
            run(&config, repository).await
        }
        DbType::Mysql => {
            let repository = MySqlRepository::connect(connection_string(&config)?)
                .await
                .context("failed to connect to mysql")?;
            run(&config, repository).await
        }
        DbType::ObjectStore => {
            let location = config
                .object_store_url
                .as_deref()
                .context("OBJECT_STORE_URL is required when DB_TYPE is object-store")?;
            let repository = DocumentRepository::connect(location)
                .await
                .with_context(|| format!("failed to open object store {location}"))?;
            run(&config, repository).await
        }
        DbType::DynamoDb => {
            let repository = DynamoDbRepository::connect(
                config.dynamodb_table.clone(),
                config.dynamodb_endpoint.as_deref(),
            )
            .await;
            run(&config, repository).await
        }
        DbType::InMemory => run(&config, InMemoryRepository::new()).await,
    }
}

fn connection_string(config: &CLI) -> anyhow::Result<&str> {
    config
        .db_connection_string
        .as_deref()
        .filter(|dsn| !dsn.is_empty())
        .with_context(|| {
            format!(
                "DB_CONNECTION_STRING is required when DB_TYPE is {}",
                config.db_type
            )
        })
}

async fn run<R: Repository>(config: &CLI, repository: R) -> anyhow::Result<()> {
    let links = ShortLinkFormat::new(config.base_url(), config.short_link_route);
    let service = ShortenerService::new(repository, RandomGenerator::new(), links);

    service
        .initialize()
        .await
        .with_context(|| format!("failed to initialize {} backend", config.db_type))?;
    info!(backend = %config.db_type, "storage initialized");

    if let Some(dir) = &config.static_dir {
        if !dir.join("index.html").is_file() {
            warn!(dir = %dir.display(), "static directory has no index.html");
        }
    }

    let options = HttpOptions::builder()
        .cors_origin(config.cors_origin.clone())
        .short_link_route(config.short_link_route)
        .static_dir(config.static_dir.clone())
        .build();
    let router = App::router(AppState::new(service.clone()), &options);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!(
        listen_addr = %listener.local_addr()?,
        base_url = %service.links().base_url(),
        "listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    service
        .shutdown()
        .await
        .context("failed to shut down storage backend")?;
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
