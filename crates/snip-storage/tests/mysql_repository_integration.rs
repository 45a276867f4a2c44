use std::time::Duration;

use snip_core::ShortCode;
use snip_storage::{MySqlRepository, Repository, StorageError};
use snip_test_infra::mysql::{MySqlConfig, MySqlServer};
use sqlx::mysql::MySqlPoolOptions;

struct Fixture {
    _mysql: MySqlServer,
    repo: MySqlRepository,
}

impl Fixture {
    async fn start() -> Self {
        let mysql = MySqlServer::new(MySqlConfig::builder().build())
            .await
            .expect("start mysql");
        let url = mysql.database_url().await.expect("mysql url");
        let repo = MySqlRepository::new(connect_with_retry(&url).await);
        repo.initialize().await.expect("create schema");

        Self {
            _mysql: mysql,
            repo,
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::MySqlPool {
    let mut last_error = None;

    for _ in 0..20 {
        match MySqlPoolOptions::new().max_connections(5).connect(url).await {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect mysql: {last_error:?}");
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insert_and_get() {
    let fixture = Fixture::start().await;

    let created = fixture
        .repo
        .insert(&code("aB3x"), "https://example.com")
        .await
        .unwrap();

    let got = fixture.repo.get(&code("aB3x")).await.unwrap().unwrap();
    assert_eq!(got, created);
    assert!(fixture.repo.exists(&code("aB3x")).await.unwrap());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insert_conflicts_when_code_already_exists() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(&code("aB3x"), "https://one.example")
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert(&code("aB3x"), "https://two.example")
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn codes_differing_in_case_are_distinct() {
    let fixture = Fixture::start().await;

    fixture.repo.insert(&code("abcd"), "https://lower.example").await.unwrap();
    fixture.repo.insert(&code("ABCD"), "https://upper.example").await.unwrap();

    let upper = fixture.repo.get(&code("ABCD")).await.unwrap().unwrap();
    assert_eq!(upper.original_url, "https://upper.example");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn list_is_newest_first_and_initialize_is_idempotent() {
    let fixture = Fixture::start().await;
    fixture.repo.initialize().await.unwrap();

    fixture.repo.insert(&code("aaaa"), "https://a.example").await.unwrap();
    fixture.repo.insert(&code("bbbb"), "https://b.example").await.unwrap();

    let codes: Vec<_> = fixture
        .repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.short_code.to_string())
        .collect();
    assert_eq!(codes, ["bbbb", "aaaa"]);
}
