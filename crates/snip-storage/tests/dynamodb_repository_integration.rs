use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use snip_core::{MappingId, ShortCode};
use snip_storage::{DynamoDbRepository, Repository, StorageError};
use snip_test_infra::dynamodb::{DynamoDbLocal, DynamoDbLocalConfig};

struct Fixture {
    _dynamodb: DynamoDbLocal,
    repo: DynamoDbRepository,
}

impl Fixture {
    async fn start() -> Self {
        let dynamodb = DynamoDbLocal::new(DynamoDbLocalConfig::builder().build())
            .await
            .expect("start dynamodb local");
        let endpoint = dynamodb.endpoint().await.expect("dynamodb endpoint");

        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("local", "local", None, None, "test"))
            .endpoint_url(endpoint)
            .build();
        let repo = DynamoDbRepository::new(aws_sdk_dynamodb::Client::from_conf(config), "urls");
        repo.initialize().await.expect("create table");

        Self {
            _dynamodb: dynamodb,
            repo,
        }
    }
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
    assert_eq!(created.id, Some(MappingId::Key("aB3x".into())));

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
async fn initialize_reuses_existing_table() {
    let fixture = Fixture::start().await;
    fixture.repo.insert(&code("keep"), "https://example.com").await.unwrap();

    fixture.repo.initialize().await.unwrap();

    assert!(fixture.repo.exists(&code("keep")).await.unwrap());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn list_is_newest_first() {
    let fixture = Fixture::start().await;

    fixture.repo.insert(&code("aaaa"), "https://a.example").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
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
