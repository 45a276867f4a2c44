//! Cloud table backend on DynamoDB.
//!
//! The table is keyed by `short_code` (string hash key, no sort key).
//! Uniqueness comes from a conditional put on `attribute_not_exists`.

use crate::sql;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use snip_core::repository::{sort_newest_first, Repository, Result};
use snip_core::{MappingId, ShortCode, StorageError, UrlMapping};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

const KEY: &str = "short_code";
const ORIGINAL_URL: &str = "original_url";
const CREATED_AT: &str = "created_at";

const ACTIVE_POLL_INTERVAL: Duration = Duration::from_millis(500);
const ACTIVE_POLL_ATTEMPTS: usize = 60;

type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Clone)]
pub struct DynamoDbRepository {
    client: Client,
    table: String,
}

impl DynamoDbRepository {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Loads AWS configuration from the environment. `endpoint` overrides the
    /// service URL, e.g. to point at DynamoDB Local.
    pub async fn connect(table: impl Into<String>, endpoint: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;
        Self::new(Client::new(&config), table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn create_table(&self) -> Result<()> {
        let attribute = AttributeDefinition::builder()
            .attribute_name(KEY)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| StorageError::Operation(e.to_string()))?;
        let key = KeySchemaElement::builder()
            .attribute_name(KEY)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| StorageError::Operation(e.to_string()))?;

        let created = self
            .client
            .create_table()
            .table_name(&self.table)
            .attribute_definitions(attribute)
            .key_schema(key)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await;

        match created {
            Ok(_) => {
                info!(table = %self.table, "created dynamodb table");
                Ok(())
            }
            // Another instance won the race to create it.
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_in_use_exception()) =>
            {
                Ok(())
            }
            Err(err) => Err(map_sdk_error(err)),
        }
    }

    async fn wait_until_active(&self) -> Result<()> {
        for _ in 0..ACTIVE_POLL_ATTEMPTS {
            let output = self
                .client
                .describe_table()
                .table_name(&self.table)
                .send()
                .await
                .map_err(map_sdk_error)?;

            let status = output.table().and_then(|t| t.table_status());
            if matches!(status, Some(TableStatus::Active)) {
                return Ok(());
            }
            debug!(table = %self.table, ?status, "waiting for table to become active");
            tokio::time::sleep(ACTIVE_POLL_INTERVAL).await;
        }

        Err(StorageError::Timeout(format!(
            "table '{}' did not become active",
            self.table
        )))
    }
}

fn mapping_to_item(mapping: &UrlMapping) -> Item {
    HashMap::from([
        (
            KEY.to_owned(),
            AttributeValue::S(mapping.short_code.to_string()),
        ),
        (
            ORIGINAL_URL.to_owned(),
            AttributeValue::S(mapping.original_url.clone()),
        ),
        (
            CREATED_AT.to_owned(),
            AttributeValue::N(mapping.created_at.as_microsecond().to_string()),
        ),
    ])
}

fn item_to_mapping(item: &Item) -> Result<UrlMapping> {
    let short_code = string_attr(item, KEY)?;
    let original_url = string_attr(item, ORIGINAL_URL)?;
    let micros = item
        .get(CREATED_AT)
        .and_then(|value| value.as_n().ok())
        .and_then(|n| n.parse::<i64>().ok())
        .ok_or_else(|| {
            StorageError::InvalidData(format!("missing or non-numeric attribute '{CREATED_AT}'"))
        })?;

    Ok(UrlMapping {
        id: Some(MappingId::Key(short_code.to_owned())),
        short_code: ShortCode::new_unchecked(short_code),
        original_url: original_url.to_owned(),
        created_at: sql::parse_created_at(micros)?,
    })
}

fn string_attr<'a>(item: &'a Item, name: &str) -> Result<&'a str> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| StorageError::InvalidData(format!("missing or non-string attribute '{name}'")))
}

fn map_sdk_error<E, R>(err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();

    match err {
        SdkError::TimeoutError(_) => StorageError::Timeout(message),
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StorageError::Unavailable(message)
        }
        SdkError::ConstructionFailure(_) => StorageError::Operation(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Repository for DynamoDbRepository {
    #[instrument(skip(self), fields(table = %self.table))]
    async fn initialize(&self) -> Result<()> {
        let described = self
            .client
            .describe_table()
            .table_name(&self.table)
            .send()
            .await;

        match described {
            Ok(_) => {}
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                self.create_table().await?;
            }
            Err(err) => return Err(map_sdk_error(err)),
        }

        self.wait_until_active().await
    }

    #[instrument(skip(self, original_url), fields(code = %code))]
    async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<UrlMapping> {
        let mapping = UrlMapping {
            id: Some(MappingId::Key(code.to_string())),
            short_code: code.clone(),
            original_url: original_url.to_owned(),
            created_at: sql::now(),
        };

        let put = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(mapping_to_item(&mapping)))
            .condition_expression("attribute_not_exists(#key)")
            .expression_attribute_names("#key", KEY)
            .send()
            .await;

        match put {
            Ok(_) => Ok(mapping),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Err(StorageError::Conflict(code.to_string()))
            }
            Err(err) => Err(map_sdk_error(err)),
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY, AttributeValue::S(code.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(map_sdk_error)?;

        output.item().map(item_to_mapping).transpose()
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        let mut items = self
            .client
            .scan()
            .table_name(&self.table)
            .consistent_read(true)
            .into_paginator()
            .items()
            .send();

        let mut mappings = Vec::new();
        while let Some(item) = items.next().await {
            let item = item.map_err(map_sdk_error)?;
            mappings.push(item_to_mapping(&item)?);
        }

        sort_newest_first(&mut mappings);
        Ok(mappings)
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY, AttributeValue::S(code.to_string()))
            .projection_expression("#key")
            .expression_attribute_names("#key", KEY)
            .consistent_read(true)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output.item().is_some())
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
