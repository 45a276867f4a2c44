use crate::Result;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const PORT: u16 = 8000;

#[derive(TypedBuilder)]
pub struct DynamoDbLocalConfig {
    #[builder(default = "2.5.2".to_string())]
    tag: String,
}

/// Test fixture for DynamoDB Local running in memory.
///
/// DynamoDB Local accepts any credentials; clients still need some set and a
/// region configured.
pub struct DynamoDbLocal {
    container: ContainerAsync<GenericImage>,
}

impl DynamoDbLocal {
    pub async fn new(config: DynamoDbLocalConfig) -> Result<Self> {
        let container = GenericImage::new("amazon/dynamodb-local", config.tag.as_str())
            .with_exposed_port(PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Initializing DynamoDB Local"))
            .start()
            .await?;

        Ok(Self { container })
    }

    /// The `http://host:port` endpoint to hand to the SDK.
    pub async fn endpoint(&self) -> Result<String> {
        let host = self.container.get_host().await?;
        let port = self.container.get_host_port_ipv4(PORT).await?;
        Ok(format!("http://{host}:{port}"))
    }
}
