use crate::core::{RecordStore, StoredItem};
use crate::utils::error::PersistError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;

/// DynamoDB table written with one `PutItem` per record.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: DynamoDbClient,
    table: String,
    key_attribute: String,
}

impl DynamoDbStore {
    pub fn new(client: DynamoDbClient, table: String, key_attribute: String) -> Self {
        Self {
            client,
            table,
            key_attribute,
        }
    }

    /// Builds the single client used for the whole run.
    pub async fn connect(
        region: &str,
        endpoint_url: Option<&str>,
        table: String,
        key_attribute: String,
    ) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&shared);
        if let Some(url) = endpoint_url {
            builder = builder.endpoint_url(url);
        }
        let client = DynamoDbClient::from_conf(builder.build());

        tracing::info!("DynamoDB store ready: table {} in {}", table, region);
        Self::new(client, table, key_attribute)
    }
}

#[async_trait]
impl RecordStore for DynamoDbStore {
    async fn put_item(&self, key: &str, item: &StoredItem) -> Result<(), PersistError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item(&self.key_attribute, AttributeValue::S(key.to_string()))
            .item("name", AttributeValue::S(item.name.clone()))
            .item("age", AttributeValue::N(item.age.to_string()))
            .item("city", AttributeValue::S(item.city.clone()))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| PersistError::new(DisplayErrorContext(&e).to_string()))
    }
}
