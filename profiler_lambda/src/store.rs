use aws_sdk_dynamodb::{Client as DynamoDbClient, types::AttributeValue};
use thiserror::Error;
use types::VideoRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),
}

/// Keyed lookup of the metadata stored for a video.
pub trait MetadataStore {
    fn get(
        &self,
        guid: &str,
    ) -> impl Future<Output = Result<Option<VideoRecord>, StoreError>> + Send;
}

#[derive(Debug, Clone)]
pub struct DynamoDbMetadataStore {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoDbMetadataStore {
    #[must_use]
    pub const fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

impl MetadataStore for DynamoDbMetadataStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, guid: &str) -> Result<Option<VideoRecord>, StoreError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("guid", AttributeValue::S(guid.to_string()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    "DynamoDB GetItem error for {} in {}: {:?}",
                    guid,
                    self.table_name,
                    e
                );
                StoreError::DynamoDb(e.to_string())
            })?;

        Ok(response.item.map(VideoRecord::from))
    }
}
