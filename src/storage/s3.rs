//! AWS S3 watermark store.
//!
//! Stores the watermark document at `s3://{bucket}/{key}`.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::models::Watermark;
use crate::storage::StateStore;

/// S3-backed watermark store.
pub struct S3StateStore {
    client: Client,
    bucket: String,
    key: String,
}

impl S3StateStore {
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create the store from `STATE_S3_BUCKET` and `STATE_S3_KEY`.
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let bucket = std::env::var("STATE_S3_BUCKET")
            .map_err(|_| AppError::config("STATE_S3_BUCKET is not set"))?;
        let key = std::env::var("STATE_S3_KEY").unwrap_or_else(|_| "hotdeal/state.json".to_string());

        Ok(Self::new(client, bucket, key))
    }
}

#[async_trait]
impl StateStore for S3StateStore {
    async fn load(&self) -> Result<Option<Watermark>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::S3(e.to_string()))?;
                let watermark = serde_json::from_slice(&bytes.into_bytes())
                    .map_err(|e| AppError::state(format!("corrupt state at {}: {e}", self.location())))?;
                Ok(Some(watermark))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::info!("No existing state at {}", self.location());
                    Ok(None)
                } else {
                    Err(AppError::S3(service_err.to_string()))
                }
            }
        }
    }

    async fn save(&self, watermark: &Watermark) -> Result<()> {
        let json = serde_json::to_string_pretty(watermark)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(json.into_bytes()))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::state(format!("failed to write {}: {e}", self.location())))?;

        log::info!("Saved watermark {} to {}", watermark.last_seen_id, self.location());
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
