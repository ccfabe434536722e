use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{StatusCode, header};
use serde_json::json;
use tracing::debug;

use super::{ObjectStore, StorageError, check_key};

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes each segment of an object key, keeping the `/` separators.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|seg| utf8_percent_encode(seg, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Supabase Storage over its REST API.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, bucket: &str, service_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            encode_key(key)
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    async fn check(response: reqwest::Response, key: &str) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(key.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Status { status, body })
    }
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        check_key(key)?;
        debug!("Uploading {} ({} bytes) to bucket {}", key, data.len(), self.bucket);
        let response = self
            .authorized(self.client.post(self.object_url(key)))
            .header(
                header::CONTENT_TYPE,
                content_type.unwrap_or("application/octet-stream"),
            )
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;
        Self::check(response, key).await?;
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        check_key(key)?;
        let response = self
            .authorized(self.client.get(self.object_url(key)))
            .send()
            .await?;
        let bytes = Self::check(response, key).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let response = self
            .authorized(self.client.delete(url))
            .json(&json!({ "prefixes": [key] }))
            .send()
            .await?;
        Self::check(response, key).await?;
        Ok(())
    }

    fn public_prefix(&self) -> String {
        format!("{}/storage/v1/object/public/{}", self.base_url, self.bucket)
    }
}
