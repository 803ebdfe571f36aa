use super::ObjectStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Object store backed by an S3 bucket
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from the default AWS credential chain for `region`
    pub async fn connect(bucket: &str, region: &str) -> Result<Self> {
        info!("Connecting to S3 bucket {} in {}", bucket, region);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Ok(Self {
            client: Client::new(&config),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn read_text(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        let output = match response {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false)
                {
                    return Ok(None);
                }
                return Err(err).with_context(|| format!("Failed to get s3://{}/{}", self.bucket, key));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .with_context(|| format!("Failed to read body of s3://{}/{}", self.bucket, key))?
            .into_bytes();

        let text = String::from_utf8(bytes.to_vec())
            .with_context(|| format!("s3://{}/{} is not UTF-8", self.bucket, key))?;
        Ok(Some(text))
    }

    async fn write_text(&self, key: &str, text: &str) -> Result<()> {
        let content_type = if key.ends_with(".json") {
            "application/json"
        } else {
            "text/plain; charset=utf-8"
        };

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(text.as_bytes().to_vec()))
            .send()
            .await
            .with_context(|| format!("Failed to put s3://{}/{}", self.bucket, key))?;

        debug!("Uploaded s3://{}/{} ({} bytes)", self.bucket, key, text.len());
        Ok(())
    }

    async fn delete_key(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to delete s3://{}/{}", self.bucket, key))?;
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page
                .with_context(|| format!("Failed to list s3://{}/{}", self.bucket, prefix))?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.insert(key.to_string());
                }
            }
        }

        Ok(keys)
    }

    fn describe(&self) -> String {
        format!("S3 bucket {}", self.bucket)
    }
}
