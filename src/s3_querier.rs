use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use bytes::Bytes;

use crate::error::{Error, Result};
use crate::summary::ResultStore;

pub struct S3Querier {
    client: Client,
}

impl S3Querier {
    /// Creates a new S3Querier.
    ///
    /// * `sdk_config` - Shared AWS configuration (region, credentials).
    /// * `endpoint` - An optional endpoint override (e.g. Some("http://127.0.0.1:9000")
    ///   to use a local S3-compatible service like MinIO).
    pub fn new(sdk_config: &SdkConfig, endpoint: Option<&str>) -> Self {
        let mut config = aws_sdk_s3::config::Builder::from(sdk_config);

        if let Some(ep) = endpoint {
            config = config.endpoint_url(ep).force_path_style(true);
        }

        S3Querier {
            client: Client::from_conf(config.build()),
        }
    }
}

#[async_trait]
impl ResultStore for S3Querier {
    /// Lists every object key under `prefix`, following continuation tokens.
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| Error::from_sdk("ListObjectsV2", err))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_owned),
            );
        }
        Ok(keys)
    }

    async fn read_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| Error::from_sdk("GetObject", err))?;

        let body = object
            .body
            .collect()
            .await
            .with_context(|| format!("failed to read s3://{}/{}", bucket, key))?;
        Ok(body.into_bytes())
    }
}
