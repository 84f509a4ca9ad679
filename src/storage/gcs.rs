use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use eyre::eyre;
use object_store::{
    gcp::GoogleCloudStorageBuilder, path::Path as ObjectPath, MultipartUpload, ObjectStore,
};
use tracing::{debug, info, warn};

use super::Storage;
use crate::config::Config;
use crate::error::ConfigError;

const PART_SIZE: usize = 10 * 1024 * 1024;

/// Firebase storage bucket, reached through the Google Cloud Storage API.
#[derive(Clone)]
pub struct GcsStorage {
    bucket_name: String,
    store: Arc<dyn ObjectStore>,
    part_size: usize,
}

impl GcsStorage {
    pub fn new(store: Arc<dyn ObjectStore>, bucket_name: &str) -> Self {
        GcsStorage {
            bucket_name: bucket_name.to_owned(),
            store,
            part_size: PART_SIZE,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let credential = config.active_credential();
        info!(
            "Initializing storage client for bucket {} as {} ({})",
            config.bucket_name, credential.client_email, config.environment
        );

        let store = GoogleCloudStorageBuilder::new()
            .with_bucket_name(&config.bucket_name)
            .with_service_account_key(credential.raw_json())
            .build()
            .map_err(|e| ConfigError::StorageClient {
                bucket: config.bucket_name.clone(),
                message: e.to_string(),
            })?;

        Ok(GcsStorage::new(Arc::new(store), &config.bucket_name))
    }

    #[cfg(test)]
    fn with_part_size(mut self, part_size: usize) -> Self {
        self.part_size = part_size;
        self
    }

    async fn upload_in_parts(&self, path: &ObjectPath, data: Bytes) -> eyre::Result<()> {
        let mut upload = self
            .store
            .put_multipart(path)
            .await
            .map_err(|e| eyre!("Could not start multipart upload of {}: {}", path, e))?;

        let mut offset = 0;
        let mut part_number = 0;
        while offset < data.len() {
            let end = usize::min(offset + self.part_size, data.len());
            debug!("Uploading part {} of {} ({} bytes)", part_number, path, end - offset);

            if let Err(e) = upload.put_part(data.slice(offset..end).into()).await {
                if let Err(abort_err) = upload.abort().await {
                    warn!("Could not abort multipart upload of {}: {}", path, abort_err);
                }
                return Err(eyre!("Could not upload part {} of {}: {}", part_number, path, e));
            }

            offset = end;
            part_number += 1;
        }

        upload
            .complete()
            .await
            .map_err(|e| eyre!("Could not complete multipart upload of {}: {}", path, e))?;
        Ok(())
    }
}

#[async_trait]
impl Storage for GcsStorage {
    async fn upload(&self, destination: &str, data: Bytes) -> eyre::Result<()> {
        let path = ObjectPath::parse(destination)
            .map_err(|e| eyre!("Invalid object path {}: {}", destination, e))?;

        if data.len() > self.part_size {
            return self.upload_in_parts(&path, data).await;
        }

        match self.store.put(&path, data.into()).await {
            Ok(_) => Ok(()),
            Err(e) => Err(eyre!("Could not upload file {}", e)),
        }
    }

    fn location(&self) -> String {
        format!("gs://{}", self.bucket_name)
    }
}
