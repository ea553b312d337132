//! S3-compatible image storage
//!
//! Uses rust-s3 with path-style addressing so MinIO and hosted S3 both work.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::ObjectStore;
use crate::core::config::StorageConfig;
use crate::core::error::AppError;

pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    public_endpoint: String,
}

impl S3ObjectStore {
    /// Create the client and make sure the bucket exists
    pub async fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to open bucket: {}", e)))?;
        bucket.set_path_style();

        if let Err(e) = Bucket::create_with_path_style(
            &config.bucket,
            region,
            credentials,
            BucketConfiguration::default(),
        )
        .await
        {
            let message = e.to_string();
            if message.contains("BucketAlreadyOwnedByYou")
                || message.contains("BucketAlreadyExists")
            {
                debug!("Bucket '{}' already exists", config.bucket);
            } else {
                warn!(
                    "Could not create bucket '{}': {}. Assuming it exists.",
                    config.bucket, e
                );
            }
        }

        info!(
            "Image storage initialized for endpoint: {}, bucket: {}",
            config.endpoint, config.bucket
        );

        Ok(Self {
            bucket,
            public_endpoint: config.public_endpoint,
        })
    }

    pub fn public_url(&self, key: &str) -> String {
        public_url(&self.public_endpoint, &self.bucket.name(), key)
    }
}

fn public_url(endpoint: &str, bucket: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!(
        "{}/{}/{}",
        endpoint.trim_end_matches('/'),
        bucket,
        encoded.join("/")
    )
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to upload file '{}': {}", key, e)))?;

        debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete file '{}': {}", key, e)))?;

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_encodes_each_segment() {
        let url = public_url(
            "http://localhost:9000/",
            "complaint-images",
            "complaint_images/abc/1700000000000-burst pipe.jpg",
        );
        assert_eq!(
            url,
            "http://localhost:9000/complaint-images/complaint_images/abc/1700000000000-burst%20pipe.jpg"
        );
    }
}
