//! Storage module for complaint images
//!
//! Wraps an S3-compatible bucket behind the [`ObjectStore`] trait so the
//! complaint service can be exercised without a live bucket.

mod s3_store;

pub use s3_store::S3ObjectStore;

use crate::core::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key` and return the public URL of the object
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<String, AppError>;

    /// Remove an object; used to roll back an upload whose row insert failed
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
