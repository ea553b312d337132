use std::sync::Arc;

use chrono::Utc;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::complaints::models::{ComplaintImage, COMPLAINT_IMAGE_COLUMNS};
use crate::features::complaints::services::access;
use crate::features::realtime::models::ChangeKind;
use crate::features::realtime::ChangeFeed;
use crate::modules::storage::ObjectStore;
use crate::shared::constants::{
    COMPLAINT_IMAGES_PREFIX, MAX_IMAGES_PER_COMPLAINT, MAX_IMAGE_SIZE_BYTES,
};

/// One file read from a multipart upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Only images up to the size limit are accepted
    pub fn check(&self) -> Result<()> {
        if !self.content_type.starts_with("image/") {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed. Only images can be attached",
                self.content_type
            )));
        }

        if self.data.is_empty() {
            return Err(AppError::BadRequest(format!(
                "File '{}' is empty",
                self.file_name
            )));
        }

        if self.data.len() > MAX_IMAGE_SIZE_BYTES {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} MB",
                MAX_IMAGE_SIZE_BYTES / 1024 / 1024
            )));
        }

        Ok(())
    }
}

/// Object key: `complaint_images/{complaint_id}/{millis}-{filename}`
pub fn image_key(complaint_id: Uuid, millis: i64, file_name: &str) -> String {
    let name: String = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = if name.trim_matches('.').is_empty() {
        "image".to_string()
    } else {
        name
    };

    format!(
        "{}/{}/{}-{}",
        COMPLAINT_IMAGES_PREFIX, complaint_id, millis, name
    )
}

/// Rejects a batch that would push a complaint past the image limit
fn ensure_capacity(existing: i64, adding: usize) -> Result<()> {
    if existing + adding as i64 > MAX_IMAGES_PER_COMPLAINT {
        return Err(AppError::BadRequest(format!(
            "A complaint can have at most {} images",
            MAX_IMAGES_PER_COMPLAINT
        )));
    }
    Ok(())
}

/// An object already written to the bucket but not yet recorded
#[derive(Debug)]
struct StoredObject {
    key: String,
    url: String,
}

/// Service for complaint image attachments
pub struct ComplaintImageService {
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
    feed: Arc<ChangeFeed>,
}

impl ComplaintImageService {
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>, feed: Arc<ChangeFeed>) -> Self {
        Self { pool, store, feed }
    }

    /// Store each file in the bucket and record its public URL.
    ///
    /// Either every file is attached or none is: objects written before a
    /// failure are removed from the bucket again.
    pub async fn upload(
        &self,
        user: &AuthenticatedUser,
        complaint_id: Uuid,
        uploads: Vec<ImageUpload>,
    ) -> Result<Vec<ComplaintImage>> {
        let complaint = access::load(&self.pool, complaint_id).await?;
        access::ensure_can_view(user, &complaint, complaint_id)?;

        // Early rejection before anything is written to the bucket
        let existing = Self::count(&self.pool, complaint_id).await?;
        ensure_capacity(existing, uploads.len())?;

        let stored = self.store_objects(complaint_id, uploads).await?;
        let images = match self.record(complaint_id, &stored).await {
            Ok(images) => images,
            Err(e) => {
                self.discard(&stored).await;
                return Err(e);
            }
        };

        for image in &images {
            self.feed.publish_record(
                "complaint_images",
                ChangeKind::Insert,
                image.id.to_string(),
                image,
            );
        }

        tracing::info!(
            "Attached {} images to complaint {}",
            images.len(),
            complaint_id
        );
        Ok(images)
    }

    async fn count<'e, E>(executor: E, complaint_id: Uuid) -> Result<i64>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM complaint_images WHERE complaint_id = $1")
            .bind(complaint_id)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count complaint images: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn store_objects(
        &self,
        complaint_id: Uuid,
        uploads: Vec<ImageUpload>,
    ) -> Result<Vec<StoredObject>> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let key = image_key(complaint_id, Utc::now().timestamp_millis(), &upload.file_name);
            match self
                .store
                .upload(&key, upload.data, &upload.content_type)
                .await
            {
                Ok(url) => stored.push(StoredObject { key, url }),
                Err(e) => {
                    self.discard(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    /// Count and insert under a lock on the complaint row so concurrent
    /// uploads cannot both pass the limit
    async fn record(
        &self,
        complaint_id: Uuid,
        stored: &[StoredObject],
    ) -> Result<Vec<ComplaintImage>> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("SELECT id FROM complaints WHERE id = $1 FOR UPDATE")
            .bind(complaint_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock complaint: {:?}", e);
                AppError::Database(e)
            })?;

        let existing = Self::count(&mut *tx, complaint_id).await?;
        ensure_capacity(existing, stored.len())?;

        let query = format!(
            "INSERT INTO complaint_images (complaint_id, image_url)
             VALUES ($1, $2)
             RETURNING {}",
            COMPLAINT_IMAGE_COLUMNS
        );
        let mut images = Vec::with_capacity(stored.len());
        for object in stored {
            let image = sqlx::query_as::<_, ComplaintImage>(&query)
                .bind(complaint_id)
                .bind(&object.url)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to record complaint image: {:?}", e);
                    AppError::Database(e)
                })?;
            images.push(image);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(images)
    }

    async fn discard(&self, stored: &[StoredObject]) {
        for object in stored {
            if let Err(e) = self.store.delete(&object.key).await {
                tracing::warn!("Orphaned object '{}' left in bucket: {}", object.key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::lazy_pool;
    use std::sync::Mutex;

    /// Accepts uploads until `fail_at`, and remembers what was written and removed
    struct RecordingStore {
        fail_at: usize,
        uploaded: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl ObjectStore for RecordingStore {
        async fn upload(
            &self,
            key: &str,
            _data: Vec<u8>,
            _content_type: &str,
        ) -> std::result::Result<String, AppError> {
            let mut uploaded = self.uploaded.lock().unwrap();
            if uploaded.len() == self.fail_at {
                return Err(AppError::ExternalServiceError("bucket unavailable".into()));
            }
            uploaded.push(key.to_string());
            Ok(format!("http://bucket/{}", key))
        }

        async fn delete(&self, key: &str) -> std::result::Result<(), AppError> {
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    fn service_with(store: Arc<RecordingStore>) -> ComplaintImageService {
        ComplaintImageService::new(lazy_pool(), store, Arc::new(ChangeFeed::default()))
    }

    fn upload(content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            file_name: "photo.jpg".to_string(),
            content_type: content_type.to_string(),
            data: vec![0u8; size],
        }
    }

    #[test]
    fn test_only_images_within_limit_pass() {
        assert!(upload("image/jpeg", 1024).check().is_ok());
        assert!(upload("image/png", MAX_IMAGE_SIZE_BYTES).check().is_ok());
        assert!(upload("application/pdf", 1024).check().is_err());
        assert!(upload("image/png", MAX_IMAGE_SIZE_BYTES + 1).check().is_err());
        assert!(upload("image/png", 0).check().is_err());
    }

    #[test]
    fn test_image_key_layout() {
        let id = Uuid::now_v7();
        assert_eq!(
            image_key(id, 1700000000000, "pothole.jpg"),
            format!("complaint_images/{}/1700000000000-pothole.jpg", id)
        );
    }

    #[test]
    fn test_image_key_sanitizes_file_name() {
        let id = Uuid::now_v7();
        assert!(image_key(id, 1, "../../etc/my photo (1).png").ends_with("/1-my_photo__1_.png"));
        assert!(image_key(id, 1, "..").ends_with("/1-image"));
        assert!(image_key(id, 1, "").ends_with("/1-image"));
    }

    #[test]
    fn test_capacity_counts_existing_images() {
        assert!(ensure_capacity(0, MAX_IMAGES_PER_COMPLAINT as usize).is_ok());
        assert!(ensure_capacity(MAX_IMAGES_PER_COMPLAINT - 1, 1).is_ok());
        assert!(ensure_capacity(MAX_IMAGES_PER_COMPLAINT - 1, 2).is_err());
        assert!(ensure_capacity(MAX_IMAGES_PER_COMPLAINT, 1).is_err());
    }

    #[tokio::test]
    async fn test_failed_upload_removes_earlier_objects() {
        let store = Arc::new(RecordingStore {
            fail_at: 2,
            uploaded: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        });
        let service = service_with(store.clone());
        let files = vec![
            upload("image/jpeg", 8),
            upload("image/jpeg", 8),
            upload("image/jpeg", 8),
        ];

        let result = service.store_objects(Uuid::now_v7(), files).await;

        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
        let uploaded = store.uploaded.lock().unwrap().clone();
        assert_eq!(uploaded.len(), 2);
        assert_eq!(*store.deleted.lock().unwrap(), uploaded);
    }

    #[tokio::test]
    async fn test_successful_uploads_are_kept() {
        let store = Arc::new(RecordingStore {
            fail_at: usize::MAX,
            uploaded: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        });
        let service = service_with(store.clone());

        let stored = service
            .store_objects(Uuid::now_v7(), vec![upload("image/png", 8)])
            .await
            .unwrap();

        assert_eq!(stored.len(), 1);
        assert!(stored[0].url.starts_with("http://bucket/complaint_images/"));
        assert!(store.deleted.lock().unwrap().is_empty());
    }
}
