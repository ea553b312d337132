use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::complaints::dtos::CreateComplaintDto;
use crate::features::complaints::services::{
    ComplaintImageService, ComplaintService, ImageUpload,
};
use crate::features::profiles::ProfileService;

pub const COMPLAINT_TITLE: &str = "WhatsApp complaint";
pub const COMPLAINT_CATEGORY: &str = "Other";
const EMPTY_DESCRIPTION: &str = "No description provided";

/// A complete complaint collected over WhatsApp
#[derive(Debug, Clone)]
pub struct Submission {
    pub phone: String,
    pub sender_name: Option<String>,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: ImageUpload,
}

impl Submission {
    /// The complaint as a citizen would have submitted it through the API
    pub fn complaint(&self) -> CreateComplaintDto {
        let description = self.description.trim();
        CreateComplaintDto {
            title: COMPLAINT_TITLE.to_string(),
            description: if description.is_empty() {
                EMPTY_DESCRIPTION.to_string()
            } else {
                description.to_string()
            },
            category: COMPLAINT_CATEGORY.to_string(),
            location: format!("{}, {}", self.latitude, self.longitude),
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
            phone_number: Some(self.phone.clone()),
            priority: None,
        }
    }
}

/// Registers complaints collected over a messaging channel
#[async_trait]
pub trait ComplaintIntake: Send + Sync {
    /// Store the complaint and its image; returns the complaint id
    async fn submit(&self, submission: Submission) -> Result<Uuid>;
}

/// Files messaging submissions through the regular complaint services
pub struct DeskIntake {
    profiles: Arc<ProfileService>,
    complaints: Arc<ComplaintService>,
    images: Arc<ComplaintImageService>,
}

impl DeskIntake {
    pub fn new(
        profiles: Arc<ProfileService>,
        complaints: Arc<ComplaintService>,
        images: Arc<ComplaintImageService>,
    ) -> Self {
        Self {
            profiles,
            complaints,
            images,
        }
    }
}

#[async_trait]
impl ComplaintIntake for DeskIntake {
    async fn submit(&self, submission: Submission) -> Result<Uuid> {
        let dto = submission.complaint();
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let profile = self
            .profiles
            .ensure_phone_profile(&submission.phone, submission.sender_name.as_deref())
            .await?;
        let user = AuthenticatedUser::new(profile.id, profile.role);

        let complaint = self.complaints.create(&user, dto).await?;

        // The complaint stands even when the photo cannot be stored
        let image = submission.image;
        let attached = match image.check() {
            Ok(()) => self
                .images
                .upload(&user, complaint.id, vec![image])
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = attached {
            tracing::warn!(
                "Image for WhatsApp complaint {} was not stored: {}",
                complaint.id,
                e
            );
        }

        Ok(complaint.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(description: &str) -> Submission {
        Submission {
            phone: "919812345678".to_string(),
            sender_name: Some("Asha".to_string()),
            description: description.to_string(),
            latitude: 28.6139,
            longitude: 77.209,
            image: ImageUpload {
                file_name: "whatsapp.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                data: vec![1, 2, 3],
            },
        }
    }

    #[test]
    fn test_complaint_from_submission() {
        let dto = submission("  Overflowing drain near market ").complaint();

        assert_eq!(dto.title, "WhatsApp complaint");
        assert_eq!(dto.description, "Overflowing drain near market");
        assert_eq!(dto.category, "Other");
        assert_eq!(dto.location, "28.6139, 77.209");
        assert_eq!(dto.latitude, Some(28.6139));
        assert_eq!(dto.phone_number.as_deref(), Some("919812345678"));
        assert!(dto.priority.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_blank_description_gets_placeholder() {
        let dto = submission("   ").complaint();
        assert_eq!(dto.description, "No description provided");
        assert!(dto.validate().is_ok());
    }
}
