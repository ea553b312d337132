pub mod access;
mod complaint_service;
mod image_service;

pub use complaint_service::ComplaintService;
pub use image_service::{ComplaintImageService, ImageUpload};
