/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// COMPLAINT IMAGES
// =============================================================================

/// Key prefix for complaint images inside the storage bucket
pub const COMPLAINT_IMAGES_PREFIX: &str = "complaint_images";

/// Maximum accepted size of a single complaint image (10 MB)
pub const MAX_IMAGE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum number of images attached to one complaint
pub const MAX_IMAGES_PER_COMPLAINT: i64 = 5;

// =============================================================================
// DASHBOARD
// =============================================================================

/// Number of months (current month included) in the public trend
pub const TREND_MONTHS: u32 = 6;
