mod complaint;
mod complaint_image;

pub use complaint::{Complaint, ComplaintPriority, ComplaintStatus, COMPLAINT_COLUMNS};
pub use complaint_image::{ComplaintImage, COMPLAINT_IMAGE_COLUMNS};
