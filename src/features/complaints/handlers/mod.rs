mod complaint_handler;
mod image_handler;

pub use complaint_handler::*;
pub use image_handler::*;
