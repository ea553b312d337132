mod conversation;
mod intake;
mod signature;
mod whatsapp_service;

pub use intake::{ComplaintIntake, DeskIntake, Submission};
pub use signature::SIGNATURE_HEADER;
pub use whatsapp_service::WhatsAppService;

#[cfg(test)]
pub use conversation::{
    ASK_IMAGE, ASK_LOCATION, GREETING, IMAGE_DOWNLOAD_FAILED, REGISTRATION_FAILED,
};
#[cfg(test)]
pub use signature::sign;
