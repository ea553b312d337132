use crate::features::whatsapp::dtos::MessageContent;

pub const GREETING: &str = "Hi! Welcome to the complaint desk. What is your complaint?";
pub const ASK_LOCATION: &str = "Please share your location.";
pub const ASK_IMAGE: &str = "Thanks! Now please send an image of the issue.";
pub const IMAGE_UNREADABLE: &str =
    "Sorry, we couldn't process your image. Please try sending it again.";
pub const IMAGE_DOWNLOAD_FAILED: &str =
    "Sorry, we couldn't download your image. Please try sending it again.";
pub const REGISTRATION_FAILED: &str =
    "Sorry, we couldn't register your complaint at this time. Please try again later.";

pub fn registered(complaint_id: impl std::fmt::Display) -> String {
    format!(
        "Got it! Your complaint has been registered with ID: {}. Thank you.",
        complaint_id
    )
}

/// Where a sender is in the complaint dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Greet,
    AskComplaint,
    AskLocation,
    AskImage,
    /// An image was accepted and the complaint is being registered
    Submitting,
}

/// Everything collected for a complaint once the image arrives
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub media_id: String,
    pub mime_type: Option<String>,
}

/// What to do in response to a message
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Reply(&'static str),
    Submit(Draft),
    /// The message does not fit the current step
    Ignore,
}

/// Per-sender dialogue state
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    step: Step,
    complaint: Option<String>,
    location: Option<(f64, f64)>,
}

impl Conversation {
    #[cfg(test)]
    pub fn step(&self) -> Step {
        self.step
    }

    /// Move the dialogue forward by one message
    pub fn advance(&mut self, content: &MessageContent) -> Action {
        match (self.step, content) {
            (Step::Greet, _) => {
                self.step = Step::AskComplaint;
                Action::Reply(GREETING)
            }
            (Step::AskComplaint, MessageContent::Text(text)) => {
                self.complaint = Some(text.clone());
                self.step = Step::AskLocation;
                Action::Reply(ASK_LOCATION)
            }
            (
                Step::AskLocation,
                MessageContent::Location {
                    latitude,
                    longitude,
                },
            ) => {
                self.location = Some((*latitude, *longitude));
                self.step = Step::AskImage;
                Action::Reply(ASK_IMAGE)
            }
            (
                Step::AskImage,
                MessageContent::Image {
                    media_id,
                    mime_type,
                },
            ) => {
                let Some((latitude, longitude)) = self.location else {
                    return Action::Ignore;
                };
                self.step = Step::Submitting;
                Action::Submit(Draft {
                    description: self.complaint.clone().unwrap_or_default(),
                    latitude,
                    longitude,
                    media_id: media_id.clone(),
                    mime_type: mime_type.clone(),
                })
            }
            _ => Action::Ignore,
        }
    }

    /// Give the sender another chance to send the image
    pub fn retry_image(&mut self) {
        self.step = Step::AskImage;
    }
}
