use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::error::Result;
use crate::features::complaints::services::ImageUpload;
use crate::features::whatsapp::clients::MessagingClient;
use crate::features::whatsapp::dtos::{IncomingMessage, VerifyQuery};
use crate::features::whatsapp::services::conversation::{
    registered, Action, Conversation, Draft, IMAGE_DOWNLOAD_FAILED, IMAGE_UNREADABLE,
    REGISTRATION_FAILED,
};
use crate::features::whatsapp::services::signature::signature_matches;
use crate::features::whatsapp::services::{ComplaintIntake, Submission};

const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// Runs the WhatsApp complaint dialogue, one conversation per sender
pub struct WhatsAppService {
    verify_token: String,
    app_secret: Option<String>,
    messenger: Arc<dyn MessagingClient>,
    intake: Arc<dyn ComplaintIntake>,
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl WhatsAppService {
    pub fn new(
        verify_token: impl Into<String>,
        app_secret: Option<String>,
        messenger: Arc<dyn MessagingClient>,
        intake: Arc<dyn ComplaintIntake>,
    ) -> Self {
        Self {
            verify_token: verify_token.into(),
            app_secret,
            messenger,
            intake,
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// The challenge to echo when Meta's subscription request carries our token
    pub fn verify_subscription(&self, query: VerifyQuery) -> Option<String> {
        let subscribing = query.mode.as_deref() == Some("subscribe");
        let token_matches = query.verify_token.as_deref() == Some(self.verify_token.as_str());
        if subscribing && token_matches {
            Some(query.challenge.unwrap_or_default())
        } else {
            None
        }
    }

    /// Bodies are accepted unsigned only when no app secret is configured
    pub fn verify_signature(&self, header: Option<&str>, body: &[u8]) -> bool {
        match &self.app_secret {
            Some(secret) => signature_matches(secret, header, body),
            None => true,
        }
    }

    pub async fn handle(&self, message: IncomingMessage) -> Result<()> {
        let action = {
            let mut conversations = self.conversations.write().await;
            conversations
                .entry(message.from.clone())
                .or_default()
                .advance(&message.content)
        };

        match action {
            Action::Reply(text) => self.messenger.send_text(&message.from, text).await,
            Action::Ignore => {
                tracing::debug!(
                    "Ignoring WhatsApp message from {} that does not fit the conversation",
                    message.from
                );
                Ok(())
            }
            Action::Submit(draft) => self.submit(message.from, message.sender_name, draft).await,
        }
    }

    async fn submit(&self, from: String, sender_name: Option<String>, draft: Draft) -> Result<()> {
        let media = match self.messenger.media_info(&draft.media_id).await {
            Ok(media) => media,
            Err(e) => {
                tracing::warn!("Could not resolve media {}: {}", draft.media_id, e);
                return self.ask_for_image_again(&from, IMAGE_UNREADABLE).await;
            }
        };
        let data = match self.messenger.download(&media.url).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Could not download media {}: {}", draft.media_id, e);
                return self.ask_for_image_again(&from, IMAGE_DOWNLOAD_FAILED).await;
            }
        };

        let content_type = draft
            .mime_type
            .or(media.mime_type)
            .unwrap_or_else(|| DEFAULT_IMAGE_TYPE.to_string());
        let extension = content_type
            .strip_prefix("image/")
            .filter(|ext| !ext.is_empty())
            .unwrap_or("jpg");
        let file_name = format!("whatsapp-{}.{}", draft.media_id, extension);

        let submission = Submission {
            phone: from.clone(),
            sender_name,
            description: draft.description,
            latitude: draft.latitude,
            longitude: draft.longitude,
            image: ImageUpload {
                file_name,
                content_type,
                data,
            },
        };

        match self.intake.submit(submission).await {
            Ok(complaint_id) => {
                self.conversations.write().await.remove(&from);
                tracing::info!("WhatsApp complaint {} registered for {}", complaint_id, from);
                self.messenger
                    .send_text(&from, &registered(complaint_id))
                    .await
            }
            Err(e) => {
                tracing::error!("Failed to register WhatsApp complaint from {}: {}", from, e);
                self.ask_for_image_again(&from, REGISTRATION_FAILED).await
            }
        }
    }

    async fn ask_for_image_again(&self, from: &str, reply: &str) -> Result<()> {
        if let Some(conversation) = self.conversations.write().await.get_mut(from) {
            conversation.retry_image();
        }
        self.messenger.send_text(from, reply).await
    }

    /// Number of senders with a dialogue in progress
    pub async fn active_conversations(&self) -> usize {
        self.conversations.read().await.len()
    }
}
