use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::WhatsAppConfig;
use crate::core::error::{AppError, Result};

/// Location of a media object announced in a message
#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfo {
    /// Short-lived download URL, itself requiring the bearer token
    pub url: String,
    pub mime_type: Option<String>,
}

/// Outgoing side of the WhatsApp channel
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Send a plain text message
    async fn send_text(&self, to: &str, body: &str) -> Result<()>;

    /// Resolve a media id to its download URL
    async fn media_info(&self, media_id: &str) -> Result<MediaInfo>;

    /// Download media bytes from a URL returned by [`media_info`](Self::media_info)
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Serialize)]
struct OutgoingText<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: OutgoingTextBody<'a>,
}

#[derive(Debug, Serialize)]
struct OutgoingTextBody<'a> {
    body: &'a str,
}

/// Client for the Meta Graph API
pub struct GraphApiClient {
    base_url: String,
    phone_number_id: String,
    access_token: String,
    http_client: reqwest::Client,
}

impl GraphApiClient {
    pub fn new(config: &WhatsAppConfig) -> Self {
        Self {
            base_url: config.graph_api_url.clone(),
            phone_number_id: config.phone_number_id.clone(),
            access_token: config.access_token.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    async fn ensure_success(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Graph API error while {}: HTTP {} - {}", action, status, body);
        Err(AppError::ExternalServiceError(format!(
            "Graph API error while {}: HTTP {}",
            action, status
        )))
    }
}

#[async_trait]
impl MessagingClient for GraphApiClient {
    async fn send_text(&self, to: &str, body: &str) -> Result<()> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);
        let payload = OutgoingText {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: OutgoingTextBody { body },
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send WhatsApp message: {}", e);
                AppError::ExternalServiceError(format!("Failed to send message: {}", e))
            })?;

        Self::ensure_success(response, "sending message").await?;
        tracing::debug!("WhatsApp reply sent to {}", to);
        Ok(())
    }

    async fn media_info(&self, media_id: &str) -> Result<MediaInfo> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(media_id));

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up media {}: {}", media_id, e);
                AppError::ExternalServiceError(format!("Failed to look up media: {}", e))
            })?;

        let response = Self::ensure_success(response, "looking up media").await?;
        response.json::<MediaInfo>().await.map_err(|e| {
            tracing::error!("Failed to parse media response: {}", e);
            AppError::ExternalServiceError(format!("Failed to parse media response: {}", e))
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to download media: {}", e);
                AppError::ExternalServiceError(format!("Failed to download media: {}", e))
            })?;

        let response = Self::ensure_success(response, "downloading media").await?;
        let bytes = response.bytes().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to read media body: {}", e))
        })?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outgoing_text_shape() {
        let payload = OutgoingText {
            messaging_product: "whatsapp",
            to: "919812345678",
            kind: "text",
            text: OutgoingTextBody { body: "Hello" },
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "messaging_product": "whatsapp",
                "to": "919812345678",
                "type": "text",
                "text": { "body": "Hello" }
            })
        );
    }

    #[test]
    fn test_media_info_ignores_extra_fields() {
        let info: MediaInfo = serde_json::from_value(json!({
            "url": "https://lookaside.example/media",
            "mime_type": "image/jpeg",
            "sha256": "abc",
            "file_size": 1024,
            "id": "media-42",
            "messaging_product": "whatsapp"
        }))
        .unwrap();
        assert_eq!(info.url, "https://lookaside.example/media");
        assert_eq!(info.mime_type.as_deref(), Some("image/jpeg"));
    }
}
