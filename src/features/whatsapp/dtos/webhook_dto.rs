use serde::Deserialize;
use utoipa::IntoParams;

// =============================================================================
// VERIFICATION
// =============================================================================

/// Query sent by Meta when the webhook is registered
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,

    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,

    /// Echoed back when the token matches
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

// =============================================================================
// NOTIFICATION PAYLOAD
// =============================================================================

/// Body of a WhatsApp Cloud API notification.
///
/// Only the parts read by the complaint flow are modelled; status callbacks
/// and other change kinds deserialize to empty lists.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    entry: Vec<WebhookEntry>,
}

#[derive(Debug, Deserialize)]
struct WebhookEntry {
    #[serde(default)]
    changes: Vec<WebhookChange>,
}

#[derive(Debug, Deserialize)]
struct WebhookChange {
    value: Option<ChangeValue>,
}

#[derive(Debug, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    contacts: Vec<Contact>,
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct Contact {
    profile: Option<ContactProfile>,
}

#[derive(Debug, Deserialize)]
struct ContactProfile {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    from: String,
    #[serde(rename = "type")]
    kind: String,
    text: Option<TextPart>,
    location: Option<LocationPart>,
    image: Option<MediaPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    body: String,
}

#[derive(Debug, Deserialize)]
struct LocationPart {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct MediaPart {
    id: String,
    mime_type: Option<String>,
}

/// What a citizen sent, reduced to the kinds the conversation understands
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Location { latitude: f64, longitude: f64 },
    Image { media_id: String, mime_type: Option<String> },
    /// Stickers, audio, documents and anything else
    Unsupported(String),
}

/// First message of a notification together with its sender
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    /// Sender phone number as reported by WhatsApp (digits only)
    pub from: String,
    pub sender_name: Option<String>,
    pub content: MessageContent,
}

impl WebhookPayload {
    /// Meta delivers one message per notification in practice; only the first is read
    pub fn into_message(self) -> Option<IncomingMessage> {
        let value = self
            .entry
            .into_iter()
            .next()?
            .changes
            .into_iter()
            .next()?
            .value?;

        let sender_name = value
            .contacts
            .into_iter()
            .next()
            .and_then(|contact| contact.profile)
            .and_then(|profile| profile.name);

        let message = value.messages.into_iter().next()?;
        let content = match (message.kind.as_str(), message.text, message.location, message.image) {
            ("text", Some(text), _, _) => MessageContent::Text(text.body),
            ("location", _, Some(location), _) => MessageContent::Location {
                latitude: location.latitude,
                longitude: location.longitude,
            },
            ("image", _, _, Some(image)) => MessageContent::Image {
                media_id: image.id,
                mime_type: image.mime_type,
            },
            _ => MessageContent::Unsupported(message.kind),
        };

        Some(IncomingMessage {
            from: message.from,
            sender_name,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notification(message: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "102290129340398",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "contacts": [{ "profile": { "name": "Asha" }, "wa_id": "919812345678" }],
                        "messages": [message]
                    }
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_text_message() {
        let message = notification(json!({
            "from": "919812345678",
            "id": "wamid.1",
            "type": "text",
            "text": { "body": "Streetlight broken" }
        }))
        .into_message()
        .unwrap();

        assert_eq!(message.from, "919812345678");
        assert_eq!(message.sender_name.as_deref(), Some("Asha"));
        assert_eq!(
            message.content,
            MessageContent::Text("Streetlight broken".to_string())
        );
    }

    #[test]
    fn test_location_and_image_messages() {
        let location = notification(json!({
            "from": "919812345678",
            "type": "location",
            "location": { "latitude": 28.61, "longitude": 77.2, "name": "Ward 4" }
        }))
        .into_message()
        .unwrap();
        assert_eq!(
            location.content,
            MessageContent::Location {
                latitude: 28.61,
                longitude: 77.2
            }
        );

        let image = notification(json!({
            "from": "919812345678",
            "type": "image",
            "image": { "id": "media-42", "mime_type": "image/png", "sha256": "abc" }
        }))
        .into_message()
        .unwrap();
        assert_eq!(
            image.content,
            MessageContent::Image {
                media_id: "media-42".to_string(),
                mime_type: Some("image/png".to_string())
            }
        );
    }

    #[test]
    fn test_other_kinds_are_unsupported() {
        let message = notification(json!({
            "from": "919812345678",
            "type": "sticker",
            "sticker": { "id": "s-1" }
        }))
        .into_message()
        .unwrap();
        assert_eq!(
            message.content,
            MessageContent::Unsupported("sticker".to_string())
        );
    }

    #[test]
    fn test_status_callback_has_no_message() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "entry": [{
                "changes": [{
                    "value": {
                        "statuses": [{ "id": "wamid.1", "status": "delivered" }]
                    }
                }]
            }]
        }))
        .unwrap();
        assert!(payload.into_message().is_none());
        assert!(WebhookPayload::default().into_message().is_none());
    }
}
