use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::features::whatsapp::dtos::{VerifyQuery, WebhookPayload};
use crate::features::whatsapp::services::{WhatsAppService, SIGNATURE_HEADER};

/// Webhook verification handshake
#[utoipa::path(
    get,
    path = "/webhooks/whatsapp",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Challenge echoed back", body = String, content_type = "text/plain"),
        (status = 403, description = "Verification failed")
    ),
    tag = "whatsapp"
)]
pub async fn verify_webhook(
    State(service): State<Arc<WhatsAppService>>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    match service.verify_subscription(query) {
        Some(challenge) => {
            tracing::info!("WhatsApp webhook verified");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            tracing::warn!("WhatsApp webhook verification failed");
            (StatusCode::FORBIDDEN, "Verification failed").into_response()
        }
    }
}

/// Incoming WhatsApp notifications
///
/// Always answers 200 once the signature checks out, so Meta does not
/// redeliver messages the dialogue has already seen.
#[utoipa::path(
    post,
    path = "/webhooks/whatsapp",
    request_body(content = String, description = "WhatsApp Cloud API notification", content_type = "application/json"),
    responses(
        (status = 200, description = "Notification accepted", body = String, content_type = "text/plain"),
        (status = 401, description = "Signature missing or invalid")
    ),
    tag = "whatsapp"
)]
pub async fn receive_webhook(
    State(service): State<Arc<WhatsAppService>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if !service.verify_signature(signature, &body) {
        tracing::warn!("Rejected WhatsApp notification with a bad signature");
        return (StatusCode::UNAUTHORIZED, "Invalid signature").into_response();
    }

    let payload = match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Unreadable WhatsApp notification: {}", e);
            return (StatusCode::OK, "OK").into_response();
        }
    };

    if let Some(message) = payload.into_message() {
        if let Err(e) = service.handle(message).await {
            tracing::error!("Failed to handle WhatsApp message: {}", e);
        }
        tracing::debug!(
            "{} WhatsApp conversations in progress",
            service.active_conversations().await
        );
    }

    (StatusCode::OK, "OK").into_response()
}

#[cfg(test)]
mod tests {
    use crate::core::error::{AppError, Result};
    use crate::features::whatsapp::clients::{MediaInfo, MessagingClient};
    use crate::features::whatsapp::routes;
    use crate::features::whatsapp::services::{
        sign, ComplaintIntake, Submission, WhatsAppService, ASK_IMAGE, ASK_LOCATION, GREETING,
        IMAGE_DOWNLOAD_FAILED, REGISTRATION_FAILED, SIGNATURE_HEADER,
    };
    use async_trait::async_trait;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    const SENDER: &str = "919812345678";

    #[derive(Default)]
    struct RecordingMessenger {
        broken_downloads: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingMessenger {
        fn last_reply(&self) -> Option<String> {
            self.sent.lock().unwrap().last().map(|(_, body)| body.clone())
        }
    }

    #[async_trait]
    impl MessagingClient for RecordingMessenger {
        async fn send_text(&self, to: &str, body: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        }

        async fn media_info(&self, media_id: &str) -> Result<MediaInfo> {
            Ok(MediaInfo {
                url: format!("https://lookaside.example/{}", media_id),
                mime_type: Some("image/jpeg".to_string()),
            })
        }

        async fn download(&self, _url: &str) -> Result<Vec<u8>> {
            if self.broken_downloads {
                Err(AppError::ExternalServiceError("HTTP 404".to_string()))
            } else {
                Ok(vec![0xff, 0xd8, 0xff])
            }
        }
    }

    struct RecordingIntake {
        complaint_id: Option<Uuid>,
        submissions: Mutex<Vec<Submission>>,
    }

    #[async_trait]
    impl ComplaintIntake for RecordingIntake {
        async fn submit(&self, submission: Submission) -> Result<Uuid> {
            self.submissions.lock().unwrap().push(submission);
            self.complaint_id
                .ok_or_else(|| AppError::Internal("database unavailable".to_string()))
        }
    }

    struct Harness {
        server: TestServer,
        messenger: Arc<RecordingMessenger>,
        intake: Arc<RecordingIntake>,
        service: Arc<WhatsAppService>,
    }

    fn harness(
        messenger: RecordingMessenger,
        complaint_id: Option<Uuid>,
        app_secret: Option<&str>,
    ) -> Harness {
        let messenger = Arc::new(messenger);
        let intake = Arc::new(RecordingIntake {
            complaint_id,
            submissions: Mutex::new(Vec::new()),
        });
        let service = Arc::new(WhatsAppService::new(
            "verify-me",
            app_secret.map(str::to_string),
            messenger.clone(),
            intake.clone(),
        ));
        let server = TestServer::new(routes::routes(service.clone())).unwrap();
        Harness {
            server,
            messenger,
            intake,
            service,
        }
    }

    fn notification(message: Value) -> Value {
        json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "contacts": [{ "profile": { "name": "Asha" } }],
                        "messages": [message]
                    }
                }]
            }]
        })
    }

    fn text(body: &str) -> Value {
        notification(json!({ "from": SENDER, "type": "text", "text": { "body": body } }))
    }

    fn location() -> Value {
        notification(json!({
            "from": SENDER,
            "type": "location",
            "location": { "latitude": 19.076, "longitude": 72.8777 }
        }))
    }

    fn image() -> Value {
        notification(json!({
            "from": SENDER,
            "type": "image",
            "image": { "id": "media-7", "mime_type": "image/jpeg" }
        }))
    }

    async fn deliver(server: &TestServer, payload: Value) {
        let response = server.post("/webhooks/whatsapp").json(&payload).await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    async fn walk_to_image_step(harness: &Harness) {
        deliver(&harness.server, text("hello")).await;
        deliver(&harness.server, text("Sewage overflowing on main road")).await;
        deliver(&harness.server, location()).await;
        assert_eq!(harness.messenger.last_reply().as_deref(), Some(ASK_IMAGE));
    }

    #[tokio::test]
    async fn test_verification_echoes_challenge() {
        let harness = harness(RecordingMessenger::default(), None, None);

        let response = harness
            .server
            .get("/webhooks/whatsapp")
            .add_query_param("hub.mode", "subscribe")
            .add_query_param("hub.verify_token", "verify-me")
            .add_query_param("hub.challenge", "1158201444")
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "1158201444");
    }

    #[tokio::test]
    async fn test_verification_with_wrong_token_is_forbidden() {
        let harness = harness(RecordingMessenger::default(), None, None);

        harness
            .server
            .get("/webhooks/whatsapp")
            .add_query_param("hub.mode", "subscribe")
            .add_query_param("hub.verify_token", "guess")
            .add_query_param("hub.challenge", "1")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        harness
            .server
            .get("/webhooks/whatsapp")
            .add_query_param("hub.verify_token", "verify-me")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_dialogue_registers_complaint() {
        let complaint_id = Uuid::now_v7();
        let harness = harness(RecordingMessenger::default(), Some(complaint_id), None);

        deliver(&harness.server, text("hello")).await;
        assert_eq!(harness.messenger.last_reply().as_deref(), Some(GREETING));

        deliver(&harness.server, text("Sewage overflowing on main road")).await;
        assert_eq!(harness.messenger.last_reply().as_deref(), Some(ASK_LOCATION));

        deliver(&harness.server, location()).await;
        deliver(&harness.server, image()).await;

        let reply = harness.messenger.last_reply().unwrap();
        assert!(reply.contains(&complaint_id.to_string()));

        let submissions = harness.intake.submissions.lock().unwrap().clone();
        assert_eq!(submissions.len(), 1);
        let submission = &submissions[0];
        assert_eq!(submission.phone, SENDER);
        assert_eq!(submission.sender_name.as_deref(), Some("Asha"));
        assert_eq!(submission.description, "Sewage overflowing on main road");
        assert_eq!((submission.latitude, submission.longitude), (19.076, 72.8777));
        assert_eq!(submission.image.content_type, "image/jpeg");
        assert_eq!(submission.image.data, vec![0xff, 0xd8, 0xff]);

        assert!(harness
            .messenger
            .sent
            .lock()
            .unwrap()
            .iter()
            .all(|(to, _)| to == SENDER));
        assert_eq!(harness.service.active_conversations().await, 0);

        // A new message after registration starts over
        deliver(&harness.server, text("hi again")).await;
        assert_eq!(harness.messenger.last_reply().as_deref(), Some(GREETING));
    }

    #[tokio::test]
    async fn test_failed_download_asks_for_image_again() {
        let messenger = RecordingMessenger {
            broken_downloads: true,
            ..Default::default()
        };
        let harness = harness(messenger, Some(Uuid::now_v7()), None);

        walk_to_image_step(&harness).await;
        deliver(&harness.server, image()).await;

        assert_eq!(
            harness.messenger.last_reply().as_deref(),
            Some(IMAGE_DOWNLOAD_FAILED)
        );
        assert!(harness.intake.submissions.lock().unwrap().is_empty());
        assert_eq!(harness.service.active_conversations().await, 1);
    }

    #[tokio::test]
    async fn test_failed_registration_keeps_collected_details() {
        let harness = harness(RecordingMessenger::default(), None, None);

        walk_to_image_step(&harness).await;
        deliver(&harness.server, image()).await;
        assert_eq!(
            harness.messenger.last_reply().as_deref(),
            Some(REGISTRATION_FAILED)
        );

        // Resending the image retries with the same complaint text
        deliver(&harness.server, image()).await;
        let submissions = harness.intake.submissions.lock().unwrap().clone();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[1].description, "Sewage overflowing on main road");
    }

    #[tokio::test]
    async fn test_out_of_order_message_gets_no_reply() {
        let harness = harness(RecordingMessenger::default(), None, None);

        deliver(&harness.server, text("hello")).await;
        deliver(&harness.server, location()).await;

        assert_eq!(harness.messenger.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_and_status_notifications_are_acknowledged() {
        let harness = harness(RecordingMessenger::default(), None, None);

        let response = harness
            .server
            .post("/webhooks/whatsapp")
            .text("not json")
            .await;
        response.assert_status_ok();

        deliver(
            &harness.server,
            json!({ "entry": [{ "changes": [{ "value": { "statuses": [] } }] }] }),
        )
        .await;

        assert!(harness.messenger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signature_is_enforced_when_secret_configured() {
        let harness = harness(RecordingMessenger::default(), None, Some("app-secret"));
        let body = text("hello").to_string();

        harness
            .server
            .post("/webhooks/whatsapp")
            .text(body.clone())
            .content_type("application/json")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        assert!(harness.messenger.sent.lock().unwrap().is_empty());

        let signature = sign("app-secret", body.as_bytes());
        harness
            .server
            .post("/webhooks/whatsapp")
            .text(body)
            .content_type("application/json")
            .add_header(
                HeaderName::from_static(SIGNATURE_HEADER),
                HeaderValue::from_str(&signature).unwrap(),
            )
            .await
            .assert_status_ok();
        assert_eq!(harness.messenger.last_reply().as_deref(), Some(GREETING));
    }
}
