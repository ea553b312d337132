use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::complaints::services::access;
use crate::features::realtime::dtos::RealtimeQueryParams;
use crate::features::realtime::models::{ChangeEvent, ChangeFilter};
use crate::features::realtime::routes::RealtimeState;
use crate::features::realtime::services::{ChangeFeed, Subscription};

/// Events buffered per stream before a slow reader starts missing them
pub(crate) const STREAM_BUFFER: usize = 256;

/// What a caller may stream
#[derive(Debug, PartialEq)]
pub(crate) enum StreamScope {
    /// Staff see every change matching their filter
    Unrestricted(ChangeFilter),
    /// The caller's own notifications
    OwnNotifications(ChangeFilter),
    /// Changes to one complaint, once the caller is shown to be allowed to view it
    Complaint(ChangeFilter, Uuid),
}

pub(crate) fn scope_for(
    user: &AuthenticatedUser,
    params: RealtimeQueryParams,
) -> Result<StreamScope> {
    let filter = ChangeFilter {
        table: params.table,
        event: params.event,
        record_id: params.record_id,
        user_id: None,
    };

    if user.has_official_access() {
        return Ok(StreamScope::Unrestricted(filter));
    }

    if filter.table.as_deref() == Some("notifications") {
        return Ok(StreamScope::OwnNotifications(filter.with_user(&user.sub)));
    }

    let complaint_id = filter
        .record_id
        .as_deref()
        .ok_or_else(|| {
            AppError::BadRequest(
                "record_id of one of your complaints is required to follow changes".to_string(),
            )
        })
        .and_then(|id| {
            Uuid::parse_str(id)
                .map_err(|_| AppError::BadRequest(format!("Invalid record_id: {}", id)))
        })?;

    Ok(StreamScope::Complaint(filter, complaint_id))
}

/// Subscribe through a queue of `capacity` events; when the reader falls that far
/// behind, further events are dropped until it catches up
pub(crate) fn bounded_subscription(
    feed: &ChangeFeed,
    filter: ChangeFilter,
    capacity: usize,
) -> (mpsc::Receiver<ChangeEvent>, Subscription) {
    let (tx, rx) = mpsc::channel(capacity);
    let subscription = feed.subscribe(filter, move |event| match tx.try_send(event) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(event)) => {
            tracing::warn!(
                "Change stream reader is behind, dropping {} change of {}",
                event.table,
                event.record_id
            );
        }
    });
    (rx, subscription)
}

fn to_sse(event: ChangeEvent) -> Event {
    let sse = Event::default()
        .event(format!("{}.{}", event.table, event.event.as_str()))
        .id(event.record_id.clone());

    match serde_json::to_string(&event) {
        Ok(data) => sse.data(data),
        Err(e) => {
            tracing::warn!("Failed to serialize change event: {:?}", e);
            sse.data("{}")
        }
    }
}

/// Follow committed changes as Server-Sent Events
///
/// Staff may stream any table. Citizens may stream their own notifications
/// (`table=notifications`) or the changes of one complaint they filed
/// (`record_id=<complaint id>`). Each event is named `<table>.<EVENT>` and
/// carries the change as JSON.
#[utoipa::path(
    get,
    path = "/api/realtime",
    params(RealtimeQueryParams),
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = ChangeEvent),
        (status = 400, description = "Citizen stream without a complaint id"),
        (status = 404, description = "Complaint not found")
    ),
    security(("bearer_auth" = [])),
    tag = "realtime"
)]
pub async fn stream_changes(
    user: AuthenticatedUser,
    State(state): State<RealtimeState>,
    Query(params): Query<RealtimeQueryParams>,
) -> Result<Response> {
    let filter = match scope_for(&user, params)? {
        StreamScope::Unrestricted(filter) | StreamScope::OwnNotifications(filter) => filter,
        StreamScope::Complaint(filter, complaint_id) => {
            let complaint = access::load(&state.pool, complaint_id).await?;
            access::ensure_can_view(&user, &complaint, complaint_id)?;
            filter
        }
    };

    tracing::debug!("Change stream opened: user={}, filter={:?}", user.sub, filter);

    let (rx, subscription) = bounded_subscription(&state.feed, filter, STREAM_BUFFER);

    // The subscription lives as long as the stream; a disconnect drops both
    let stream = ReceiverStream::new(rx).map(move |event| {
        let _ = &subscription;
        Ok::<_, Infallible>(to_sse(event))
    });

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    );

    Ok(sse.into_response())
}
