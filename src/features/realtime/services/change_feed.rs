use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::features::realtime::models::{ChangeEvent, ChangeFilter, ChangeKind};

const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out of committed changes to any number of subscribers
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: ChangeEvent) {
        // No receivers is not an error: nobody is listening right now
        match self.sender.send(event) {
            Ok(receivers) => debug!("Change event delivered to {} receivers", receivers),
            Err(broadcast::error::SendError(event)) => {
                debug!("No subscribers for {} {}", event.table, event.event.as_str())
            }
        }
    }

    /// Serialize `record` and publish it as a change to `table`
    pub fn publish_record<T: Serialize>(
        &self,
        table: &str,
        kind: ChangeKind,
        record_id: impl Into<String>,
        record: &T,
    ) {
        match serde_json::to_value(record) {
            Ok(value) => self.publish(ChangeEvent::new(table, kind, record_id, value)),
            Err(e) => warn!("Failed to serialize {} change event: {:?}", table, e),
        }
    }

    /// Invoke `callback` for every event matching `filter` until the subscription is dropped
    pub fn subscribe<F>(&self, filter: ChangeFilter, callback: F) -> Subscription
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        let mut receiver = self.sender.subscribe();

        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if filter.matches(&event) {
                            callback(event);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Change subscriber lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Subscription { task }
    }
}

/// Handle for a callback subscription; dropping it cancels delivery
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    fn complaint_update(id: &str) -> ChangeEvent {
        ChangeEvent::new("complaints", ChangeKind::Update, id, json!({ "id": id }))
    }

    #[tokio::test]
    async fn test_subscriber_receives_only_matching_events() {
        let feed = ChangeFeed::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let _subscription = feed.subscribe(
            ChangeFilter::table("complaints").with_record("a"),
            move |event| sink.lock().unwrap().push(event.record_id),
        );

        feed.publish(complaint_update("a"));
        feed.publish(complaint_update("b"));
        feed.publish(ChangeEvent::new(
            "notifications",
            ChangeKind::Insert,
            "a",
            json!({}),
        ));
        settle().await;

        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let feed = ChangeFeed::default();
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();

        let subscription = feed.subscribe(ChangeFilter::default(), move |_| {
            *sink.lock().unwrap() += 1;
        });

        feed.publish(complaint_update("a"));
        settle().await;
        subscription.unsubscribe();
        settle().await;

        feed.publish(complaint_update("a"));
        settle().await;

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let feed = ChangeFeed::new(4);
        feed.publish_record("complaints", ChangeKind::Insert, "x", &json!({ "id": "x" }));
        assert_eq!(feed.sender.receiver_count(), 0);
    }
}
