// ABOUTME: In-process document listener hub with topic-keyed broadcast channels
// ABOUTME: Subscriptions are scoped resources with explicit cancel and guaranteed release on drop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

//! Document listener bridge
//!
//! Database managers publish change events after every successful write;
//! screens (or their route-layer equivalents) subscribe to the topics they
//! render. A [`Subscription`] is a scoped resource: callers release it with
//! [`Subscription::cancel`], and every other exit path releases it via `Drop`,
//! so an abandoned listener never keeps consuming resources. When the last
//! subscriber of a topic is released the topic's channel is removed from the
//! hub.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::warn;

/// Buffered events per topic before slow subscribers start lagging
const TOPIC_CAPACITY: usize = 256;

/// What happened to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Document was created
    Created,
    /// Document fields changed
    Updated,
    /// Document was deleted
    Deleted,
}

/// A single change pushed to topic subscribers
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    /// Topic the event was published on (e.g. `chats/{channel_id}`)
    pub topic: String,
    /// Kind of change
    pub kind: ChangeKind,
    /// Snapshot of the changed document
    pub document: serde_json::Value,
}

/// Topic-keyed registry of broadcast channels
#[derive(Default)]
pub struct ListenerHub {
    topics: DashMap<String, broadcast::Sender<ChangeEvent>>,
}

impl ListenerHub {
    /// Create an empty hub
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a topic, creating its channel on first use
    #[must_use]
    pub fn subscribe(self: &Arc<Self>, topic: &str) -> Subscription {
        let receiver = self
            .topics
            .entry(topic.to_owned())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe();

        Subscription {
            topic: topic.to_owned(),
            receiver: Some(receiver),
            hub: Arc::clone(self),
        }
    }

    /// Publish a change to a topic
    ///
    /// Fire-and-forget: publishing to a topic with no live subscribers drops
    /// the event. Writers never block on slow readers.
    pub fn publish(&self, topic: &str, kind: ChangeKind, document: serde_json::Value) {
        if let Some(sender) = self.topics.get(topic) {
            let event = ChangeEvent {
                topic: topic.to_owned(),
                kind,
                document,
            };
            // Send only fails when every receiver is gone; release() collects
            // the empty topic.
            let _ = sender.send(event);
        }
    }

    /// Number of live subscriptions on a topic
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map_or(0, |sender| sender.receiver_count())
    }

    /// Drop the topic's channel once its last receiver is gone
    fn release(&self, topic: &str) {
        self.topics
            .remove_if(topic, |_, sender| sender.receiver_count() == 0);
    }
}

/// Live subscription handle for one topic
///
/// Must be released when the owning view goes away: call [`cancel`](Self::cancel)
/// explicitly, or rely on `Drop` for error paths and early returns.
pub struct Subscription {
    topic: String,
    receiver: Option<broadcast::Receiver<ChangeEvent>>,
    hub: Arc<ListenerHub>,
}

impl Subscription {
    /// Topic this subscription is bound to
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next change event
    ///
    /// Returns `None` once the subscription is cancelled or the topic channel
    /// closes. A lagged receiver skips the overwritten events and keeps
    /// receiving, it never stalls the publisher.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(topic = %self.topic, skipped, "Listener lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take a buffered event without waiting
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(topic = %self.topic, skipped, "Listener lagged; events dropped");
                }
                Err(_) => return None,
            }
        }
    }

    /// Release the subscription explicitly
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            drop(receiver);
            self.hub.release(&self.topic);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
