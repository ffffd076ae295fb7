//! Rearrangement event fan-out
//!
//! Events go to an in-process broadcast channel (consumed by the SSE
//! endpoint) and, when configured, to a Redis pub/sub channel. Delivery is
//! best effort and never fails the operation that produced the event.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use super::redis::RedisService;
use crate::models::RearrangementRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EventKind {
    RequestCreated,
    RequestAccepted,
    RequestRejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RearrangementEvent {
    pub kind: EventKind,
    pub request_id: Uuid,
    pub date: NaiveDate,
    pub period_id: String,
    pub original_faculty_id: String,
    pub substitute_faculty_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl RearrangementEvent {
    pub fn new(kind: EventKind, request: &RearrangementRequest) -> Self {
        Self {
            kind,
            request_id: request.id,
            date: request.date,
            period_id: request.period_id.clone(),
            original_faculty_id: request.original_faculty_id.clone(),
            substitute_faculty_id: request.substitute_faculty_id.clone(),
            occurred_at: Utc::now(),
        }
    }

    pub fn concerns(&self, faculty_id: &str) -> bool {
        self.original_faculty_id == faculty_id || self.substitute_faculty_id == faculty_id
    }
}

#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<RearrangementEvent>,
    relay: Option<(RedisService, String)>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            relay: None,
        }
    }

    /// Also publish every event as JSON on a Redis channel
    pub fn with_redis(mut self, redis: RedisService, channel: impl Into<String>) -> Self {
        self.relay = Some((redis, channel.into()));
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RearrangementEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: RearrangementEvent) {
        tracing::debug!(
            "Publishing {:?} for rearrangement {}",
            event.kind,
            event.request_id
        );

        // No subscribers is not an error
        let _ = self.sender.send(event.clone());

        if let Some((redis, channel)) = &self.relay {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Failed to serialize event {}: {}", event.request_id, e);
                    return;
                }
            };
            let redis = redis.clone();
            let channel = channel.clone();
            tokio::spawn(async move {
                if let Err(e) = redis.publish(&channel, &payload).await {
                    tracing::warn!("Failed to relay rearrangement event: {}", e);
                }
            });
        }
    }
}
