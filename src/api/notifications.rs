//! Server-sent event stream of rearrangement events

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Deserialize;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct StreamQuery {
    /// Only events where this faculty is a party
    pub faculty_id: String,
}

/// Live `RequestCreated` / `RequestAccepted` / `RequestRejected` events
#[utoipa::path(
    get,
    path = "/notifications/stream",
    tag = "notifications",
    params(StreamQuery),
    responses(
        (status = 200, description = "text/event-stream of RearrangementEvent JSON payloads")
    )
)]
pub async fn stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let faculty_id = query.faculty_id;
    tracing::debug!("Notification stream opened for {}", faculty_id);

    let events = BroadcastStream::new(state.services.notifier.subscribe()).filter_map(move |received| {
        let event = match received {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Notification stream for {} lagged: {}", faculty_id, e);
                return None;
            }
        };
        if !event.concerns(&faculty_id) {
            return None;
        }
        match Event::default()
            .event(format!("{:?}", event.kind))
            .json_data(&event)
        {
            Ok(sse) => Some(Ok(sse)),
            Err(e) => {
                tracing::warn!("Failed to encode event {}: {}", event.request_id, e);
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
