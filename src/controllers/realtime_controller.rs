use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{Extension, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::Stream;
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::{models::CurrentUser, AppState};

/// Bus events as SSE items. Ends cleanly when the sender side of the bus is
/// gone; a lagged receiver gets a ping and keeps listening.
fn event_stream(rx: Receiver<String>) -> impl Stream<Item = Result<Event, Infallible>> {
    futures_util::stream::unfold(rx, |mut rx| async {
        match rx.recv().await {
            Ok(name) => Some((Ok(Event::default().event(name).data("1")), rx)),
            Err(RecvError::Lagged(_)) => {
                Some((Ok(Event::default().event("ping").data("lagged")), rx))
            }
            Err(RecvError::Closed) => None,
        }
    })
}

// GET /events  (SSE)
//
// Pushes bus events like "alertsUpdated" so open pages can refresh their
// alert partials without polling.
pub async fn sse_events(
    State(state): State<AppState>,
    Extension(_u): Extension<CurrentUser>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = event_stream(state.events_tx.subscribe());

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(20))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn stream_ends_when_the_bus_sender_is_dropped() {
        let (tx, rx) = tokio::sync::broadcast::channel::<String>(4);
        tx.send("alertsUpdated".to_string()).unwrap();
        drop(tx);

        let mut stream = Box::pin(event_stream(rx));

        // The buffered event is still delivered, then the stream terminates.
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());
    }
}
