use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use statusdeck_core::timestamp_now;
use std::sync::Arc;
use tracing::{debug, info};

use crate::events::{ClientMessage, ServerMessage};
use crate::hub::{EventHub, Subscription};
use crate::RealtimeError;

pub trait RealtimeAppState: Send + Sync + 'static {
    fn event_hub(&self) -> &EventHub;
}

pub fn create_router<T: RealtimeAppState>() -> Router<Arc<T>> {
    Router::new().route("/ws", get(ws_handler::<T>))
}

/// WebSocket upgrade handler.
async fn ws_handler<T: RealtimeAppState>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<T>>,
) -> impl IntoResponse {
    let subscription = state.event_hub().subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, subscription))
}

/// Apply a client message to the subscription and build the reply.
pub fn handle_client_message(
    subscription: &mut Subscription,
    message: ClientMessage,
) -> ServerMessage {
    match message {
        ClientMessage::JoinOrganization { organization_id } => {
            subscription.join(organization_id);
            debug!(organization_id, "Client joined organization");
            ServerMessage::Joined { organization_id }
        }
        ClientMessage::LeaveOrganization { organization_id } => {
            subscription.leave(organization_id);
            debug!(organization_id, "Client left organization");
            ServerMessage::Left { organization_id }
        }
        ClientMessage::Ping => ServerMessage::Pong {
            timestamp: timestamp_now(),
        },
    }
}

/// Reply for a frame that is not a valid client message.
pub fn parse_error(err: &serde_json::Error) -> ServerMessage {
    ServerMessage::Error {
        code: "PARSE_ERROR".to_string(),
        message: format!("Invalid message: {}", err),
    }
}

async fn send_json<S, T>(sink: &mut S, message: &T) -> Result<(), RealtimeError>
where
    S: Sink<WsMessage, Error = axum::Error> + Unpin,
    T: Serialize,
{
    let json = serde_json::to_string(message)?;
    sink.send(WsMessage::Text(json.into()))
        .await
        .map_err(RealtimeError::Send)
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, mut subscription: Subscription) {
    info!("WebSocket client connected");
    let (mut sender, mut receiver) = socket.split();

    loop {
        let outcome = tokio::select! {
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(WsMessage::Text(t))) => t.to_string(),
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket receive failed");
                        break;
                    }
                };

                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => handle_client_message(&mut subscription, message),
                    Err(e) => parse_error(&e),
                };
                send_json(&mut sender, &reply).await
            }
            event = subscription.next() => {
                match event {
                    Some(event) => send_json(&mut sender, event.as_ref()).await,
                    None => break,
                }
            }
        };

        if let Err(e) = outcome {
            debug!(error = %e, "Closing WebSocket after send failure");
            break;
        }
    }

    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::hub::EventPublisher;
    use serde_json::json;

    #[tokio::test]
    async fn test_join_then_receive() {
        let hub = EventHub::new(8);
        let mut subscription = hub.subscribe();

        let reply = handle_client_message(
            &mut subscription,
            ClientMessage::JoinOrganization { organization_id: 4 },
        );
        assert_eq!(reply, ServerMessage::Joined { organization_id: 4 });
        assert!(subscription.is_joined(4));

        hub.publish(4, EventKind::IncidentResolved, json!({"incident": {"id": 1}}));
        let event = subscription.next().await.unwrap();
        assert_eq!(event.event, EventKind::IncidentResolved);
    }

    #[test]
    fn test_leave_and_ping() {
        let hub = EventHub::new(8);
        let mut subscription = hub.subscribe();
        subscription.join(9);

        let reply = handle_client_message(
            &mut subscription,
            ClientMessage::LeaveOrganization { organization_id: 9 },
        );
        assert_eq!(reply, ServerMessage::Left { organization_id: 9 });
        assert!(!subscription.is_joined(9));

        let reply = handle_client_message(&mut subscription, ClientMessage::Ping);
        assert!(matches!(reply, ServerMessage::Pong { .. }));
    }

    #[test]
    fn test_parse_error_reply() {
        let err = serde_json::from_str::<ClientMessage>("not json").unwrap_err();
        match parse_error(&err) {
            ServerMessage::Error { code, .. } => assert_eq!(code, "PARSE_ERROR"),
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
