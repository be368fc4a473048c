//! Event types and the WebSocket message protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use statusdeck_core::timestamp_now;
use std::fmt::Display;

/// Kinds of change pushed to organization subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "service:created")]
    ServiceCreated,
    #[serde(rename = "service:updated")]
    ServiceUpdated,
    #[serde(rename = "service:deleted")]
    ServiceDeleted,
    #[serde(rename = "incident:created")]
    IncidentCreated,
    #[serde(rename = "incident:updated")]
    IncidentUpdated,
    #[serde(rename = "incident:resolved")]
    IncidentResolved,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ServiceCreated => "service:created",
            EventKind::ServiceUpdated => "service:updated",
            EventKind::ServiceDeleted => "service:deleted",
            EventKind::IncidentCreated => "incident:created",
            EventKind::IncidentUpdated => "incident:updated",
            EventKind::IncidentResolved => "incident:resolved",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An event scoped to one organization, as sent over the wire.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationEvent {
    #[serde(skip)]
    pub organization_id: i32,
    pub event: EventKind,
    pub data: Value,
}

impl OrganizationEvent {
    /// Build an event, stamping the payload with the current time.
    ///
    /// Object payloads get a `timestamp` key; any other payload is wrapped
    /// as `{"value": ..., "timestamp": ...}`.
    pub fn new(organization_id: i32, event: EventKind, payload: Value) -> Self {
        let mut data = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        data.insert("timestamp".to_string(), Value::String(timestamp_now()));

        Self {
            organization_id,
            event,
            data: Value::Object(data),
        }
    }
}

/// Messages sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join:organization", rename_all = "camelCase")]
    JoinOrganization { organization_id: i32 },
    #[serde(rename = "leave:organization", rename_all = "camelCase")]
    LeaveOrganization { organization_id: i32 },
    #[serde(rename = "ping")]
    Ping,
}

/// Direct replies to a client message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "joined:organization", rename_all = "camelCase")]
    Joined { organization_id: i32 },
    #[serde(rename = "left:organization", rename_all = "camelCase")]
    Left { organization_id: i32 },
    #[serde(rename = "pong")]
    Pong { timestamp: String },
    #[serde(rename = "error")]
    Error { code: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_payload_gets_timestamp() {
        let event = OrganizationEvent::new(
            7,
            EventKind::ServiceDeleted,
            json!({"serviceId": 3, "serviceName": "API"}),
        );
        let wire = serde_json::to_value(&event).unwrap();

        assert_eq!(wire["event"], "service:deleted");
        assert_eq!(wire["data"]["serviceId"], 3);
        let timestamp = wire["data"]["timestamp"].as_str().unwrap();
        assert!(timestamp.ends_with('Z'), "unexpected timestamp {timestamp}");
        assert!(wire.get("organizationId").is_none());
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let event = OrganizationEvent::new(1, EventKind::IncidentUpdated, json!(42));
        assert_eq!(event.data["value"], 42);
        assert!(event.data["timestamp"].is_string());
    }

    #[test]
    fn test_parse_client_messages() {
        let join: ClientMessage =
            serde_json::from_str(r#"{"type":"join:organization","organizationId":5}"#).unwrap();
        assert_eq!(join, ClientMessage::JoinOrganization { organization_id: 5 });

        let ping: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ping, ClientMessage::Ping);

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn test_server_message_shape() {
        let wire = serde_json::to_value(ServerMessage::Joined { organization_id: 5 }).unwrap();
        assert_eq!(wire, json!({"event": "joined:organization", "data": {"organizationId": 5}}));
    }
}
