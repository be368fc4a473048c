//! Organization-scoped real-time notifications over WebSocket

pub mod events;
mod hub;
mod socket;

use thiserror::Error;

pub use events::{ClientMessage, EventKind, OrganizationEvent, ServerMessage};
pub use hub::{EventHub, EventPublisher, Subscription};
pub use socket::{create_router, handle_client_message, parse_error, RealtimeAppState};

#[derive(Error, Debug)]
pub enum RealtimeError {
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to send message: {0}")]
    Send(#[source] axum::Error),
}
