use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::events::{EventKind, OrganizationEvent};

/// Sink for organization-scoped change notifications.
///
/// Publishing is fire-and-forget: it never blocks and never fails the caller.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, organization_id: i32, kind: EventKind, payload: Value);
}

/// Fan-out hub shared by the HTTP services and every WebSocket connection.
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<Arc<OrganizationEvent>>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Open a subscription that has not joined any organization yet.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            organizations: HashSet::new(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for EventHub {
    fn publish(&self, organization_id: i32, kind: EventKind, payload: Value) {
        let event = OrganizationEvent::new(organization_id, kind, payload);
        match self.sender.send(Arc::new(event)) {
            Ok(receivers) => {
                debug!(organization_id, event = %kind, receivers, "Broadcast event")
            }
            Err(_) => debug!(organization_id, event = %kind, "No subscribers for event"),
        }
    }
}

/// One connection's view of the hub, filtered to the organizations it joined.
pub struct Subscription {
    receiver: broadcast::Receiver<Arc<OrganizationEvent>>,
    organizations: HashSet<i32>,
}

impl Subscription {
    /// Returns false when the organization was already joined.
    pub fn join(&mut self, organization_id: i32) -> bool {
        self.organizations.insert(organization_id)
    }

    /// Returns false when the organization was not joined.
    pub fn leave(&mut self, organization_id: i32) -> bool {
        self.organizations.remove(&organization_id)
    }

    pub fn is_joined(&self, organization_id: i32) -> bool {
        self.organizations.contains(&organization_id)
    }

    /// Wait for the next event of a joined organization.
    ///
    /// Returns `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<Arc<OrganizationEvent>> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.organizations.contains(&event.organization_id) => {
                    return Some(event)
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber lagged behind, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
