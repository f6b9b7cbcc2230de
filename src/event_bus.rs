use thiserror::Error;
use tokio::sync::broadcast;

/// Notifications the integration pushes to the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityEvent {
    /// An entity's state changed and should be re-read immediately, without
    /// waiting for the next refresh cycle.
    StateChanged { entity_id: String },
    /// A coordinator refresh cycle finished.
    RefreshCompleted,
}

#[derive(Error, Debug)]
pub enum EventError {
    #[error("event channel lagged by {count} messages")]
    Lagged { count: u64 },
    #[error("event channel closed")]
    Closed,
}

pub struct EventBus {
    sender: broadcast::Sender<EntityEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe())
    }

    /// Fire-and-forget: with no host subscribed, the event is dropped.
    pub fn publish(&self, event: EntityEvent) {
        let _ = self.sender.send(event);
    }
}

pub struct EventReceiver {
    receiver: broadcast::Receiver<EntityEvent>,
}

impl EventReceiver {
    fn new(receiver: broadcast::Receiver<EntityEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event. On lag the receiver resubscribes so the next
    /// call sees live events again, and the lag is reported to the caller.
    pub async fn recv(&mut self) -> Result<EntityEvent, EventError> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(count)) => {
                self.receiver = self.receiver.resubscribe();
                Err(EventError::Lagged { count })
            }
            Err(broadcast::error::RecvError::Closed) => Err(EventError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut receiver = bus.subscribe();

        bus.publish(EntityEvent::StateChanged {
            entity_id: "kia_uvo_v1_ev_battery_precondition_enabled".to_string(),
        });

        let event = receiver.recv().await.unwrap();
        assert_eq!(
            event,
            EntityEvent::StateChanged {
                entity_id: "kia_uvo_v1_ev_battery_precondition_enabled".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let bus = EventBus::new(16);
        // Must not panic or error.
        bus.publish(EntityEvent::RefreshCompleted);

        let mut receiver = bus.subscribe();
        bus.publish(EntityEvent::RefreshCompleted);
        assert_eq!(receiver.recv().await.unwrap(), EntityEvent::RefreshCompleted);
    }
}
