use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use itinera_core::{BookingResult, ScheduleNotifier};
use itinera_domain::ScheduleUpdatedEvent;

/// In-process fan-out of schedule change events over a broadcast
/// channel. Subscribers come and go freely; publishing to an empty
/// channel is not an error.
pub struct BroadcastScheduleNotifier {
    tx: broadcast::Sender<ScheduleUpdatedEvent>,
}

impl BroadcastScheduleNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScheduleUpdatedEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl ScheduleNotifier for BroadcastScheduleNotifier {
    async fn publish(&self, event: &ScheduleUpdatedEvent) -> BookingResult<()> {
        // Send only fails when nobody is subscribed, which is fine for
        // fire-and-forget delivery.
        if self.tx.send(event.clone()).is_err() {
            debug!(event_type = %event.event_type, "no notification subscribers");
        }
        Ok(())
    }
}
