use async_trait::async_trait;

use itinera_domain::ScheduleUpdatedEvent;

use crate::BookingResult;

/// Fire-and-forget schedule change notifications. Callers log and drop
/// any error; publishing must never fail or roll back a save.
#[async_trait]
pub trait ScheduleNotifier: Send + Sync {
    async fn publish(&self, event: &ScheduleUpdatedEvent) -> BookingResult<()>;
}
