use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::TravelSchedule;

/// Fire-and-forget notification emitted after every schedule save.
/// Consumers must tolerate loss; publishing failure never rolls back
/// the save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleUpdatedEvent {
    pub event_type: String,
    pub schedule_id: Uuid,
    pub vehicle_id: Uuid,
    pub timestamp: i64,
    pub total_seats: u32,
    pub available_seats: u32,
}

impl ScheduleUpdatedEvent {
    pub fn new(event_type: &str, schedule: &TravelSchedule) -> Self {
        Self {
            event_type: event_type.to_string(),
            schedule_id: schedule.id,
            vehicle_id: schedule.vehicle_id,
            timestamp: chrono::Utc::now().timestamp(),
            total_seats: schedule.total_seats(),
            available_seats: schedule.available_seats(),
        }
    }
}
