use async_trait::async_trait;
use uuid::Uuid;

use itinera_domain::{Ticket, TravelSchedule};

use crate::BookingResult;

/// Store trait for the per-vehicle schedule graph. A whole
/// `TravelSchedule` is the unit of write: implementations must persist
/// the aggregate atomically so the engine's all-or-nothing seat updates
/// hold.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn save(&self, schedule: TravelSchedule) -> BookingResult<TravelSchedule>;

    async fn find_by_id(&self, id: Uuid) -> BookingResult<Option<TravelSchedule>>;

    async fn find_by_vehicle_id(&self, vehicle_id: Uuid) -> BookingResult<Vec<TravelSchedule>>;

    async fn find_all(&self) -> BookingResult<Vec<TravelSchedule>>;

    async fn exists_by_id(&self, id: Uuid) -> BookingResult<bool>;

    async fn delete_by_id(&self, id: Uuid) -> BookingResult<()>;
}

/// Store trait for tickets. Lookups are always scoped to the owning
/// user.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn save(&self, ticket: Ticket) -> BookingResult<Ticket>;

    async fn find_by_id_and_user(
        &self,
        ticket_id: Uuid,
        user_id: &str,
    ) -> BookingResult<Option<Ticket>>;
}
