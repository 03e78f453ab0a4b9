use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use itinera_core::{BookingResult, ScheduleStore, TicketStore};
use itinera_domain::{Ticket, TravelSchedule};

/// In-memory schedule store. Saves replace the whole aggregate under a
/// write lock, which gives the engine its all-or-nothing write.
pub struct InMemoryScheduleStore {
    schedules: RwLock<HashMap<Uuid, TravelSchedule>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self {
            schedules: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn save(&self, schedule: TravelSchedule) -> BookingResult<TravelSchedule> {
        let mut schedules = self.schedules.write().await;
        schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn find_by_id(&self, id: Uuid) -> BookingResult<Option<TravelSchedule>> {
        Ok(self.schedules.read().await.get(&id).cloned())
    }

    async fn find_by_vehicle_id(&self, vehicle_id: Uuid) -> BookingResult<Vec<TravelSchedule>> {
        Ok(self
            .schedules
            .read()
            .await
            .values()
            .filter(|s| s.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> BookingResult<Vec<TravelSchedule>> {
        Ok(self.schedules.read().await.values().cloned().collect())
    }

    async fn exists_by_id(&self, id: Uuid) -> BookingResult<bool> {
        Ok(self.schedules.read().await.contains_key(&id))
    }

    async fn delete_by_id(&self, id: Uuid) -> BookingResult<()> {
        self.schedules.write().await.remove(&id);
        Ok(())
    }
}

/// In-memory ticket store keyed by ticket id.
pub struct InMemoryTicketStore {
    tickets: RwLock<HashMap<Uuid, Ticket>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self {
            tickets: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn save(&self, ticket: Ticket) -> BookingResult<Ticket> {
        let mut tickets = self.tickets.write().await;
        tickets.insert(ticket.ticket_id, ticket.clone());
        Ok(ticket)
    }

    async fn find_by_id_and_user(
        &self,
        ticket_id: Uuid,
        user_id: &str,
    ) -> BookingResult<Option<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .get(&ticket_id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_domain::BookingType;

    #[tokio::test]
    async fn schedule_round_trip_by_vehicle() {
        let store = InMemoryScheduleStore::new();
        let vehicle_id = Uuid::new_v4();

        let schedule = TravelSchedule::new(vehicle_id);
        let schedule_id = schedule.id;
        store.save(schedule).await.unwrap();

        assert!(store.exists_by_id(schedule_id).await.unwrap());
        let found = store.find_by_vehicle_id(vehicle_id).await.unwrap();
        assert_eq!(found.len(), 1);

        store.delete_by_id(schedule_id).await.unwrap();
        assert!(store.find_by_id(schedule_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ticket_lookup_is_scoped_to_the_owner() {
        let store = InMemoryTicketStore::new();
        let ticket = Ticket::new(
            "user-1".to_string(),
            BookingType::Flight,
            Uuid::new_v4(),
            "S1".to_string(),
            5000,
            "ABC123".to_string(),
            serde_json::json!({}),
        );
        let ticket_id = ticket.ticket_id;
        store.save(ticket).await.unwrap();

        assert!(store
            .find_by_id_and_user(ticket_id, "user-1")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_id_and_user(ticket_id, "someone-else")
            .await
            .unwrap()
            .is_none());
    }
}
