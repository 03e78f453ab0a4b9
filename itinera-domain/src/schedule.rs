use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Plane,
    Bus,
    Train,
    Car,
}

/// An operator-owned vehicle. Admin-created, read-mostly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub vehicle_type: VehicleType,
    pub operator_name: String,
    pub active: bool,
}

/// Seat lifecycle. Available → Blocked → Booked on success,
/// Blocked → Available on rollback. Maintenance is terminal and is
/// never touched by the booking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Blocked,
    Booked,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

/// One seat's inventory entry within a single schedule item. The same
/// physical seat (`seat_id`) appears once per schedule item it is
/// sellable on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatInfo {
    pub seat_id: String,
    pub seat_number: String,
    pub seat_class: SeatClass,
    pub price: i64,
    pub status: SeatStatus,
}

/// Intermediate stop on a multi-leg route, ordered by `sequence`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub sequence: u32,
    pub station_code: String,
}

/// One bookable route combination: a direct leg or a multi-stop
/// through-route, with its own view of the seat inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: Uuid,
    pub source: String,
    pub destination: String,
    pub travel_date: NaiveDate,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub stops: Vec<Stop>,
    pub seats: Vec<SeatInfo>,
}

impl ScheduleItem {
    /// Station codes in travel order: source, stops sorted by sequence,
    /// destination.
    pub fn station_sequence(&self) -> Vec<&str> {
        let mut stops: Vec<&Stop> = self.stops.iter().collect();
        stops.sort_by_key(|s| s.sequence);

        let mut stations = Vec::with_capacity(stops.len() + 2);
        stations.push(self.source.as_str());
        stations.extend(stops.iter().map(|s| s.station_code.as_str()));
        stations.push(self.destination.as_str());
        stations
    }

    pub fn seat(&self, seat_id: &str) -> Option<&SeatInfo> {
        self.seats.iter().find(|s| s.seat_id == seat_id)
    }

    pub fn seat_mut(&mut self, seat_id: &str) -> Option<&mut SeatInfo> {
        self.seats.iter_mut().find(|s| s.seat_id == seat_id)
    }
}

/// Per-vehicle schedule graph: every bookable route combination for one
/// vehicle, with embedded seat inventory. The unit of read/mutate/write
/// for the availability engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelSchedule {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub items: Vec<ScheduleItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TravelSchedule {
    pub fn new(vehicle_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Total seat-inventory entries across all items.
    pub fn total_seats(&self) -> u32 {
        self.items.iter().map(|i| i.seats.len() as u32).sum()
    }

    pub fn available_seats(&self) -> u32 {
        self.items
            .iter()
            .flat_map(|i| i.seats.iter())
            .filter(|s| s.status == SeatStatus::Available)
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_stops(stops: Vec<Stop>) -> ScheduleItem {
        ScheduleItem {
            id: Uuid::new_v4(),
            source: "DEL".to_string(),
            destination: "BLR".to_string(),
            travel_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            departure: Utc::now(),
            arrival: Utc::now(),
            stops,
            seats: Vec::new(),
        }
    }

    #[test]
    fn station_sequence_orders_stops_by_sequence_number() {
        let item = item_with_stops(vec![
            Stop { sequence: 2, station_code: "HYD".to_string() },
            Stop { sequence: 1, station_code: "BOM".to_string() },
        ]);

        assert_eq!(item.station_sequence(), vec!["DEL", "BOM", "HYD", "BLR"]);
    }

    #[test]
    fn station_sequence_for_direct_leg() {
        let item = item_with_stops(Vec::new());
        assert_eq!(item.station_sequence(), vec!["DEL", "BLR"]);
    }
}
