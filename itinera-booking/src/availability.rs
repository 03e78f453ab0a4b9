use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use itinera_core::{BookingError, BookingResult, ScheduleNotifier, ScheduleStore};
use itinera_domain::{ScheduleItem, ScheduleUpdatedEvent, SeatInfo, SeatStatus, TravelSchedule};

/// Finds seats in the per-vehicle schedule graph, detects when two route
/// segments physically overlap, and transitions seat status across every
/// overlapping segment in one all-or-nothing schedule write.
///
/// Every mutation rewrites the whole `TravelSchedule` aggregate, so
/// writes for the same vehicle are serialized through a per-vehicle
/// gate: without it, two parallel bookings for *different* seats would
/// each load the same snapshot and the later save would erase the
/// earlier seat transition.
pub struct SegmentAvailabilityEngine {
    schedules: Arc<dyn ScheduleStore>,
    notifier: Arc<dyn ScheduleNotifier>,
    write_gates: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl SegmentAvailabilityEngine {
    pub fn new(schedules: Arc<dyn ScheduleStore>, notifier: Arc<dyn ScheduleNotifier>) -> Self {
        Self {
            schedules,
            notifier,
            write_gates: Mutex::new(HashMap::new()),
        }
    }

    fn write_gate(&self, vehicle_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self
            .write_gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        gates
            .entry(vehicle_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Seats currently Available anywhere on the vehicle's schedule,
    /// one entry per physical seat.
    pub async fn available_seats(&self, vehicle_id: Uuid) -> BookingResult<Vec<SeatInfo>> {
        let schedule = self.load_schedule(vehicle_id).await?;

        let mut seen = HashSet::new();
        let mut open = Vec::new();
        for item in &schedule.items {
            for seat in &item.seats {
                if seat.status == SeatStatus::Available && seen.insert(seat.seat_id.clone()) {
                    open.push(seat.clone());
                }
            }
        }
        Ok(open)
    }

    /// Reserve a seat for one route segment: the seat goes Blocked on
    /// every schedule item that geographically overlaps the requested
    /// segment, but only if it is Available in all of them. Any
    /// non-Available copy aborts the whole operation with no partial
    /// write. Returns false when the reservation cannot be made.
    pub async fn book_seat_for_segment(
        &self,
        vehicle_id: Uuid,
        travel_date: NaiveDate,
        seat_id: &str,
        source: &str,
        destination: &str,
    ) -> BookingResult<bool> {
        let gate = self.write_gate(vehicle_id);
        let _write = gate.lock().await;
        let mut schedule = self.load_schedule(vehicle_id).await?;

        // The requested combination itself must be sellable.
        let requested_exists = schedule.items.iter().any(|item| {
            item.travel_date == travel_date
                && item.source == source
                && item.destination == destination
                && item.seat(seat_id).is_some()
        });
        if !requested_exists {
            info!(%vehicle_id, seat_id, source, destination, "requested segment is not a bookable combination");
            return Ok(false);
        }

        let targets: Vec<usize> = schedule
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                item.travel_date == travel_date
                    && item.seat(seat_id).is_some()
                    && segments_overlap(item, source, destination)
            })
            .map(|(idx, _)| idx)
            .collect();

        let all_available = targets.iter().all(|&idx| {
            schedule.items[idx]
                .seat(seat_id)
                .map(|s| s.status == SeatStatus::Available)
                .unwrap_or(false)
        });
        if !all_available {
            info!(%vehicle_id, seat_id, source, destination, "seat already taken on an overlapping segment");
            return Ok(false);
        }

        for &idx in &targets {
            if let Some(seat) = schedule.items[idx].seat_mut(seat_id) {
                seat.status = SeatStatus::Blocked;
            }
        }
        schedule.touch();
        self.save_and_notify(schedule, "SEAT_BLOCKED").await?;
        Ok(true)
    }

    /// Blocked → Booked across every Blocked copy of the seat. Fails
    /// with an invalid-state error if the seat is not currently Blocked
    /// anywhere.
    pub async fn confirm_blocked_seat(
        &self,
        vehicle_id: Uuid,
        seat_id: &str,
    ) -> BookingResult<TravelSchedule> {
        self.transition_blocked(vehicle_id, seat_id, SeatStatus::Booked, "SEAT_BOOKED", true)
            .await
    }

    /// Rollback path: Blocked → Available across every Blocked copy.
    /// Booked copies of the same seat on disjoint segments are never
    /// touched. Idempotent so a second compensation attempt is harmless.
    pub async fn release_blocked_seat(
        &self,
        vehicle_id: Uuid,
        seat_id: &str,
    ) -> BookingResult<TravelSchedule> {
        self.transition_blocked(vehicle_id, seat_id, SeatStatus::Available, "SEAT_RELEASED", false)
            .await
    }

    /// Forced admin setter: every copy of the seat takes `status`,
    /// Maintenance copies excepted. Used by the operator release path
    /// that exists because locks have no automatic expiry.
    pub async fn update_seat_status(
        &self,
        vehicle_id: Uuid,
        seat_id: &str,
        status: SeatStatus,
    ) -> BookingResult<TravelSchedule> {
        let gate = self.write_gate(vehicle_id);
        let _write = gate.lock().await;
        let mut schedule = self.load_schedule(vehicle_id).await?;

        let mut found = false;
        for item in &mut schedule.items {
            if let Some(seat) = item.seat_mut(seat_id) {
                found = true;
                if seat.status != SeatStatus::Maintenance {
                    seat.status = status;
                }
            }
        }
        if !found {
            return Err(BookingError::NotFound(format!(
                "seat {seat_id} not found on vehicle {vehicle_id}"
            )));
        }

        schedule.touch();
        self.save_and_notify(schedule, "SEAT_STATUS_RESET").await
    }

    async fn transition_blocked(
        &self,
        vehicle_id: Uuid,
        seat_id: &str,
        to: SeatStatus,
        event_type: &str,
        require_blocked: bool,
    ) -> BookingResult<TravelSchedule> {
        let gate = self.write_gate(vehicle_id);
        let _write = gate.lock().await;
        let mut schedule = self.load_schedule(vehicle_id).await?;

        let mut transitioned = 0;
        for item in &mut schedule.items {
            if let Some(seat) = item.seat_mut(seat_id) {
                if seat.status == SeatStatus::Blocked {
                    seat.status = to;
                    transitioned += 1;
                }
            }
        }

        if transitioned == 0 {
            if require_blocked {
                return Err(BookingError::InvalidState(format!(
                    "seat {seat_id} on vehicle {vehicle_id} is not blocked"
                )));
            }
            return Ok(schedule);
        }

        schedule.touch();
        self.save_and_notify(schedule, event_type).await
    }

    async fn load_schedule(&self, vehicle_id: Uuid) -> BookingResult<TravelSchedule> {
        let schedules = self.schedules.find_by_vehicle_id(vehicle_id).await?;
        // One schedule per vehicle id.
        schedules.into_iter().next().ok_or_else(|| {
            BookingError::NotFound(format!("no schedule for vehicle {vehicle_id}"))
        })
    }

    async fn save_and_notify(
        &self,
        schedule: TravelSchedule,
        event_type: &str,
    ) -> BookingResult<TravelSchedule> {
        let saved = self.schedules.save(schedule).await?;

        let event = ScheduleUpdatedEvent::new(event_type, &saved);
        if let Err(err) = self.notifier.publish(&event).await {
            warn!(schedule_id = %saved.id, "schedule notification dropped: {err}");
        }
        Ok(saved)
    }
}

/// Geographic overlap test between a candidate schedule item and a
/// requested segment. Build the item's station sequence, locate both the
/// item's and the request's endpoints in it, and compare index ranges:
/// the item is unaffected only when the requested range sits entirely
/// before its start or after its end. This generalizes leg equality to
/// multi-stop routes: DEL→BLR on a DEL–BOM–BLR flight overlaps DEL→BOM,
/// BOM→BLR and the through-route itself.
fn segments_overlap(item: &ScheduleItem, source: &str, destination: &str) -> bool {
    let stations = item.station_sequence();

    let s_idx = match stations.iter().position(|c| *c == item.source) {
        Some(idx) => idx,
        None => return false,
    };
    let d_idx = match stations.iter().rposition(|c| *c == item.destination) {
        Some(idx) => idx,
        None => return false,
    };
    let r_src = match stations.iter().position(|c| *c == source) {
        Some(idx) => idx,
        None => return false,
    };
    let r_dst = match stations.iter().position(|c| *c == destination) {
        Some(idx) => idx,
        None => return false,
    };

    !(r_dst <= s_idx || r_src >= d_idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use itinera_domain::{SeatClass, Stop};

    fn seat(seat_id: &str) -> SeatInfo {
        SeatInfo {
            seat_id: seat_id.to_string(),
            seat_number: seat_id.to_string(),
            seat_class: SeatClass::Economy,
            price: 5000,
            status: SeatStatus::Available,
        }
    }

    fn item(source: &str, destination: &str, stops: Vec<&str>) -> ScheduleItem {
        ScheduleItem {
            id: Uuid::new_v4(),
            source: source.to_string(),
            destination: destination.to_string(),
            travel_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            departure: Utc::now(),
            arrival: Utc::now(),
            stops: stops
                .into_iter()
                .enumerate()
                .map(|(i, code)| Stop {
                    sequence: i as u32 + 1,
                    station_code: code.to_string(),
                })
                .collect(),
            seats: vec![seat("S1"), seat("S2")],
        }
    }

    #[test]
    fn through_route_overlaps_itself() {
        let through = item("DEL", "BLR", vec!["BOM"]);
        assert!(segments_overlap(&through, "DEL", "BLR"));
    }

    #[test]
    fn legs_overlap_the_through_route() {
        let through = item("DEL", "BLR", vec!["BOM"]);
        assert!(segments_overlap(&through, "DEL", "BOM"));
        assert!(segments_overlap(&through, "BOM", "BLR"));
    }

    #[test]
    fn absent_endpoint_means_no_overlap() {
        let leg = item("DEL", "BOM", vec![]);
        assert!(!segments_overlap(&leg, "DEL", "BLR"));
        assert!(!segments_overlap(&leg, "HYD", "BOM"));
    }

    #[test]
    fn reverse_direction_does_not_overlap() {
        let through = item("DEL", "BLR", vec!["BOM"]);
        assert!(!segments_overlap(&through, "BLR", "DEL"));
        assert!(!segments_overlap(&through, "BOM", "DEL"));
    }

    #[test]
    fn disjoint_subsegments_of_a_long_route_still_overlap_it() {
        let long = item("DEL", "MAA", vec!["BOM", "BLR"]);
        assert!(segments_overlap(&long, "DEL", "BOM"));
        assert!(segments_overlap(&long, "BOM", "BLR"));
        assert!(segments_overlap(&long, "BLR", "MAA"));
    }
}
