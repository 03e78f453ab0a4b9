use std::sync::Arc;

use itinera_booking::{BookingCoordinator, SegmentAvailabilityEngine};
use itinera_core::SeatLockTable;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<BookingCoordinator>,
    pub engine: Arc<SegmentAvailabilityEngine>,
    pub locks: Arc<dyn SeatLockTable>,
}
