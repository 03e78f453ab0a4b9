use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ticket::BookingType;

/// Travel details for a flight booking. `flight_id` doubles as the
/// vehicle id of the scheduled aircraft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightDetails {
    pub flight_id: Uuid,
    pub seat_id: String,
    pub source: String,
    pub destination: String,
    pub travel_date: NaiveDate,
    pub flight_time: DateTime<Utc>,
}

/// Placeholder details for the stubbed ground-transport variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundDetails {
    pub vehicle_id: Uuid,
    pub source: String,
    pub destination: String,
    pub travel_date: NaiveDate,
}

/// Closed variant set of per-mode travel details. New modes are added
/// here, never through an open hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "booking_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingDetails {
    Flight(FlightDetails),
    Bus(GroundDetails),
    Train(GroundDetails),
    Car(GroundDetails),
}

impl BookingDetails {
    pub fn booking_type(&self) -> BookingType {
        match self {
            BookingDetails::Flight(_) => BookingType::Flight,
            BookingDetails::Bus(_) => BookingType::Bus,
            BookingDetails::Train(_) => BookingType::Train,
            BookingDetails::Car(_) => BookingType::Car,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub details: BookingDetails,
}

impl BookingRequest {
    pub fn booking_type(&self) -> BookingType {
        self.details.booking_type()
    }
}
