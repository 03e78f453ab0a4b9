use chrono::{DateTime, Utc};
use uuid::Uuid;

use itinera_domain::BookingDetails;

use crate::{BookingError, BookingResult};

/// Single formatter behind both key constructions, so the resolver and
/// the primitive overload can never drift apart.
fn format_key(flight_id: Uuid, seat_id: &str, flight_time: DateTime<Utc>) -> String {
    format!("{}:{}:{}", flight_id, seat_id, flight_time.timestamp())
}

/// Derive the canonical lock key for a booking request. Closed over the
/// variant set; modes without a seat-level lock rule are rejected.
pub fn seat_key_for(details: &BookingDetails) -> BookingResult<String> {
    match details {
        BookingDetails::Flight(flight) => Ok(format_key(
            flight.flight_id,
            &flight.seat_id,
            flight.flight_time,
        )),
        other => Err(BookingError::Unsupported(format!(
            "{:?} bookings have no seat lock rule",
            other.booking_type()
        ))),
    }
}

/// Build the same key from primitives, for out-of-band release and
/// status operations.
pub fn seat_key_from_parts(flight_id: Uuid, seat_id: &str, flight_time: DateTime<Utc>) -> String {
    format_key(flight_id, seat_id, flight_time)
}

/// Parse a `{flight_id}:{seat_id}:{epoch_seconds}` lock key, as sent to
/// the admin release endpoint. Seat ids may themselves contain `:`; the
/// first and last separators are structural.
pub fn parse_seat_key(key: &str) -> BookingResult<(Uuid, String, i64)> {
    let (flight_part, rest) = key
        .split_once(':')
        .ok_or_else(|| BookingError::InvalidState(format!("malformed seat key: {key}")))?;
    let (seat_part, time_part) = rest
        .rsplit_once(':')
        .ok_or_else(|| BookingError::InvalidState(format!("malformed seat key: {key}")))?;

    let flight_id = Uuid::parse_str(flight_part)
        .map_err(|_| BookingError::InvalidState(format!("malformed seat key: {key}")))?;
    let epoch = time_part
        .parse::<i64>()
        .map_err(|_| BookingError::InvalidState(format!("malformed seat key: {key}")))?;
    if seat_part.is_empty() {
        return Err(BookingError::InvalidState(format!("malformed seat key: {key}")));
    }

    Ok((flight_id, seat_part.to_string(), epoch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use itinera_domain::{FlightDetails, GroundDetails};

    fn flight_details(flight_id: Uuid, seat_id: &str, flight_time: DateTime<Utc>) -> BookingDetails {
        BookingDetails::Flight(FlightDetails {
            flight_id,
            seat_id: seat_id.to_string(),
            source: "DEL".to_string(),
            destination: "BOM".to_string(),
            travel_date: flight_time.date_naive(),
            flight_time,
        })
    }

    #[test]
    fn resolver_and_primitive_overload_agree() {
        let flight_id = Uuid::new_v4();
        let flight_time = Utc.with_ymd_and_hms(2026, 9, 1, 6, 30, 0).unwrap();

        let from_details =
            seat_key_for(&flight_details(flight_id, "S1", flight_time)).unwrap();
        let from_parts = seat_key_from_parts(flight_id, "S1", flight_time);

        assert_eq!(from_details, from_parts);
    }

    #[test]
    fn key_parses_back_to_its_parts() {
        let flight_id = Uuid::new_v4();
        let flight_time = Utc.with_ymd_and_hms(2026, 9, 1, 6, 30, 0).unwrap();

        let key = seat_key_from_parts(flight_id, "12A", flight_time);
        let (parsed_flight, parsed_seat, parsed_epoch) = parse_seat_key(&key).unwrap();

        assert_eq!(parsed_flight, flight_id);
        assert_eq!(parsed_seat, "12A");
        assert_eq!(parsed_epoch, flight_time.timestamp());
    }

    #[test]
    fn non_flight_details_are_unsupported() {
        let details = BookingDetails::Bus(GroundDetails {
            vehicle_id: Uuid::new_v4(),
            source: "DEL".to_string(),
            destination: "JAI".to_string(),
            travel_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        });

        assert!(matches!(
            seat_key_for(&details),
            Err(crate::BookingError::Unsupported(_))
        ));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(parse_seat_key("not-a-key").is_err());
        assert!(parse_seat_key("abc:S1:notatime").is_err());
        assert!(parse_seat_key(&format!("{}::123", Uuid::new_v4())).is_err());
    }
}
