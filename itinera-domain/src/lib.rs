pub mod events;
pub mod request;
pub mod schedule;
pub mod ticket;

pub use events::ScheduleUpdatedEvent;
pub use request::{BookingDetails, BookingRequest, FlightDetails, GroundDetails};
pub use schedule::{
    ScheduleItem, SeatClass, SeatInfo, SeatStatus, Stop, TravelSchedule, Vehicle, VehicleType,
};
pub use ticket::{BookingStatus, BookingType, PaymentStatus, Ticket};
