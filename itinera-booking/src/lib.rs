pub mod availability;
pub mod coordinator;
pub mod flight;
pub mod payments;
pub mod strategy;

pub use availability::SegmentAvailabilityEngine;
pub use coordinator::BookingCoordinator;
pub use flight::FlightBookingWorkflow;
pub use payments::MockPaymentGateway;
pub use strategy::{BookingStrategy, StrategyRegistry, StubBookingStrategy};
