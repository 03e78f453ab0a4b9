use std::net::SocketAddr;
use std::sync::Arc;

use itinera_api::{app, state::AppState};
use itinera_booking::{
    BookingCoordinator, FlightBookingWorkflow, MockPaymentGateway, SegmentAvailabilityEngine,
    StrategyRegistry, StubBookingStrategy,
};
use itinera_core::SeatLockTable;
use itinera_domain::BookingType;
use itinera_store::{
    BroadcastScheduleNotifier, InMemoryScheduleStore, InMemoryTicketStore, RedisSeatLockTable,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "itinera_api=debug,itinera_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = itinera_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Itinera API on port {}", config.server.port);

    // Seat locks live in Redis so multiple nodes agree on who holds a
    // seat; everything else here is in-memory.
    let locks: Arc<dyn SeatLockTable> =
        Arc::new(
            RedisSeatLockTable::new(&config.redis.url, config.redis.lock_ttl_seconds)
                .expect("Failed to create Redis client"),
        );

    let schedules = Arc::new(InMemoryScheduleStore::new());
    let tickets = Arc::new(InMemoryTicketStore::new());
    let notifier = Arc::new(BroadcastScheduleNotifier::new(
        config.notifier.channel_capacity,
    ));

    let engine = Arc::new(SegmentAvailabilityEngine::new(schedules, notifier));
    let workflow = Arc::new(FlightBookingWorkflow::new(
        engine.clone(),
        tickets,
        Arc::new(MockPaymentGateway::new()),
    ));

    let registry = StrategyRegistry::new()
        .with_strategy(BookingType::Flight, workflow)
        .with_strategy(BookingType::Bus, Arc::new(StubBookingStrategy::new("bus")))
        .with_strategy(BookingType::Train, Arc::new(StubBookingStrategy::new("train")))
        .with_strategy(BookingType::Car, Arc::new(StubBookingStrategy::new("car")));
    let coordinator = Arc::new(BookingCoordinator::new(locks.clone(), registry));

    let app_state = AppState {
        coordinator,
        engine,
        locks,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
