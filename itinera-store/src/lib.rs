pub mod app_config;
pub mod memory;
pub mod notify;
pub mod redis_locks;

pub use app_config::Config;
pub use memory::{InMemoryScheduleStore, InMemoryTicketStore};
pub use notify::BroadcastScheduleNotifier;
pub use redis_locks::RedisSeatLockTable;
