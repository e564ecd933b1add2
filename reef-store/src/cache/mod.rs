//! Key-value cache layer - session tickets and reminder counters
//!
//! Backed by Redis through a multiplexed `ConnectionManager`. Absent keys
//! read as empty values, never errors.

pub mod reminders;
pub mod tickets;

pub use reminders::ReminderStore;
pub use tickets::TicketStore;

use redis::aio::ConnectionManager;

/// Connect to the cache backend.
///
/// The manager multiplexes one TCP connection and reconnects on failure;
/// clones are cheap handles onto it.
pub async fn connect(cache_url: &str) -> Result<ConnectionManager, redis::RedisError> {
    let client = redis::Client::open(cache_url)?;
    ConnectionManager::new(client).await
}
