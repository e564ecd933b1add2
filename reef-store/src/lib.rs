//! reef-store: data-access layer for the Reef link-sharing application
//!
//! Wraps PostgreSQL (accounts, follow edges) and Redis (session tickets,
//! reminder counters) behind injected-handle repositories. No process-wide
//! state: every component borrows its pool from the [`Store`] facade or
//! receives one directly.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod view;

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use reef_core::models::User;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use events::{FollowEvents, NoopEvents};

/// Shared storage handles for one application process.
///
/// Cloning is cheap; both underlying handles are pooled/multiplexed.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
    cache: ConnectionManager,
    events: Arc<dyn FollowEvents>,
}

impl Store {
    /// Connect both backends described by `config`.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let pool = db::pool::create_pool_with_options(
            &config.database_url,
            config.max_connections,
            config.acquire_timeout(),
        )
        .await?;
        let cache = cache::connect(&config.cache_url).await?;
        Ok(Self {
            pool,
            cache,
            events: Arc::new(NoopEvents),
        })
    }

    /// Attach a follow-event listener (default: none).
    pub fn with_events(mut self, events: Arc<dyn FollowEvents>) -> Self {
        self.events = events;
        self
    }

    /// Create tables and indexes if they don't exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        db::migrations::run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn users(&self) -> db::UserRepo<'_> {
        db::UserRepo::new(&self.pool)
    }

    pub fn follows(&self) -> db::FollowRepo<'_> {
        db::FollowRepo::new(&self.pool).with_events(Arc::clone(&self.events))
    }

    pub fn reminders(&self) -> cache::ReminderStore {
        cache::ReminderStore::new(self.cache.clone())
    }

    pub fn tickets(&self) -> cache::TicketStore {
        cache::TicketStore::new(self.cache.clone())
    }

    /// Resolve a session ticket to its user row.
    ///
    /// Unknown tickets and vanished users both read as `None`.
    pub async fn user_by_ticket(&self, ticket: &str) -> StoreResult<Option<User>> {
        let Some(id) = self.tickets().resolve(ticket).await? else {
            return Ok(None);
        };
        self.users().by_id(id).await
    }
}
