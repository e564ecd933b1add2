//! Session-ticket resolution
//!
//! Tickets are opaque strings issued elsewhere; the cache maps each one
//! straight to a user id. This layer only ever reads them.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use reef_core::models::UserId;

use crate::error::{StoreError, StoreResult};

/// Ticket lookup store
#[derive(Clone)]
pub struct TicketStore {
    conn: ConnectionManager,
}

impl TicketStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Resolve a ticket to the user id it was issued for.
    ///
    /// Unknown or empty tickets are `None`, not an error.
    pub async fn resolve(&self, ticket: &str) -> StoreResult<Option<UserId>> {
        if ticket.is_empty() {
            return Ok(None);
        }

        let mut conn = self.conn.clone();
        let id: Option<UserId> = conn
            .get(ticket)
            .await
            .map_err(|err| StoreError::from(err).traced("ticket resolve"))?;
        Ok(id.filter(|id| *id > 0))
    }
}
