//! Per-user reminder counters
//!
//! One hash per user (`rd:{id}`) with one integer field per category.
//! HINCRBY keeps concurrent increments lossless; acknowledging a category
//! removes its field, so a hash that never existed reads as all zeros.

use std::collections::HashMap;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use reef_core::models::{RemindCounts, RemindKind, UserId};

use crate::error::{StoreError, StoreResult};

/// Reminder counter store
#[derive(Clone)]
pub struct ReminderStore {
    conn: ConnectionManager,
}

impl ReminderStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(user_id: UserId) -> String {
        format!("rd:{}", user_id)
    }

    /// Bump one category, returning the new value.
    ///
    /// The hash and field are created on first use, starting from zero.
    pub async fn incr(&self, user_id: UserId, kind: RemindKind) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn
            .hincr(Self::key(user_id), kind.field(), 1)
            .await
            .map_err(|err| StoreError::from(err).traced("reminder incr"))?;
        Ok(value)
    }

    /// Acknowledge one category by removing its field entirely.
    pub async fn reset(&self, user_id: UserId, kind: RemindKind) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _removed: i64 = conn
            .hdel(Self::key(user_id), kind.field())
            .await
            .map_err(|err| StoreError::from(err).traced("reminder reset"))?;
        Ok(())
    }

    /// Read all counters; a user with no reminder activity is all zeros.
    pub async fn counts(&self, user_id: UserId) -> StoreResult<RemindCounts> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, i64> = conn
            .hgetall(Self::key(user_id))
            .await
            .map_err(|err| StoreError::from(err).traced("reminder read"))?;

        let mut counts = RemindCounts::default();
        for kind in RemindKind::ALL {
            if let Some(value) = fields.get(kind.field()) {
                counts.set(kind, *value);
            }
        }
        Ok(counts)
    }
}
