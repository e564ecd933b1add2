//! Follow-edge repository
//!
//! Maintains the directed `user_follows` edges and the denormalized
//! friend/follower counters. An edge mutation and its counter deltas
//! commit in one transaction, so an edge can never exist without its
//! counters.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use reef_core::models::{CounterField, Relationship, UserId, ValidationError};

use crate::error::{StoreError, StoreResult};
use crate::events::FollowEvents;

use super::users::apply_counter_delta;

/// Directed follow edge as stored.
#[derive(Debug, Clone, FromRow)]
pub struct FollowEdge {
    pub user_id: UserId,
    pub follow_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Follow repository
pub struct FollowRepo<'a> {
    pool: &'a PgPool,
    events: Option<Arc<dyn FollowEvents>>,
}

impl<'a> FollowRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool, events: None }
    }

    /// Attach a listener notified after each committed change.
    pub fn with_events(mut self, events: Arc<dyn FollowEvents>) -> Self {
        self.events = Some(events);
        self
    }

    /// `user_id` starts following `follow_id`.
    ///
    /// Duplicate edges surface as `StoreError::AlreadyFollowing` with no
    /// counter mutation. The listener fires on a detached task once the
    /// transaction has committed.
    pub async fn follow(&self, user_id: UserId, follow_id: UserId) -> StoreResult<()> {
        check_pair(user_id, follow_id)?;

        self.follow_tx(user_id, follow_id)
            .await
            .map_err(|err| err.traced("follow"))?;

        if let Some(events) = &self.events {
            let events = Arc::clone(events);
            tokio::spawn(async move {
                events.followed(user_id, follow_id).await;
            });
        }
        Ok(())
    }

    async fn follow_tx(&self, user_id: UserId, follow_id: UserId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO user_follows (user_id, follow_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, follow_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(follow_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(StoreError::AlreadyFollowing(follow_id));
        }

        apply_counter_delta(&mut *tx, user_id, CounterField::Friends, 1).await?;
        apply_counter_delta(&mut *tx, follow_id, CounterField::Followers, 1).await?;
        tx.commit().await?;
        Ok(())
    }

    /// `user_id` stops following `follow_id`.
    ///
    /// Removing an edge that doesn't exist is `Ok(false)`, not an error.
    pub async fn unfollow(&self, user_id: UserId, follow_id: UserId) -> StoreResult<bool> {
        check_pair(user_id, follow_id)?;

        let removed = self
            .unfollow_tx(user_id, follow_id)
            .await
            .map_err(|err| err.traced("unfollow"))?;

        if removed {
            if let Some(events) = &self.events {
                let events = Arc::clone(events);
                tokio::spawn(async move {
                    events.unfollowed(user_id, follow_id).await;
                });
            }
        }
        Ok(removed)
    }

    async fn unfollow_tx(&self, user_id: UserId, follow_id: UserId) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM user_follows WHERE user_id = $1 AND follow_id = $2")
            .bind(user_id)
            .bind(follow_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        apply_counter_delta(&mut *tx, user_id, CounterField::Friends, -1).await?;
        apply_counter_delta(&mut *tx, follow_id, CounterField::Followers, -1).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Classify how `subject_id` relates to `viewer_id`.
    ///
    /// Two independent existence probes; evaluation order doesn't matter.
    pub async fn relationship(
        &self,
        viewer_id: UserId,
        subject_id: UserId,
    ) -> StoreResult<Relationship> {
        let is_followed = self.exists(viewer_id, subject_id).await?;
        let is_follower = self.exists(subject_id, viewer_id).await?;
        Ok(Relationship::new(is_follower, is_followed))
    }

    /// Whether the directed edge `user_id -> follow_id` exists.
    pub async fn exists(&self, user_id: UserId, follow_id: UserId) -> StoreResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM user_follows WHERE user_id = $1 AND follow_id = $2)",
        )
        .bind(user_id)
        .bind(follow_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Fetch the stored edge, timestamp included.
    pub async fn edge(
        &self,
        user_id: UserId,
        follow_id: UserId,
    ) -> StoreResult<Option<FollowEdge>> {
        let edge = sqlx::query_as::<_, FollowEdge>(
            "SELECT user_id, follow_id, created_at FROM user_follows \
             WHERE user_id = $1 AND follow_id = $2",
        )
        .bind(user_id)
        .bind(follow_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(edge)
    }
}

/// Reject non-positive or self-referential id pairs before any storage
/// call.
fn check_pair(user_id: UserId, follow_id: UserId) -> Result<(), ValidationError> {
    if user_id < 1 {
        return Err(ValidationError::MissingId { field: "user_id" });
    }
    if follow_id < 1 {
        return Err(ValidationError::MissingId { field: "follow_id" });
    }
    if user_id == follow_id {
        return Err(ValidationError::SelfReference);
    }
    Ok(())
}
