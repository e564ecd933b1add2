//! Companion-subsystem notifications
//!
//! Follow-graph changes interest other subsystems (the link feed fanout,
//! reminder producers). Deliveries are fire-and-forget: the repositories
//! run them on a detached task after the storage transaction commits, so
//! a slow or failing listener can never block or fail the primary
//! operation.

use async_trait::async_trait;

use reef_core::models::UserId;

/// Listener for committed follow-graph changes.
#[async_trait]
pub trait FollowEvents: Send + Sync + 'static {
    async fn followed(&self, user_id: UserId, follow_id: UserId);

    async fn unfollowed(&self, user_id: UserId, follow_id: UserId);
}

/// Default listener that drops every event.
pub struct NoopEvents;

#[async_trait]
impl FollowEvents for NoopEvents {
    async fn followed(&self, _user_id: UserId, _follow_id: UserId) {}

    async fn unfollowed(&self, _user_id: UserId, _follow_id: UserId) {}
}
