//! View-model decoration
//!
//! Turns raw user rows into viewer-relative view models just before
//! rendering. Pure apart from the relationship lookup, which only runs
//! when a signed-in viewer looks at somebody else.

use reef_core::models::{Relationship, User, UserId, ViewUser};

use crate::db::FollowRepo;
use crate::error::StoreResult;

/// Decorate one user for the given viewer.
pub async fn decorate(
    follows: &FollowRepo<'_>,
    user: User,
    viewer_id: Option<UserId>,
) -> StoreResult<ViewUser> {
    let relation = match viewer_id {
        Some(viewer) if viewer > 0 && viewer != user.id => {
            follows.relationship(viewer, user.id).await?
        }
        _ => Relationship::default(),
    };
    Ok(ViewUser::new(user, viewer_id, relation))
}

/// Decorate a whole listing; empty input never touches storage.
pub async fn decorate_all(
    follows: &FollowRepo<'_>,
    users: Vec<User>,
    viewer_id: Option<UserId>,
) -> StoreResult<Vec<ViewUser>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut views = Vec::with_capacity(users.len());
    for user in users {
        views.push(decorate(follows, user, viewer_id).await?);
    }
    Ok(views)
}
