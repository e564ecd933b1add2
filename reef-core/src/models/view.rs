//! View-model decoration of a user

use serde::Serialize;

use super::{Relationship, User, UserId};

/// A user as seen by the current viewer.
///
/// Built per request just before rendering; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ViewUser {
    #[serde(flatten)]
    pub user: User,
    /// The viewer is looking at their own profile
    pub is_me: bool,
    #[serde(flatten)]
    pub relation: Relationship,
}

impl ViewUser {
    /// Decorate `user` for `viewer_id`.
    ///
    /// The relationship flags only apply when a signed-in viewer looks at
    /// somebody else; for themselves or anonymous visitors the flags stay
    /// at their defaults.
    pub fn new(user: User, viewer_id: Option<UserId>, relation: Relationship) -> Self {
        let is_me = viewer_id.map_or(false, |id| id > 0 && id == user.id);
        let relation = match viewer_id {
            Some(id) if id > 0 && id != user.id => relation,
            _ => Relationship::default(),
        };
        Self {
            user,
            is_me,
            relation,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::UserStatus;

    fn user(id: UserId) -> User {
        User {
            id,
            name: format!("user{}", id),
            email: format!("user{}@example.com", id),
            pwd_hash: String::new(),
            avatar: String::new(),
            description: String::new(),
            permissions: 0,
            reference_system: 0,
            reference_token: String::new(),
            link_count: 0,
            friend_count: 0,
            follower_count: 0,
            topic_count: 0,
            ftopic_count: 0,
            status: UserStatus::Normal,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn own_profile_sets_is_me_and_clears_relation() {
        let view = ViewUser::new(user(3), Some(3), Relationship::new(true, true));
        assert!(view.is_me);
        assert_eq!(view.relation, Relationship::default());
    }

    #[test]
    fn anonymous_viewer_gets_defaults() {
        let view = ViewUser::new(user(3), None, Relationship::new(true, false));
        assert!(!view.is_me);
        assert_eq!(view.relation, Relationship::default());
    }

    #[test]
    fn other_viewer_keeps_relation() {
        let relation = Relationship::new(false, true);
        let view = ViewUser::new(user(3), Some(8), relation);
        assert!(!view.is_me);
        assert_eq!(view.relation, relation);
    }
}
