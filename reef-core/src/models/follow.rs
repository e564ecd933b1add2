//! Relationship classification between two users

use serde::Serialize;

/// How a subject relates to the viewing user.
///
/// Derived from the two directed follow edges; never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Relationship {
    /// Subject follows the viewer
    pub is_follower: bool,
    /// Viewer follows the subject
    pub is_followed: bool,
    /// Both directions present
    pub is_friend: bool,
}

impl Relationship {
    pub fn new(is_follower: bool, is_followed: bool) -> Self {
        Self {
            is_follower,
            is_followed,
            is_friend: is_follower && is_followed,
        }
    }

    /// The same relationship seen from the other side.
    pub fn mirrored(self) -> Self {
        Self::new(self.is_followed, self.is_follower)
    }
}
