//! Denormalized user counters
//!
//! The closed set of counter columns that may be adjusted incrementally.
//! Counter updates build SQL from this enum and nothing else, so a column
//! identifier can never arrive from caller input.

/// A user counter column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    /// Links shared by the user
    Links,
    /// Users this user follows
    Friends,
    /// Users following this user
    Followers,
    /// Topics the user's links were filed under
    Topics,
    /// Topics the user follows
    FollowedTopics,
}

impl CounterField {
    /// Column name in the `users` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Links => "link_count",
            Self::Friends => "friend_count",
            Self::Followers => "follower_count",
            Self::Topics => "topic_count",
            Self::FollowedTopics => "ftopic_count",
        }
    }
}
