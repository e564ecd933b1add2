//! Reminder categories and counts
//!
//! Reminders are cache-only unread-notification tallies; a user with no
//! activity simply has no hash and reads as all zeros.

use std::str::FromStr;

use serde::Serialize;

use super::ValidationError;

/// Notification category tracked per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemindKind {
    /// New comments on the user's links
    Comment,
    /// New followers
    Fan,
}

impl RemindKind {
    pub const ALL: [RemindKind; 2] = [RemindKind::Comment, RemindKind::Fan];

    /// Hash sub-field key in the cache.
    pub fn field(self) -> &'static str {
        match self {
            Self::Comment => "c",
            Self::Fan => "f",
        }
    }
}

impl FromStr for RemindKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(Self::Comment),
            "fan" => Ok(Self::Fan),
            other => Err(ValidationError::InvalidVariant {
                field: "remind kind",
                value: other.to_owned(),
            }),
        }
    }
}

/// Unread reminder counts for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemindCounts {
    pub comments: i64,
    pub fans: i64,
}

impl RemindCounts {
    pub fn get(&self, kind: RemindKind) -> i64 {
        match kind {
            RemindKind::Comment => self.comments,
            RemindKind::Fan => self.fans,
        }
    }

    pub fn set(&mut self, kind: RemindKind, value: i64) {
        match kind {
            RemindKind::Comment => self.comments = value,
            RemindKind::Fan => self.fans = value,
        }
    }

    pub fn total(&self) -> i64 {
        self.comments + self.fans
    }
}
