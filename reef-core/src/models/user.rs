//! User entity and its write forms

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Email, UserName};

/// Server-assigned user identifier; always positive once stored.
pub type UserId = i64;

/// Permission level at which moderator powers start.
const ADMIN_PERMISSIONS: i32 = 50;

/// Account status stored as SMALLINT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[repr(i16)]
pub enum UserStatus {
    Normal = 0,
    Muted = 1,
    Banned = 2,
    /// Soft-deleted; rows are never physically removed
    Deleted = 3,
}

/// A user row.
///
/// The five `*_count` columns are denormalized tallies of relationship
/// rows, maintained incrementally by the storage layer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub pwd_hash: String,
    pub avatar: String,
    pub description: String,
    pub permissions: i32,
    pub reference_system: i32,
    #[serde(skip_serializing)]
    pub reference_token: String,
    pub link_count: i32,
    pub friend_count: i32,
    pub follower_count: i32,
    pub topic_count: i32,
    pub ftopic_count: i32,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.permissions >= ADMIN_PERMISSIONS
    }

    /// Gravatar URL derived from the md5 digest of the lower-cased email.
    pub fn gravatar_url(&self, size: u32) -> String {
        let digest = md5::compute(self.email.trim().to_lowercase());
        format!("https://www.gravatar.com/avatar/{:x}?d=mm&s={}", digest, size)
    }
}

/// Insert form; the storage layer derives the shadow columns from it.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: UserName,
    pub email: Email,
    /// Already hashed by the caller's `PasswordHasher`
    pub pwd_hash: String,
    pub avatar: String,
    pub description: String,
}

/// Partial update form; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<UserName>,
    pub email: Option<Email>,
    pub pwd_hash: Option<String>,
    pub avatar: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<i32>,
    pub status: Option<UserStatus>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.pwd_hash.is_none()
            && self.avatar.is_none()
            && self.description.is_none()
            && self.permissions.is_none()
            && self.status.is_none()
    }
}
