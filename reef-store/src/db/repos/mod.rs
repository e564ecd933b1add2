//! Repository implementations for relational access
//!
//! Each repository borrows the shared pool for one call and handles
//! conflicts via constraints, not check-then-insert.

pub mod follows;
pub mod users;

pub use follows::{FollowEdge, FollowRepo};
pub use users::{CredentialError, EmailAvailability, FollowedTopic, UserOrder, UserRepo};
