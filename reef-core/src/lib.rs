//! reef-core: domain types for the Reef link-sharing application
//!
//! Pure data model shared by the storage layer and its consumers.
//! No I/O lives here; storage concerns belong to `reef-store`.

pub mod models;

pub use models::{
    CounterField, Email, NewUser, Paginated, Pagination, Relationship, RemindCounts, RemindKind,
    User, UserId, UserName, UserPatch, UserStatus, ValidationError, ViewUser,
};
