//! User repository
//!
//! Row lookups, listing, typed inserts/updates, the counter primitive,
//! and the two deliberately fail-closed checks (email uniqueness and
//! password verification).

use sqlx::{FromRow, PgPool};

use reef_core::models::{
    CounterField, NewUser, Paginated, Pagination, User, UserId, UserPatch, UserStatus,
};

use crate::auth::PasswordHasher;
use crate::error::{is_unique_violation, StoreError, StoreResult};

/// Column list matching `User`'s fields; shadow columns stay internal.
const USER_COLUMNS: &str = "id, name, email, pwd_hash, avatar, description, permissions, \
     reference_system, reference_token, link_count, friend_count, follower_count, \
     topic_count, ftopic_count, status, created_at";

/// Maximum rows a name search returns.
const SEARCH_PAGE_SIZE: i64 = 10;

/// Outcome of an email-uniqueness probe.
///
/// A storage failure reports `Unknown` rather than an error; callers must
/// treat anything but `Available` as taken so registration stays closed
/// while the database is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailAvailability {
    Available,
    Taken,
    /// The probe itself failed; treat as taken
    Unknown,
}

impl EmailAvailability {
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Why a credential check denied login.
///
/// Both variants deny. `Unavailable` lets callers tell an outage apart
/// from a plain mismatch without opening the gate.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid credentials")]
    Invalid,

    #[error("credential check unavailable")]
    Unavailable(#[source] sqlx::Error),
}

/// Sort orders exposed for user listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserOrder {
    #[default]
    Newest,
    MostLinks,
    MostFollowers,
}

impl UserOrder {
    /// ORDER BY fragment; a closed set, never caller input.
    fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "id DESC",
            Self::MostLinks => "link_count DESC",
            Self::MostFollowers => "follower_count DESC",
        }
    }
}

/// Topic projection returned by `followed_topics`.
#[derive(Debug, Clone, FromRow)]
pub struct FollowedTopic {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub pic: String,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Case-insensitive lookup via the `name_lower` shadow column.
    pub async fn by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE name_lower = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(name.to_lowercase())
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    pub async fn is_name_taken(&self, name: &str) -> StoreResult<bool> {
        Ok(self.by_name(name).await?.is_some())
    }

    /// Prefix search on names, most-shared-links first.
    pub async fn search_by_name(&self, prefix: &str) -> StoreResult<Vec<User>> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        // Escape LIKE metacharacters so the prefix matches literally
        let escaped = prefix
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name_lower LIKE $1 \
             ORDER BY link_count DESC LIMIT $2"
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(format!("{escaped}%"))
            .bind(SEARCH_PAGE_SIZE)
            .fetch_all(self.pool)
            .await?;
        Ok(users)
    }

    /// List users a page at a time.
    ///
    /// The total is a separate COUNT so a page past the end still reports
    /// the real number of rows.
    pub async fn list(&self, page: Pagination, order: UserOrder) -> StoreResult<Paginated<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY {} LIMIT $1 OFFSET $2",
            order.order_by()
        );
        let items = sqlx::query_as::<_, User>(&query)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Insert a new account, deriving the lower-cased shadow columns.
    pub async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (name, name_lower, email, email_lower, pwd_hash, avatar, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user.name.as_str())
            .bind(user.name.lower())
            .bind(user.email.as_str())
            .bind(user.email.lower())
            .bind(&user.pwd_hash)
            .bind(&user.avatar)
            .bind(&user.description)
            .fetch_one(self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::Duplicate { resource: "user" }
                } else {
                    StoreError::Database(err).traced("user insert")
                }
            })
    }

    /// Apply a partial update; returns whether a row changed.
    ///
    /// The SET list is assembled from `UserPatch`'s fixed fields only;
    /// caller input travels exclusively through binds.
    pub async fn update(&self, id: UserId, patch: UserPatch) -> StoreResult<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut sets: Vec<String> = Vec::new();
        let mut n = 0;
        let mut next = || {
            n += 1;
            n
        };
        if patch.name.is_some() {
            sets.push(format!("name = ${}", next()));
            sets.push(format!("name_lower = ${}", next()));
        }
        if patch.email.is_some() {
            sets.push(format!("email = ${}", next()));
            sets.push(format!("email_lower = ${}", next()));
        }
        if patch.pwd_hash.is_some() {
            sets.push(format!("pwd_hash = ${}", next()));
        }
        if patch.avatar.is_some() {
            sets.push(format!("avatar = ${}", next()));
        }
        if patch.description.is_some() {
            sets.push(format!("description = ${}", next()));
        }
        if patch.permissions.is_some() {
            sets.push(format!("permissions = ${}", next()));
        }
        if patch.status.is_some() {
            sets.push(format!("status = ${}", next()));
        }
        let sql = format!("UPDATE users SET {} WHERE id = ${}", sets.join(", "), next());

        let mut query = sqlx::query(&sql);
        if let Some(name) = &patch.name {
            query = query.bind(name.as_str().to_owned()).bind(name.lower());
        }
        if let Some(email) = &patch.email {
            query = query.bind(email.as_str().to_owned()).bind(email.lower());
        }
        if let Some(pwd_hash) = &patch.pwd_hash {
            query = query.bind(pwd_hash);
        }
        if let Some(avatar) = &patch.avatar {
            query = query.bind(avatar);
        }
        if let Some(description) = &patch.description {
            query = query.bind(description);
        }
        if let Some(permissions) = patch.permissions {
            query = query.bind(permissions);
        }
        if let Some(status) = patch.status {
            query = query.bind(status);
        }

        let result = query
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::Duplicate { resource: "user" }
                } else {
                    StoreError::Database(err).traced("user update")
                }
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark the account deleted without removing the row.
    pub async fn soft_delete(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET status = $1 WHERE id = $2 AND status <> $1")
            .bind(UserStatus::Deleted)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|err| StoreError::Database(err).traced("user soft delete"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Adjust one of the denormalized counters by `delta`.
    pub async fn inc_count(
        &self,
        id: UserId,
        field: CounterField,
        delta: i32,
    ) -> StoreResult<()> {
        apply_counter_delta(self.pool, id, field, delta)
            .await
            .map_err(|err| StoreError::Database(err).traced("counter update"))
    }

    /// Probe whether an email can still register.
    pub async fn email_availability(&self, email: &str) -> EmailAvailability {
        let probe = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM users WHERE email_lower = $1 LIMIT 1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(self.pool)
        .await;

        match probe {
            Ok(None) => EmailAvailability::Available,
            Ok(Some(_)) => EmailAvailability::Taken,
            Err(err) => {
                tracing::error!(%err, "email availability probe failed");
                EmailAvailability::Unknown
            }
        }
    }

    /// Verify credentials, returning the account id on success.
    ///
    /// Hashing happens through the injected collaborator; comparison is a
    /// plain equality match against the stored form.
    pub async fn check_password(
        &self,
        email: &str,
        password: &str,
        hasher: &dyn PasswordHasher,
    ) -> Result<UserId, CredentialError> {
        let pwd_hash = hasher.hash(password);
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM users WHERE email_lower = $1 AND pwd_hash = $2 LIMIT 1",
        )
        .bind(email.trim().to_lowercase())
        .bind(pwd_hash)
        .fetch_optional(self.pool)
        .await
        .map_err(|err| {
            tracing::error!(%err, "credential check failed");
            CredentialError::Unavailable(err)
        })?;

        id.ok_or(CredentialError::Invalid)
    }

    /// Look up an account created through a third-party reference system.
    pub async fn find_by_reference(
        &self,
        system: i32,
        reference_id: &str,
    ) -> StoreResult<Option<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reference_system = $1 AND reference_id = $2"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(system)
            .bind(reference_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Refresh the stored access token for a reference-system account.
    pub async fn update_reference_token(&self, id: UserId, token: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET reference_token = $1 WHERE id = $2")
            .bind(token)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Topics the user follows, newest topic first.
    pub async fn followed_topics(
        &self,
        user_id: UserId,
        page: Pagination,
    ) -> StoreResult<Vec<FollowedTopic>> {
        let topics = sqlx::query_as::<_, FollowedTopic>(
            r#"
            SELECT t.id, t.name, t.description, t.pic
            FROM topic_follows tf
            INNER JOIN topics t ON tf.topic_id = t.id
            WHERE tf.user_id = $1
            ORDER BY t.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;
        Ok(topics)
    }
}

/// Apply a delta to one of the closed set of user counters.
///
/// A single storage-side UPDATE, so concurrent deltas commute and the
/// final value is always the initial value plus the sum of all deltas.
/// The column name only ever comes from `CounterField`.
pub(crate) async fn apply_counter_delta<'e, E>(
    executor: E,
    user_id: UserId,
    field: CounterField,
    delta: i32,
) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE users SET {col} = {col} + $1 WHERE id = $2",
        col = field.column()
    );
    sqlx::query(&sql)
        .bind(delta)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}
