//! Schema migrations for the Reef tables

use sqlx::PgPool;

use crate::error::StoreResult;

/// Create all tables and indexes if they don't exist yet.
pub async fn run(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("running reef-store migrations");

    // Accounts. name_lower/email_lower are the case-insensitive
    // uniqueness shadow columns; the *_count columns are denormalized
    // tallies maintained by the repositories.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            name_lower TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL,
            email_lower TEXT NOT NULL UNIQUE,
            pwd_hash TEXT NOT NULL,
            avatar TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            permissions INT NOT NULL DEFAULT 0,
            reference_system INT NOT NULL DEFAULT 0,
            reference_id TEXT NOT NULL DEFAULT '',
            reference_token TEXT NOT NULL DEFAULT '',
            link_count INT NOT NULL DEFAULT 0,
            friend_count INT NOT NULL DEFAULT 0,
            follower_count INT NOT NULL DEFAULT 0,
            topic_count INT NOT NULL DEFAULT 0,
            ftopic_count INT NOT NULL DEFAULT 0,
            status SMALLINT NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Directed follow edges, one row per ordered pair
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_follows (
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            follow_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, follow_id),
            CHECK (user_id <> follow_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            pic TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topic_follows (
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            topic_id BIGINT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, topic_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("reef-store migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> StoreResult<()> {
    // Reverse lookup: who follows this user
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_follows_follow ON user_follows(follow_id)")
        .execute(pool)
        .await?;

    // Name search orders by popularity
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_link_count ON users(link_count DESC)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_topic_follows_user ON topic_follows(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}
