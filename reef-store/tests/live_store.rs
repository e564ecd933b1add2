//! Integration tests against live backends.
//!
//! Postgres tests run with:
//!   DATABASE_URL=postgres://... cargo test -p reef-store -- --ignored
//! Redis tests additionally need REDIS_URL (default redis://127.0.0.1/).
//!
//! Fixtures use random names/ids so the suite can run repeatedly against
//! the same database without cleanup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use sqlx::PgPool;

use reef_core::models::{
    Email, NewUser, Pagination, RemindKind, User, UserId, UserName, UserPatch, UserStatus,
};
use reef_store::auth::{Md5Hasher, PasswordHasher};
use reef_store::cache::ReminderStore;
use reef_store::db::{migrations, pool::create_pool, CredentialError, FollowRepo, UserOrder, UserRepo};
use reef_store::events::FollowEvents;
use reef_store::view::{decorate, decorate_all};
use reef_store::StoreError;

fn unique_name(prefix: &str) -> String {
    let n: u32 = rand::thread_rng().gen();
    format!("{prefix}{n:08x}")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn test_pool() -> PgPool {
    init_tracing();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = create_pool(&url).await.expect("pool creation failed");
    migrations::run(&pool).await.expect("migrations failed");
    pool
}

async fn seed_user(pool: &PgPool) -> User {
    let name = unique_name("u");
    let repo = UserRepo::new(pool);
    repo.insert(NewUser {
        name: UserName::new(&name).expect("fixture name"),
        email: Email::new(&format!("{name}@example.com")).expect("fixture email"),
        pwd_hash: Md5Hasher.hash("hunter2"),
        avatar: String::new(),
        description: String::new(),
    })
    .await
    .expect("user insert failed")
}

async fn reminder_store() -> ReminderStore {
    init_tracing();
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let conn = reef_store::cache::connect(&url)
        .await
        .expect("redis connection failed");
    ReminderStore::new(conn)
}

fn random_user_id() -> UserId {
    rand::thread_rng().gen_range(1_000_000_000..i64::MAX)
}

// ---- follow graph ----

#[tokio::test]
#[ignore = "requires database"]
async fn follow_then_unfollow_restores_counts() {
    let pool = test_pool().await;
    let a = seed_user(&pool).await;
    let b = seed_user(&pool).await;
    let users = UserRepo::new(&pool);
    let follows = FollowRepo::new(&pool);

    follows.follow(a.id, b.id).await.expect("follow failed");

    let a_mid = users.by_id(a.id).await.unwrap().unwrap();
    let b_mid = users.by_id(b.id).await.unwrap().unwrap();
    assert_eq!(a_mid.friend_count, a.friend_count + 1);
    assert_eq!(b_mid.follower_count, b.follower_count + 1);
    assert!(follows.relationship(a.id, b.id).await.unwrap().is_followed);

    let removed = follows.unfollow(a.id, b.id).await.expect("unfollow failed");
    assert!(removed);

    let a_end = users.by_id(a.id).await.unwrap().unwrap();
    let b_end = users.by_id(b.id).await.unwrap().unwrap();
    assert_eq!(a_end.friend_count, a.friend_count);
    assert_eq!(b_end.follower_count, b.follower_count);
    assert!(!follows.relationship(a.id, b.id).await.unwrap().is_followed);
}

#[tokio::test]
#[ignore = "requires database"]
async fn double_follow_conflicts_without_double_increment() {
    let pool = test_pool().await;
    let a = seed_user(&pool).await;
    let b = seed_user(&pool).await;
    let users = UserRepo::new(&pool);
    let follows = FollowRepo::new(&pool);

    follows.follow(a.id, b.id).await.expect("first follow failed");
    let err = follows.follow(a.id, b.id).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyFollowing(id) if id == b.id));

    let a_end = users.by_id(a.id).await.unwrap().unwrap();
    let b_end = users.by_id(b.id).await.unwrap().unwrap();
    assert_eq!(a_end.friend_count, a.friend_count + 1);
    assert_eq!(b_end.follower_count, b.follower_count + 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn unfollow_missing_edge_is_noop() {
    let pool = test_pool().await;
    let a = seed_user(&pool).await;
    let b = seed_user(&pool).await;
    let follows = FollowRepo::new(&pool);

    let removed = follows.unfollow(a.id, b.id).await.expect("unfollow errored");
    assert!(!removed);
}

#[tokio::test]
#[ignore = "requires database"]
async fn relationship_flags_mirror() {
    let pool = test_pool().await;
    let a = seed_user(&pool).await;
    let b = seed_user(&pool).await;
    let follows = FollowRepo::new(&pool);

    follows.follow(a.id, b.id).await.expect("follow failed");

    let ab = follows.relationship(a.id, b.id).await.unwrap();
    let ba = follows.relationship(b.id, a.id).await.unwrap();
    assert!(ab.is_followed);
    assert!(!ab.is_follower);
    assert_eq!(ab.mirrored(), ba);

    follows.follow(b.id, a.id).await.expect("follow back failed");
    let ab = follows.relationship(a.id, b.id).await.unwrap();
    assert!(ab.is_friend);
    assert_eq!(ab, follows.relationship(b.id, a.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires database"]
async fn follow_records_edge_timestamp() {
    let pool = test_pool().await;
    let a = seed_user(&pool).await;
    let b = seed_user(&pool).await;
    let follows = FollowRepo::new(&pool);

    follows.follow(a.id, b.id).await.expect("follow failed");
    let edge = follows.edge(a.id, b.id).await.unwrap().expect("edge missing");
    assert_eq!(edge.user_id, a.id);
    assert_eq!(edge.follow_id, b.id);
    assert!(edge.created_at <= chrono::Utc::now());
}

struct ChannelEvents(tokio::sync::mpsc::UnboundedSender<(UserId, UserId, bool)>);

#[async_trait]
impl FollowEvents for ChannelEvents {
    async fn followed(&self, user_id: UserId, follow_id: UserId) {
        let _ = self.0.send((user_id, follow_id, true));
    }

    async fn unfollowed(&self, user_id: UserId, follow_id: UserId) {
        let _ = self.0.send((user_id, follow_id, false));
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn follow_notifies_listener_after_commit() {
    let pool = test_pool().await;
    let a = seed_user(&pool).await;
    let b = seed_user(&pool).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let follows = FollowRepo::new(&pool).with_events(Arc::new(ChannelEvents(tx)));

    follows.follow(a.id, b.id).await.expect("follow failed");
    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no event within deadline")
        .expect("channel closed");
    assert_eq!(event, (a.id, b.id, true));

    follows.unfollow(a.id, b.id).await.expect("unfollow failed");
    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no event within deadline")
        .expect("channel closed");
    assert_eq!(event, (a.id, b.id, false));
}

// ---- user accessor ----

#[tokio::test]
#[ignore = "requires database"]
async fn lookup_by_name_is_case_insensitive() {
    let pool = test_pool().await;
    let user = seed_user(&pool).await;
    let repo = UserRepo::new(&pool);

    let found = repo
        .by_name(&user.name.to_uppercase())
        .await
        .unwrap()
        .expect("user not found");
    assert_eq!(found.id, user.id);

    assert!(repo.by_name(&unique_name("missing")).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn search_orders_by_link_count() {
    let pool = test_pool().await;
    let repo = UserRepo::new(&pool);
    let prefix = unique_name("srch");

    for links in [2, 9, 4] {
        let name = format!("{prefix}{links}");
        let user = repo
            .insert(NewUser {
                name: UserName::new(&name).unwrap(),
                email: Email::new(&format!("{name}@example.com")).unwrap(),
                pwd_hash: String::from("x"),
                avatar: String::new(),
                description: String::new(),
            })
            .await
            .expect("insert failed");
        sqlx::query("UPDATE users SET link_count = $1 WHERE id = $2")
            .bind(links)
            .bind(user.id)
            .execute(&pool)
            .await
            .expect("fixture update failed");
    }

    let found = repo.search_by_name(&prefix).await.expect("search failed");
    let counts: Vec<i32> = found.iter().map(|u| u.link_count).collect();
    assert_eq!(counts, vec![9, 4, 2]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn list_total_is_independent_of_page() {
    let pool = test_pool().await;
    seed_user(&pool).await;
    let repo = UserRepo::new(&pool);

    let first = repo
        .list(Pagination::new(1, 5), UserOrder::Newest)
        .await
        .expect("list failed");
    assert!(first.total >= 1);

    // A page far past the end is empty but keeps the same total
    let far = repo
        .list(Pagination::new(100_000, 5), UserOrder::Newest)
        .await
        .expect("list failed");
    assert!(far.items.is_empty());
    assert_eq!(far.total, first.total);
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_email_insert_conflicts() {
    let pool = test_pool().await;
    let user = seed_user(&pool).await;
    let repo = UserRepo::new(&pool);

    let err = repo
        .insert(NewUser {
            name: UserName::new(&unique_name("u")).unwrap(),
            email: Email::new(&user.email).unwrap(),
            pwd_hash: String::from("x"),
            avatar: String::new(),
            description: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { resource: "user" }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn patch_updates_shadow_columns() {
    let pool = test_pool().await;
    let user = seed_user(&pool).await;
    let repo = UserRepo::new(&pool);

    let new_name = unique_name("Re");
    let changed = repo
        .update(
            user.id,
            UserPatch {
                name: Some(UserName::new(&new_name).unwrap()),
                description: Some("link collector".to_owned()),
                ..UserPatch::default()
            },
        )
        .await
        .expect("update failed");
    assert!(changed);

    let found = repo
        .by_name(&new_name.to_uppercase())
        .await
        .unwrap()
        .expect("renamed user not found via shadow column");
    assert_eq!(found.id, user.id);
    assert_eq!(found.description, "link collector");
}

#[tokio::test]
#[ignore = "requires database"]
async fn soft_delete_keeps_row() {
    let pool = test_pool().await;
    let user = seed_user(&pool).await;
    let repo = UserRepo::new(&pool);

    assert!(repo.soft_delete(user.id).await.expect("soft delete failed"));
    // Second call is a no-op
    assert!(!repo.soft_delete(user.id).await.expect("soft delete failed"));

    let found = repo.by_id(user.id).await.unwrap().expect("row vanished");
    assert_eq!(found.status, UserStatus::Deleted);
}

#[tokio::test]
#[ignore = "requires database"]
async fn password_check_distinguishes_mismatch() {
    let pool = test_pool().await;
    let user = seed_user(&pool).await;
    let repo = UserRepo::new(&pool);

    let id = repo
        .check_password(&user.email, "hunter2", &Md5Hasher)
        .await
        .expect("valid credentials rejected");
    assert_eq!(id, user.id);

    let err = repo
        .check_password(&user.email, "wrong", &Md5Hasher)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::Invalid));
}

#[tokio::test]
#[ignore = "requires database"]
async fn email_probe_sees_existing_rows() {
    let pool = test_pool().await;
    let user = seed_user(&pool).await;
    let repo = UserRepo::new(&pool);

    assert!(!repo.email_availability(&user.email.to_uppercase()).await.is_available());
    assert!(repo
        .email_availability(&format!("{}@example.com", unique_name("free")))
        .await
        .is_available());
}

// ---- view adapter ----

#[tokio::test]
#[ignore = "requires database"]
async fn decoration_reflects_follow_state() {
    let pool = test_pool().await;
    let a = seed_user(&pool).await;
    let b = seed_user(&pool).await;
    let follows = FollowRepo::new(&pool);

    follows.follow(a.id, b.id).await.expect("follow failed");

    let view = decorate(&follows, b.clone(), Some(a.id)).await.unwrap();
    assert!(!view.is_me);
    assert!(view.relation.is_followed);
    assert!(!view.relation.is_follower);

    let own = decorate(&follows, a.clone(), Some(a.id)).await.unwrap();
    assert!(own.is_me);
    assert!(!own.relation.is_followed);

    let empty = decorate_all(&follows, Vec::new(), Some(a.id)).await.unwrap();
    assert!(empty.is_empty());
}

// ---- reminder counters ----

#[tokio::test]
#[ignore = "requires redis"]
async fn three_increments_then_read() {
    let store = reminder_store().await;
    let user = random_user_id();

    for _ in 0..3 {
        store.incr(user, RemindKind::Comment).await.expect("incr failed");
    }

    let counts = store.counts(user).await.expect("read failed");
    assert_eq!(counts.comments, 3);
    assert_eq!(counts.fans, 0);
}

#[tokio::test]
#[ignore = "requires redis"]
async fn reset_clears_to_absent() {
    let store = reminder_store().await;
    let user = random_user_id();

    store.incr(user, RemindKind::Fan).await.expect("incr failed");
    store.reset(user, RemindKind::Fan).await.expect("reset failed");

    let counts = store.counts(user).await.expect("read failed");
    assert_eq!(counts.fans, 0);
}

#[tokio::test]
#[ignore = "requires redis"]
async fn quiet_user_reads_zero() {
    let store = reminder_store().await;
    let counts = store.counts(random_user_id()).await.expect("read failed");
    assert_eq!(counts.comments, 0);
    assert_eq!(counts.fans, 0);
    assert_eq!(counts.total(), 0);
}

#[tokio::test]
#[ignore = "requires redis"]
async fn concurrent_increments_converge() {
    const WRITERS: usize = 20;

    let store = reminder_store().await;
    let user = random_user_id();

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.incr(user, RemindKind::Comment).await })
        })
        .collect();

    for handle in handles {
        handle.await.expect("task panicked").expect("incr failed");
    }

    let counts = store.counts(user).await.expect("read failed");
    assert_eq!(counts.comments, WRITERS as i64);
}
