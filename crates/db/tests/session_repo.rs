//! Postgres round-trips for the session and user repositories.
//!
//! These need a live database (`DATABASE_URL`), so they are ignored by default:
//! `cargo test -p sentinel-db -- --ignored`.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sentinel_core::types::new_session_id;
use sentinel_db::models::session::CreateSession;
use sentinel_db::models::user::{CreateUser, User};
use sentinel_db::repositories::{SessionRepo, UserRepo};
use sentinel_db::store::{PgSessionStore, SessionStore, StoreError};
use sentinel_db::DbPools;
use sqlx::PgPool;

async fn create_user(pool: &PgPool, username: &str) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: "not-a-real-hash".to_string(),
        role: "member".to_string(),
        balance: 0,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

fn session_for(user_id: i64, ttl: Duration) -> CreateSession {
    CreateSession {
        session_id: new_session_id(),
        user_id,
        access_token: "signed.token.value".to_string(),
        ip_address: Some("127.0.0.1".to_string()),
        user_agent: Some("repo-test".to_string()),
        device_info: None,
        expires_at: Utc::now() + ttl,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_and_find_session(pool: PgPool) {
    let user = create_user(&pool, "repo_alice").await;
    let input = session_for(user.id, Duration::hours(24));

    let created = SessionRepo::create(&pool, &input).await.unwrap();
    assert_eq!(created.session_id, input.session_id);
    assert_eq!(created.user_id, user.id);

    let found = SessionRepo::find_by_id(&pool, input.session_id)
        .await
        .unwrap()
        .expect("session should exist");
    assert_eq!(found.access_token, "signed.token.value");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn delete_is_idempotent_and_scoped(pool: PgPool) {
    let alice = create_user(&pool, "repo_a").await;
    let bob = create_user(&pool, "repo_b").await;
    let a1 = SessionRepo::create(&pool, &session_for(alice.id, Duration::hours(1)))
        .await
        .unwrap();
    SessionRepo::create(&pool, &session_for(alice.id, Duration::hours(1)))
        .await
        .unwrap();
    SessionRepo::create(&pool, &session_for(bob.id, Duration::hours(1)))
        .await
        .unwrap();

    assert!(SessionRepo::delete(&pool, a1.session_id).await.unwrap());
    assert!(!SessionRepo::delete(&pool, a1.session_id).await.unwrap());

    assert_eq!(SessionRepo::delete_all_for_user(&pool, alice.id).await.unwrap(), 1);
    assert_eq!(SessionRepo::list_for_user(&pool, bob.id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn expired_sessions_are_purged(pool: PgPool) {
    let user = create_user(&pool, "repo_expiry").await;
    let store = PgSessionStore::new(DbPools::new(pool.clone(), None));
    store
        .create(&session_for(user.id, Duration::seconds(-10)))
        .await
        .unwrap();
    let live = store
        .create(&session_for(user.id, Duration::hours(1)))
        .await
        .unwrap();

    assert_eq!(store.purge_expired(Utc::now()).await.unwrap(), 1);
    let remaining = store.get_by_user_id(user.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].session_id, live.session_id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_username_is_a_conflict(pool: PgPool) {
    create_user(&pool, "repo_dup").await;

    let err = UserRepo::create(
        &pool,
        &CreateUser {
            username: "repo_dup".to_string(),
            email: "different@test.com".to_string(),
            password_hash: "x".to_string(),
            role: "member".to_string(),
            balance: 0,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(StoreError::from(err), StoreError::Conflict(c) if c == "uq_users_username");
}
