use sqlx::PgPool;
use std::sync::Arc;

use snaplink::application::services::hash_token;
use snaplink::domain::repositories::TokenRepository;
use snaplink::error::AppError;
use snaplink::infrastructure::persistence::PgTokenRepository;

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let hash = hash_token("secret", "raw-token");

    let token = repo.create_token("ci", "alice", &hash).await.unwrap();

    assert_eq!(token.name, "ci");
    assert_eq!(token.owner_id, "alice");
    assert_eq!(token.token_hash, hash);
    assert!(token.revoked_at.is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_name_conflicts(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    repo.create_token("ci", "alice", "hash-1").await.unwrap();

    let result = repo.create_token("ci", "bob", "hash-2").await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_active_and_revoke(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let token = repo.create_token("ci", "alice", "hash-1").await.unwrap();

    assert!(repo.find_active("hash-1").await.unwrap().is_some());
    assert!(repo.find_active("unknown").await.unwrap().is_none());

    repo.revoke_token(token.id).await.unwrap();

    assert!(repo.find_active("hash-1").await.unwrap().is_none());
    let revoked = repo.find_by_name("ci").await.unwrap().unwrap();
    assert!(revoked.revoked_at.is_some());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_last_used(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));
    let token = repo.create_token("ci", "alice", "hash-1").await.unwrap();
    assert!(token.last_used_at.is_none());

    repo.update_last_used("hash-1").await.unwrap();

    let updated = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(updated.last_used_at.is_some());
    assert_eq!(repo.list_tokens().await.unwrap().len(), 1);
}
