//! Unit tests for the token service and rotation engine

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::principal::Role;
use crate::domain::entities::token::SessionMeta;
use crate::errors::{DomainError, TokenError};
use crate::repositories::token::mock::MockTokenRepository;
use crate::repositories::TokenRepository;
use crate::services::token::{TokenConfig, TokenService};

fn service_with_repo() -> (TokenService<MockTokenRepository>, MockTokenRepository) {
    let repo = MockTokenRepository::new();
    let service = TokenService::new(repo.clone(), TokenConfig::default());
    (service, repo)
}

#[tokio::test]
async fn test_access_token_round_trip() {
    let (service, _repo) = service_with_repo();
    let principal_id = Uuid::new_v4();

    let pair = service
        .issue_pair(principal_id, Role::Admin, SessionMeta::default())
        .await
        .unwrap();

    let claims = service.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.principal_id().unwrap(), principal_id);
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.iss, "plaza");
}

#[tokio::test]
async fn test_verify_rejects_malformed_token() {
    let (service, _repo) = service_with_repo();

    let result = service.verify_access_token("not-a-jwt");
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_verify_rejects_foreign_signature() {
    let (service, _repo) = service_with_repo();
    let foreign = TokenService::new(
        MockTokenRepository::new(),
        TokenConfig {
            jwt_secret: "a-different-secret".to_string(),
            ..TokenConfig::default()
        },
    );

    let pair = foreign
        .issue_pair(Uuid::new_v4(), Role::User, SessionMeta::default())
        .await
        .unwrap();

    let result = service.verify_access_token(&pair.access_token);
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_verify_rejects_expired_access_token() {
    let repo = MockTokenRepository::new();
    let service = TokenService::new(
        repo,
        TokenConfig {
            // Past the decoder's default leeway
            access_token_expiry_minutes: -5,
            ..TokenConfig::default()
        },
    );

    let pair = service
        .issue_pair(Uuid::new_v4(), Role::User, SessionMeta::default())
        .await
        .unwrap();

    let result = service.verify_access_token(&pair.access_token);
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_verify_rejects_refresh_token_as_access_credential() {
    let (service, _repo) = service_with_repo();

    let pair = service
        .issue_pair(Uuid::new_v4(), Role::User, SessionMeta::default())
        .await
        .unwrap();

    // Valid signature, wrong kind: never a bearer credential
    let result = service.verify_access_token(&pair.refresh_token);
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_revoked_session_refresh_token_grants_no_access() {
    let (service, _repo) = service_with_repo();
    let principal_id = Uuid::new_v4();

    let pair = service
        .issue_pair(principal_id, Role::User, SessionMeta::default())
        .await
        .unwrap();

    assert_eq!(service.revoke_all(principal_id).await.unwrap(), 1);

    // Sign-out-everywhere leaves the refresh JWT signed and unexpired,
    // but it is still no use as an access credential
    let result = service.verify_access_token(&pair.refresh_token);
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_refresh_rejects_access_token_kind() {
    let (service, _repo) = service_with_repo();

    let pair = service
        .issue_pair(Uuid::new_v4(), Role::User, SessionMeta::default())
        .await
        .unwrap();

    // An access token is rejected on kind, before any store lookup
    let result = service.refresh(&pair.access_token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_issue_pair_stores_hash_not_raw_token() {
    let (service, repo) = service_with_repo();
    let principal_id = Uuid::new_v4();

    let pair = service
        .issue_pair(principal_id, Role::User, SessionMeta::default())
        .await
        .unwrap();

    let hash = TokenService::<MockTokenRepository>::hash_token(&pair.refresh_token);
    assert_ne!(hash, pair.refresh_token);

    let record = repo.get(&hash).await.unwrap();
    assert_eq!(record.principal_id, principal_id);
    assert!(record.is_active());
    assert!(record.replaced_by.is_none());
}

#[tokio::test]
async fn test_refresh_rotates_old_token() {
    let (service, repo) = service_with_repo();
    let principal_id = Uuid::new_v4();

    let first = service
        .issue_pair(principal_id, Role::User, SessionMeta::default())
        .await
        .unwrap();

    let second = service.refresh(&first.refresh_token).await.unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);

    let claims = service.verify_access_token(&second.access_token).unwrap();
    assert_eq!(claims.principal_id().unwrap(), principal_id);

    let old_hash = TokenService::<MockTokenRepository>::hash_token(&first.refresh_token);
    let new_hash = TokenService::<MockTokenRepository>::hash_token(&second.refresh_token);

    let old_record = repo.get(&old_hash).await.unwrap();
    assert!(old_record.revoked);
    assert_eq!(old_record.replaced_by.as_deref(), Some(new_hash.as_str()));

    let new_record = repo.get(&new_hash).await.unwrap();
    assert!(new_record.is_active());
}

#[tokio::test]
async fn test_refresh_rejects_garbage_token() {
    let (service, _repo) = service_with_repo();

    let result = service.refresh("garbage").await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_refresh_unknown_token_is_not_found() {
    // Well-signed token whose record lives in a different store
    let (service, _repo) = service_with_repo();
    let (other_service, _other_repo) = service_with_repo();

    let pair = other_service
        .issue_pair(Uuid::new_v4(), Role::User, SessionMeta::default())
        .await
        .unwrap();

    let result = service.refresh(&pair.refresh_token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::RefreshNotFound))
    ));
}

#[tokio::test]
async fn test_refresh_expired_token_is_not_found_not_invalid() {
    let repo = MockTokenRepository::new();
    let service = TokenService::new(
        repo,
        TokenConfig {
            refresh_token_expiry_days: 0,
            ..TokenConfig::default()
        },
    );

    let pair = service
        .issue_pair(Uuid::new_v4(), Role::User, SessionMeta::default())
        .await
        .unwrap();

    // Syntactically valid, unrevoked, but expired: benign staleness
    let result = service.refresh(&pair.refresh_token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::RefreshNotFound))
    ));
}

#[tokio::test]
async fn test_refresh_reuse_is_detected_and_cascades() {
    let (service, repo) = service_with_repo();
    let principal_id = Uuid::new_v4();

    let first = service
        .issue_pair(principal_id, Role::User, SessionMeta::default())
        .await
        .unwrap();
    let second = service.refresh(&first.refresh_token).await.unwrap();

    // The rotated token resurfaces: theft indicator
    let result = service.refresh(&first.refresh_token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::RefreshReused))
    ));

    // The cascade revoked the live successor as well
    let second_hash = TokenService::<MockTokenRepository>::hash_token(&second.refresh_token);
    assert!(!repo.get(&second_hash).await.unwrap().is_active());

    let result = service.refresh(&second.refresh_token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::RefreshReused))
    ));
}

#[tokio::test]
async fn test_logged_out_token_reuse_is_reported() {
    let (service, _repo) = service_with_repo();
    let principal_id = Uuid::new_v4();

    let pair = service
        .issue_pair(principal_id, Role::User, SessionMeta::default())
        .await
        .unwrap();

    assert!(service
        .revoke_refresh_token(&pair.refresh_token, principal_id)
        .await
        .unwrap());

    let result = service.refresh(&pair.refresh_token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::RefreshReused))
    ));
}

#[tokio::test]
async fn test_sequential_rotations_build_lineage() {
    let (service, repo) = service_with_repo();
    let principal_id = Uuid::new_v4();

    let mut pair = service
        .issue_pair(principal_id, Role::User, SessionMeta::default())
        .await
        .unwrap();
    let mut hashes =
        vec![TokenService::<MockTokenRepository>::hash_token(&pair.refresh_token)];

    for _ in 0..3 {
        pair = service.refresh(&pair.refresh_token).await.unwrap();
        hashes.push(TokenService::<MockTokenRepository>::hash_token(
            &pair.refresh_token,
        ));
    }

    // Three rotations leave exactly three links in the replaced_by chain
    for window in hashes.windows(2) {
        let record = repo.get(&window[0]).await.unwrap();
        assert!(record.revoked);
        assert_eq!(record.replaced_by.as_deref(), Some(window[1].as_str()));
    }

    // Only the newest record is still active
    let newest = repo.get(hashes.last().unwrap()).await.unwrap();
    assert!(newest.is_active());
    assert_eq!(repo.len().await, 4);
    assert_eq!(
        repo.find_active_by_principal(principal_id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_concurrent_rotation_single_winner() {
    let (service, _repo) = service_with_repo();
    let service = Arc::new(service);
    let principal_id = Uuid::new_v4();

    let pair = service
        .issue_pair(principal_id, Role::User, SessionMeta::default())
        .await
        .unwrap();

    let token_a = pair.refresh_token.clone();
    let token_b = pair.refresh_token.clone();
    let service_a = Arc::clone(&service);
    let service_b = Arc::clone(&service);

    let (result_a, result_b) = tokio::join!(
        tokio::spawn(async move { service_a.refresh(&token_a).await }),
        tokio::spawn(async move { service_b.refresh(&token_b).await }),
    );
    let results = [result_a.unwrap(), result_b.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(DomainError::Token(TokenError::RefreshReused))
            )
        })
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
}

#[tokio::test]
async fn test_revoke_refresh_token_checks_ownership() {
    let (service, repo) = service_with_repo();
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let pair = service
        .issue_pair(owner, Role::User, SessionMeta::default())
        .await
        .unwrap();

    // A different principal cannot revoke the owner's session
    assert!(!service
        .revoke_refresh_token(&pair.refresh_token, stranger)
        .await
        .unwrap());

    let hash = TokenService::<MockTokenRepository>::hash_token(&pair.refresh_token);
    assert!(repo.get(&hash).await.unwrap().is_active());

    assert!(service
        .revoke_refresh_token(&pair.refresh_token, owner)
        .await
        .unwrap());
    let record = repo.get(&hash).await.unwrap();
    assert!(record.revoked);
    assert!(record.replaced_by.is_none());
}

#[tokio::test]
async fn test_revoke_all_is_scoped() {
    let (service, _repo) = service_with_repo();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    service
        .issue_pair(alice, Role::User, SessionMeta::default())
        .await
        .unwrap();
    service
        .issue_pair(alice, Role::User, SessionMeta::default())
        .await
        .unwrap();
    let bob_pair = service
        .issue_pair(bob, Role::User, SessionMeta::default())
        .await
        .unwrap();

    assert_eq!(service.revoke_all(alice).await.unwrap(), 2);

    // Bob's session still rotates fine
    assert!(service.refresh(&bob_pair.refresh_token).await.is_ok());
}
