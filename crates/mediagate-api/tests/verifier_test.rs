//! Token verifier outcomes, checked below the HTTP layer.
//!
//! Run with: `cargo test -p mediagate-api --test verifier_test`

mod helpers;

use async_trait::async_trait;
use mediagate_api::auth::{AuthError, Jwk, Jwks, KeySetCache, KeySetError, KeySetFetcher, TokenVerifier};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use helpers::auth::{id_token_claims, now, sign, sign_with, sign_without_kid, TestKey, KEY_A, KEY_B};

/// Serves a fixed key set and counts fetches.
struct PublishedKeys {
    keys: Vec<Jwk>,
    fetches: AtomicUsize,
}

#[async_trait]
impl KeySetFetcher for PublishedKeys {
    async fn fetch(&self) -> Result<Jwks, KeySetError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Jwks {
            keys: self.keys.clone(),
        })
    }
}

fn verifier(published: &[&TestKey]) -> (TokenVerifier, Arc<PublishedKeys>) {
    let fetcher = Arc::new(PublishedKeys {
        keys: published
            .iter()
            .map(|key| Jwk::rsa(key.kid, key.modulus, "AQAB"))
            .collect(),
        fetches: AtomicUsize::new(0),
    });
    let cache = Arc::new(KeySetCache::new(fetcher.clone(), None));
    (TokenVerifier::new(cache), fetcher)
}

#[tokio::test]
async fn test_valid_token_yields_subject() {
    let (verifier, _) = verifier(&[&KEY_A]);

    let principal = verifier
        .verify_token(&sign(&KEY_A, &id_token_claims("user-42")))
        .await
        .expect("valid token");

    assert_eq!(principal.subject(), Some("user-42"));
    assert_eq!(principal.email.as_deref(), Some("jane@example.com"));
}

#[tokio::test]
async fn test_unpublished_kid_is_unknown_key() {
    let (verifier, _) = verifier(&[&KEY_A]);

    let err = verifier
        .verify_token(&sign(&KEY_B, &id_token_claims("user-1")))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, AuthError::UnknownKey(kid) if kid == KEY_B.kid),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_signature_from_other_key_is_signature_invalid() {
    let (verifier, _) = verifier(&[&KEY_A, &KEY_B]);

    let token = sign_with(&KEY_B, KEY_A.kid, &id_token_claims("user-1"));
    let err = verifier.verify_token(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::SignatureInvalid(_)), "got {err:?}");
}

#[tokio::test]
async fn test_expired_token_is_claims_invalid() {
    let (verifier, _) = verifier(&[&KEY_A]);
    let mut claims = id_token_claims("user-1");
    claims["exp"] = json!(now() - 600);

    let err = verifier
        .verify_token(&sign(&KEY_A, &claims))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::ClaimsInvalid(_)), "got {err:?}");
}

#[tokio::test]
async fn test_future_nbf_is_claims_invalid() {
    let (verifier, _) = verifier(&[&KEY_A]);
    let mut claims = id_token_claims("user-1");
    claims["nbf"] = json!(now() + 600);

    let err = verifier
        .verify_token(&sign(&KEY_A, &claims))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::ClaimsInvalid(_)), "got {err:?}");
}

#[tokio::test]
async fn test_garbage_token_is_malformed_without_fetch() {
    let (verifier, fetcher) = verifier(&[&KEY_A]);

    for token in ["not-a-token", "a.b.c", "eyJ.eyJ.sig"] {
        let err = verifier.verify_token(token).await.unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)), "{token}: got {err:?}");
    }
    assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_token_without_kid_is_unknown_key_without_fetch() {
    let (verifier, fetcher) = verifier(&[&KEY_A]);

    let err = verifier
        .verify_token(&sign_without_kid(&KEY_A, &id_token_claims("user-1")))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::UnknownKey(_)), "got {err:?}");
    assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_bearer_value_is_no_token() {
    let (verifier, fetcher) = verifier(&[&KEY_A]);
    let token = sign(&KEY_A, &id_token_claims("user-1"));

    let err = verifier
        .verify(&format!("Basic {}", token))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::NoToken), "got {err:?}");
    assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
}
