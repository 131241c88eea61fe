//! Bearer token verification against the provider key set

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use mediagate_core::constants::MAX_TOKEN_SIZE_BYTES;
use mediagate_core::{AppError, AuthConfig};
use std::sync::Arc;
use thiserror::Error;

use crate::auth::jwks::{KeySetCache, KeySetError};
use crate::auth::models::Principal;

const SUPPORTED_ALGORITHMS: [Algorithm; 2] = [Algorithm::RS256, Algorithm::ES256];

/// Why a token was refused. Only ever logged; callers see "Unauthorized".
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No bearer token supplied")]
    NoToken,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("No key with id '{0}' in the key set")]
    UnknownKey(String),

    #[error("Key set unavailable: {0}")]
    KeySetUnavailable(#[from] KeySetError),

    #[error("Signature invalid: {0}")]
    SignatureInvalid(String),

    #[error("Claims invalid: {0}")]
    ClaimsInvalid(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::KeySetUnavailable(_) => AppError::ServiceUnavailable(err.to_string()),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

/// Split an authorization value into its bearer token.
///
/// Exactly two whitespace-separated parts, the first `bearer` in any case.
pub fn bearer_token(authorization: &str) -> Result<&str, AuthError> {
    let mut parts = authorization.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::NoToken),
    }
}

/// Verifies RS256/ES256 identity tokens and projects them into a [`Principal`].
pub struct TokenVerifier {
    keys: Arc<KeySetCache>,
    issuer: Option<String>,
    audience: Option<String>,
    leeway_seconds: u64,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeySetCache>) -> Self {
        Self {
            keys,
            issuer: None,
            audience: None,
            leeway_seconds: 0,
        }
    }

    pub fn from_config(config: &AuthConfig, keys: Arc<KeySetCache>) -> Self {
        Self {
            keys,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            leeway_seconds: config.leeway_seconds,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn key_set(&self) -> &Arc<KeySetCache> {
        &self.keys
    }

    /// Verify a raw `Authorization`-style value (`Bearer <token>`).
    pub async fn verify(&self, authorization: &str) -> Result<Principal, AuthError> {
        let token = bearer_token(authorization)?;
        self.verify_token(token).await
    }

    /// Verify a compact token. All-or-nothing: any failed check refuses the token.
    #[tracing::instrument(skip_all, fields(token_len = token.len()))]
    pub async fn verify_token(&self, token: &str) -> Result<Principal, AuthError> {
        if token.len() > MAX_TOKEN_SIZE_BYTES {
            return Err(AuthError::Malformed(format!(
                "token exceeds {} bytes",
                MAX_TOKEN_SIZE_BYTES
            )));
        }

        let header = decode_header(token)
            .map_err(|e| AuthError::Malformed(format!("invalid token header: {}", e)))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::UnknownKey("<none>".to_string()))?;

        let key = self
            .keys
            .resolve(&kid)
            .await?
            .ok_or_else(|| AuthError::UnknownKey(kid.clone()))?;

        if !SUPPORTED_ALGORITHMS.contains(&header.alg) {
            return Err(AuthError::SignatureInvalid(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }

        let data = decode::<Principal>(token, &key, &self.validation(header.alg))
            .map_err(map_jwt_error)?;

        tracing::debug!(kid = %kid, "Token verified");

        Ok(data.claims)
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = self.leeway_seconds;

        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        validation
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature
        | ErrorKind::ImmatureSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Json(_) => AuthError::ClaimsInvalid(err.to_string()),
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
            AuthError::Malformed(err.to_string())
        }
        _ => AuthError::SignatureInvalid(err.to_string()),
    }
}
