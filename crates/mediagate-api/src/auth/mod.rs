//! Bearer-token authorization: key-set resolution, token verification and
//! gateway decision documents.

pub mod jwks;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod verifier;

pub use jwks::{HttpKeySetFetcher, Jwk, Jwks, KeySetCache, KeySetError, KeySetFetcher};
pub use models::Principal;
pub use policy::{AuthDecision, AuthorizationDecisionBuilder, PolicyGrant};
pub use verifier::{bearer_token, AuthError, TokenVerifier};
