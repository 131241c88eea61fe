//! Gateway token authorizer

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{AuthDecision, AuthError};
use crate::error::AuthRejection;
use crate::state::AppState;

/// Authorizer event as sent by the gateway.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    #[serde(default)]
    pub authorization_token: Option<String>,
    #[serde(default)]
    pub method_arn: Option<String>,
}

/// Verify the event's bearer token and return an allow decision.
///
/// Every failure, including an unreadable event, is a bare 401.
#[tracing::instrument(skip_all)]
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Result<Json<AuthDecision>, AuthRejection> {
    let Json(event) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Unreadable authorizer event");
        AuthError::NoToken
    })?;

    let token = event.authorization_token.unwrap_or_default();
    if let Some(method_arn) = &event.method_arn {
        tracing::debug!(method_arn = %method_arn, "Authorizing request");
    }

    let verified = state.verifier.verify(&token).await;
    let decision = state.decisions.decide(verified)?;

    tracing::info!("Authorization granted");
    Ok(Json(decision))
}
