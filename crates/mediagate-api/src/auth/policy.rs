//! Gateway authorization decision documents

use serde::Serialize;

use crate::auth::models::Principal;
use crate::auth::verifier::AuthError;

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
const ANONYMOUS_PRINCIPAL: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// The grants this authorizer can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyGrant {
    /// Invoke any resource behind the gateway.
    #[default]
    AllowInvokeAll,
}

impl PolicyGrant {
    fn statement(self) -> Statement {
        match self {
            PolicyGrant::AllowInvokeAll => Statement {
                action: INVOKE_ACTION,
                effect: Effect::Allow,
                resource: "*".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    #[serde(rename = "Action")]
    pub action: &'static str,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Resource")]
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
}

/// Claim fields forwarded to downstream handlers. Absent claims are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&Principal> for DecisionContext {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.sub.clone(),
            email_verified: principal.email_verified,
            first_name: principal.given_name.clone(),
            last_name: principal.family_name.clone(),
            picture: principal.picture.clone(),
            email: principal.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthDecision {
    pub principal_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_document: Option<PolicyDocument>,
    pub context: DecisionContext,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizationDecisionBuilder {
    grant: PolicyGrant,
}

impl AuthorizationDecisionBuilder {
    pub fn new(grant: PolicyGrant) -> Self {
        Self { grant }
    }

    /// Allow decision for a verified principal.
    pub fn build(&self, principal: &Principal) -> AuthDecision {
        AuthDecision {
            principal_id: principal
                .sub
                .clone()
                .unwrap_or_else(|| ANONYMOUS_PRINCIPAL.to_string()),
            policy_document: Some(PolicyDocument {
                version: POLICY_VERSION,
                statement: vec![self.grant.statement()],
            }),
            context: DecisionContext::from(principal),
        }
    }

    /// A failed verification never produces a document; the error passes through.
    pub fn decide(&self, verified: Result<Principal, AuthError>) -> Result<AuthDecision, AuthError> {
        verified.map(|principal| self.build(&principal))
    }
}
