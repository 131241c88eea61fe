use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identity-token claims as verified. Registered time claims are validated
/// by `jsonwebtoken` and not kept here.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl Principal {
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }
}

// Subject and profile fields stay out of logs.
impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("sub", &self.sub.as_ref().map(|_| "[REDACTED]"))
            .field("email", &self.email.as_ref().map(|_| "[REDACTED]"))
            .field("email_verified", &self.email_verified)
            .field("given_name", &self.given_name.as_ref().map(|_| "[REDACTED]"))
            .field("family_name", &self.family_name.as_ref().map(|_| "[REDACTED]"))
            .field("picture", &self.picture.is_some())
            .finish()
    }
}

/// Some providers publish `email_verified` as the string `"true"`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    Ok(
        match Option::<BoolOrString>::deserialize(deserializer)? {
            Some(BoolOrString::Bool(b)) => Some(b),
            Some(BoolOrString::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            None => None,
        },
    )
}
