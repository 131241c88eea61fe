//! Identity-provider key-set fetching and caching
//!
//! [`KeySetCache`] resolves a token's key id to a [`DecodingKey`]. The whole
//! set is rebuilt on a miss or when the configured TTL has elapsed, never
//! patched in place. Concurrent misses share one fetch: callers queue on a
//! refresh gate and, if a fetch finished while they waited, take its outcome
//! (the new set or the same error) instead of fetching again.

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// JSON Web Key structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(rename = "alg", default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub modulus: Option<String>, // For RSA
    #[serde(rename = "e", default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<String>, // For RSA
    #[serde(rename = "x", default, skip_serializing_if = "Option::is_none")]
    pub x_coordinate: Option<String>, // For EC
    #[serde(rename = "y", default, skip_serializing_if = "Option::is_none")]
    pub y_coordinate: Option<String>, // For EC
    #[serde(rename = "crv", default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>, // For EC
}

impl Jwk {
    /// RSA key from base64url modulus and exponent.
    pub fn rsa(key_id: impl Into<String>, modulus: impl Into<String>, exponent: impl Into<String>) -> Self {
        Self {
            key_type: "RSA".to_string(),
            key_id: Some(key_id.into()),
            key_use: Some("sig".to_string()),
            algorithm: Some("RS256".to_string()),
            modulus: Some(modulus.into()),
            exponent: Some(exponent.into()),
            x_coordinate: None,
            y_coordinate: None,
            curve: None,
        }
    }

    fn to_decoding_key(&self) -> Result<DecodingKey, String> {
        match self.key_type.as_str() {
            "RSA" => {
                let n = self.modulus.as_deref().ok_or("RSA key missing modulus")?;
                let e = self.exponent.as_deref().ok_or("RSA key missing exponent")?;
                DecodingKey::from_rsa_components(n, e)
                    .map_err(|e| format!("Failed to create RSA key: {}", e))
            }
            "EC" => {
                let x = self.x_coordinate.as_deref().ok_or("EC key missing x coordinate")?;
                let y = self.y_coordinate.as_deref().ok_or("EC key missing y coordinate")?;
                let curve = self.curve.as_deref().ok_or("EC key missing curve")?;

                // ES256 only
                if curve != "P-256" {
                    return Err(format!(
                        "Unsupported EC curve: {} (only P-256 is supported)",
                        curve
                    ));
                }

                DecodingKey::from_ec_components(x, y)
                    .map_err(|e| format!("Failed to create EC key: {}", e))
            }
            other => Err(format!("Unsupported key type: {}", other)),
        }
    }
}

/// Reasons a key set could not be obtained
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeySetError {
    #[error("Failed to fetch key set: {0}")]
    Transport(String),

    #[error("Key set endpoint returned status {0}")]
    Status(u16),

    #[error("Failed to parse key set: {0}")]
    Malformed(String),

    #[error("Key set contains no usable keys")]
    Empty,

    #[error("Key set fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of the raw key-set document
#[async_trait]
pub trait KeySetFetcher: Send + Sync {
    async fn fetch(&self) -> Result<Jwks, KeySetError>;
}

/// Fetches the key set over HTTP with a per-request timeout.
pub struct HttpKeySetFetcher {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpKeySetFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySetError::Transport(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_reqwest(&self, err: reqwest::Error) -> KeySetError {
        if err.is_timeout() {
            KeySetError::Timeout(self.timeout)
        } else if err.is_decode() {
            KeySetError::Malformed(err.to_string())
        } else {
            KeySetError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch(&self) -> Result<Jwks, KeySetError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySetError::Status(status.as_u16()));
        }

        response.json::<Jwks>().await.map_err(|e| self.map_reqwest(e))
    }
}

struct CachedKeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
    generation: u64,
}

impl CachedKeySet {
    fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        ttl.map_or(true, |ttl| self.fetched_at.elapsed() < ttl)
    }
}

/// Outcome of the most recent fetch, guarded by the refresh gate.
#[derive(Default)]
struct LastAttempt {
    seq: u64,
    error: Option<KeySetError>,
}

/// Process-wide cache of the provider's signing keys.
pub struct KeySetCache {
    fetcher: Arc<dyn KeySetFetcher>,
    ttl: Option<Duration>,
    current: RwLock<Option<Arc<CachedKeySet>>>,
    refresh_gate: Mutex<LastAttempt>,
    /// Mirrors `LastAttempt::seq` so callers can note it without the gate.
    attempts: AtomicU64,
}

impl KeySetCache {
    /// `ttl` of `None` keeps a set until a lookup misses.
    pub fn new(fetcher: Arc<dyn KeySetFetcher>, ttl: Option<Duration>) -> Self {
        Self {
            fetcher,
            ttl,
            current: RwLock::new(None),
            refresh_gate: Mutex::new(LastAttempt::default()),
            attempts: AtomicU64::new(0),
        }
    }

    /// Look up `kid`, refreshing the set on a miss.
    ///
    /// `Ok(None)` means the freshly fetched set does not contain the key.
    /// Callers that queued behind a fetch receive its outcome, success or
    /// failure, instead of fetching again.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, kid: &str) -> Result<Option<DecodingKey>, KeySetError> {
        let observed = self.attempts.load(Ordering::SeqCst);

        if let Some(set) = self.current.read().await.as_ref() {
            if set.is_fresh(self.ttl) {
                if let Some(key) = set.keys.get(kid) {
                    tracing::debug!("Key set cache hit");
                    return Ok(Some(key.clone()));
                }
            }
        }

        tracing::debug!("Key set cache miss");

        let mut last = self.refresh_gate.lock().await;

        if last.seq != observed {
            if let Some(err) = &last.error {
                tracing::debug!(error = %err, "Sharing failed key set fetch");
                return Err(err.clone());
            }
            if let Some(set) = self.current.read().await.as_ref() {
                return Ok(set.keys.get(kid).cloned());
            }
        }

        let set = self.load(&mut last).await?;
        Ok(set.keys.get(kid).cloned())
    }

    /// Fetch and install a new key set unconditionally.
    pub async fn refresh(&self) -> Result<usize, KeySetError> {
        let mut last = self.refresh_gate.lock().await;
        Ok(self.load(&mut last).await?.keys.len())
    }

    /// Number of keys in the installed set, if any.
    pub async fn len(&self) -> usize {
        self.current
            .read()
            .await
            .as_ref()
            .map_or(0, |set| set.keys.len())
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Fetch once and record the outcome for callers queued on the gate.
    async fn load(&self, last: &mut LastAttempt) -> Result<Arc<CachedKeySet>, KeySetError> {
        let seq = last.seq + 1;
        let result = self.fetch_and_install(seq).await;

        last.error = result.as_ref().err().cloned();
        last.seq = seq;
        self.attempts.store(seq, Ordering::SeqCst);

        result
    }

    async fn fetch_and_install(&self, generation: u64) -> Result<Arc<CachedKeySet>, KeySetError> {
        let start = Instant::now();

        let jwks = self.fetcher.fetch().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch key set");
            e
        })?;

        let keys = parse_key_set(&jwks);
        if keys.is_empty() {
            tracing::error!(published = jwks.keys.len(), "Key set contains no usable keys");
            return Err(KeySetError::Empty);
        }

        let set = Arc::new(CachedKeySet {
            keys,
            fetched_at: Instant::now(),
            generation,
        });

        *self.current.write().await = Some(Arc::clone(&set));

        tracing::info!(
            key_count = set.keys.len(),
            generation = set.generation,
            duration_ms = start.elapsed().as_millis() as u64,
            "Key set refreshed"
        );

        Ok(set)
    }
}

/// Build the kid → key map, skipping entries that cannot be used for signatures.
fn parse_key_set(jwks: &Jwks) -> HashMap<String, DecodingKey> {
    let mut keys = HashMap::with_capacity(jwks.keys.len());

    for jwk in &jwks.keys {
        let Some(kid) = jwk.key_id.as_deref() else {
            tracing::warn!(kty = %jwk.key_type, "Skipping key without kid");
            continue;
        };

        if jwk.key_use.as_deref().is_some_and(|u| u != "sig") {
            continue;
        }

        match jwk.to_decoding_key() {
            Ok(key) => {
                keys.insert(kid.to_string(), key);
            }
            Err(e) => {
                tracing::warn!(kid = %kid, error = %e, "Skipping unusable key");
            }
        }
    }

    keys
}
