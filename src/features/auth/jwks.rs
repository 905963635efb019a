use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// RSA signing keys of the identity provider, cached for `cache_ttl`.
///
/// An unknown `kid` forces a refetch so key rotation is picked up before the TTL expires.
pub struct JwksClient {
    jwks_url: String,
    client: reqwest::Client,
    cache: RwLock<Option<JwksCache>>,
    cache_ttl: Duration,
}

impl JwksClient {
    pub fn new(jwks_url: &str, cache_ttl: Duration) -> Self {
        Self {
            jwks_url: jwks_url.to_string(),
            client: reqwest::Client::new(),
            cache: RwLock::new(None),
            cache_ttl,
        }
    }

    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys.get(kid).cloned();

        *self.cache.write().await = Some(JwksCache {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, JwksError> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::FetchError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;
        parse_jwks(&body)
    }
}

/// RSA keys of a JWKS document by `kid`; keys of other types or without `kid` are skipped
fn parse_jwks(body: &str) -> Result<HashMap<String, DecodingKey>, JwksError> {
    let jwks: JwksResponse =
        serde_json::from_str(body).map_err(|e| JwksError::ParseError(e.to_string()))?;

    let mut keys = HashMap::new();
    for jwk in jwks.keys {
        let (Some(kid), Some(n), Some(e)) = (jwk.kid, jwk.n, jwk.e) else {
            continue;
        };
        if jwk.kty != "RSA" {
            continue;
        }
        let key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|e| JwksError::KeyConversionError(e.to_string()))?;
        keys.insert(kid, key);
    }
    Ok(keys)
}

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    FetchError(String),

    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to convert key: {0}")]
    KeyConversionError(String),
}
