use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Claims of a pre-issued identity token. Only the subject and email matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub exp: usize,
    pub email: Option<String>,
}

#[derive(Clone)]
enum KeyMaterial {
    Ec { x: String, y: String },
    Rsa { n: String, e: String },
}

#[derive(Clone)]
struct JwksKeyData {
    material: KeyMaterial,
    algorithm: Algorithm,
}

/// Verifies identity tokens against the provider's published key set.
#[derive(Clone)]
pub struct JwksCache {
    cache: Arc<Cache<String, JwksKeyData>>,
    jwks_url: String,
    client: reqwest::Client,
    api_key: Option<String>,
}

impl JwksCache {
    pub fn new(jwks_url: &str, api_key: Option<&str>) -> Self {
        let client = reqwest::Client::new();
        let cache = Arc::new(
            Cache::builder()
                .time_to_live(std::time::Duration::from_secs(3600))
                .max_capacity(10)
                .build(),
        );

        Self {
            cache,
            jwks_url: jwks_url.to_string(),
            client,
            api_key: api_key.map(str::to_string),
        }
    }

    async fn fetch_jwks(&self) -> Result<serde_json::Value, String> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let mut request = self.client.get(&self.jwks_url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("Failed to fetch JWKS: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Failed to fetch JWKS: HTTP {status}"));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| format!("Failed to parse JWKS JSON: {e}"))
    }

    async fn get_key_data(&self, kid: &str) -> Result<JwksKeyData, String> {
        if let Some(cached) = self.cache.get(kid).await {
            return Ok(cached);
        }

        let jwks = self.fetch_jwks().await?;
        let keys = jwks["keys"].as_array().ok_or("No keys in JWKS")?;

        let jwk = keys
            .iter()
            .find(|k| k["kid"].as_str() == Some(kid))
            .ok_or(format!("Key with kid={kid} not found in JWKS"))?;

        let field = |name: &str| {
            jwk[name]
                .as_str()
                .map(str::to_string)
                .ok_or(format!("Missing '{name}' in JWK"))
        };

        let key_data = match jwk["kty"].as_str().unwrap_or("EC") {
            "RSA" => JwksKeyData {
                material: KeyMaterial::Rsa {
                    n: field("n")?,
                    e: field("e")?,
                },
                algorithm: match jwk["alg"].as_str().unwrap_or("RS256") {
                    "RS384" => Algorithm::RS384,
                    "RS512" => Algorithm::RS512,
                    _ => Algorithm::RS256,
                },
            },
            _ => JwksKeyData {
                material: KeyMaterial::Ec {
                    x: field("x")?,
                    y: field("y")?,
                },
                algorithm: match jwk["alg"].as_str().unwrap_or("ES256") {
                    "ES384" => Algorithm::ES384,
                    _ => Algorithm::ES256,
                },
            },
        };

        self.cache.insert(kid.to_string(), key_data.clone()).await;
        Ok(key_data)
    }

    pub async fn validate_token(&self, token: &str) -> Result<IdentityClaims, String> {
        let header = decode_header(token).map_err(|e| format!("Failed to decode header: {e}"))?;
        let kid = header.kid.ok_or("No 'kid' in token header")?;

        let key_data = self.get_key_data(&kid).await?;

        let decoding_key = match &key_data.material {
            KeyMaterial::Ec { x, y } => DecodingKey::from_ec_components(x, y),
            KeyMaterial::Rsa { n, e } => DecodingKey::from_rsa_components(n, e),
        }
        .map_err(|e| format!("Failed to create decoding key: {e}"))?;

        let mut validation = Validation::new(key_data.algorithm);
        validation.validate_aud = false;

        decode::<IdentityClaims>(token, &decoding_key, &validation)
            .map(|td| td.claims)
            .map_err(|e| format!("Token validation failed: {e}"))
    }
}
