//! Service-account authentication
//!
//! Signs an RS256 JWT assertion with the service account's private key,
//! exchanges it for an OAuth2 bearer token via the JWT-bearer grant, and
//! caches the token until shortly before expiry.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default scopes for Books API access
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/books"];

/// Default Google OAuth2 token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 grant type for service-account JWT assertions
const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime claimed by the signed assertion (the maximum Google accepts)
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if the endpoint omits expires_in (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Read a PEM private key file as raw bytes.
/// No local validation; jsonwebtoken rejects malformed keys at signing setup.
pub fn read_private_key(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("Failed to read private key file {}", path.display()))
}

/// Service-account JWT configuration: who signs, what for, and where the
/// assertion is exchanged.
#[derive(Clone)]
pub struct JwtConfig {
    pub client_email: String,
    pub private_key: Vec<u8>,
    pub scopes: Vec<String>,
    pub token_uri: String,
    /// User to impersonate (domain-wide delegation), if any
    pub subject: Option<String>,
}

impl JwtConfig {
    pub fn new(client_email: impl Into<String>, private_key: Vec<u8>) -> Self {
        Self {
            client_email: client_email.into(),
            private_key,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }
}

/// Claims set of the signed assertion
#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<&'a str>,
    iat: i64,
    exp: i64,
}

/// Token endpoint response body
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    /// Check if this cached token is still valid
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Service-account credentials holder with token caching
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    config: Arc<JwtConfig>,
    signing_key: Arc<EncodingKey>,
    http: reqwest::Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountCredentials {
    /// Create credentials from a JWT config.
    /// Fails fast if the private key is not a parseable RSA PEM.
    pub fn new(config: JwtConfig, http: reqwest::Client) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(&config.private_key)
            .context("Failed to parse service account private key (expected RSA PEM)")?;

        Ok(Self {
            config: Arc::new(config),
            signing_key: Arc::new(signing_key),
            http,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Get an access token for API calls.
    /// Checks token expiry before returning a cached token.
    pub async fn get_token(&self) -> Result<String> {
        // Check cache first - but only return if token is still valid
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                // Token expired or about to expire, will fetch new one
                tracing::debug!("Cached token expired, exchanging new assertion");
            }
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();

        // Cache it with expiry
        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(fresh);
        }

        Ok(token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> Result<String> {
        // Clear cache
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        // Get fresh token
        self.get_token().await
    }

    /// Sign the JWT assertion for the configured issuer, scopes, and subject
    fn sign_assertion(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.config.client_email,
            scope: self.config.scopes.join(" "),
            aud: &self.config.token_uri,
            sub: self.config.subject.as_deref(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .context("Failed to sign JWT assertion")
    }

    /// Exchange a signed assertion for a bearer token
    async fn exchange(&self) -> Result<CachedToken> {
        let assertion = self.sign_assertion()?;

        tracing::debug!("POST {}", self.config.token_uri);

        let response = self
            .http
            .post(&self.config.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("Failed to send token request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read token response body")?;

        if !status.is_success() {
            tracing::error!(
                "Token exchange error: {} - {}",
                status,
                super::http::sanitize_for_log(&body)
            );
            return Err(anyhow::anyhow!("Token exchange failed: {}", status));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).context("Failed to parse token response JSON")?;

        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(CachedToken {
            token: token.access_token,
            expires_at,
        })
    }
}
