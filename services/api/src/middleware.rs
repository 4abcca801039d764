//! Authentication middleware for JWT token validation
//!
//! Tokens are minted by the authentication service; this service only
//! verifies them and turns their claims into a [`Caller`].

use anyhow::{Context, Result};
use approvals::models::Caller;
use axum::{extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::AuthConfig, error::ApiError, state::AppState};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User role
    pub role: String,
    /// Business (tenant) the user belongs to
    pub business_id: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Caller::new(claims.sub, claims.role.as_str(), claims.business_id)
    }
}

/// Verifies bearer tokens against the configured key
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: Arc<DecodingKey>,
    validation: Validation,
}

impl JwtVerifier {
    /// Build a verifier from the auth configuration
    ///
    /// An RS256 public key takes precedence over an HS256 secret. The public
    /// key may be given inline as PEM or as a path to a PEM file.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        if let Some(public_key) = &config.jwt_public_key {
            let pem = if public_key.starts_with("-----BEGIN") {
                public_key.clone()
            } else {
                std::fs::read_to_string(public_key)
                    .with_context(|| format!("Failed to read public key file {}", public_key))?
                    .trim()
                    .to_string()
            };
            let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                .context("Failed to create decoding key")?;
            return Ok(Self::new(key, Algorithm::RS256));
        }

        let secret = config
            .jwt_secret
            .as_deref()
            .context("No JWT key configured")?;
        Ok(Self::with_secret(secret.as_bytes()))
    }

    /// HS256 verifier over a shared secret
    pub fn with_secret(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        Self {
            decoding_key: Arc::new(key),
            validation,
        }
    }

    /// Validate a token and return the caller it identifies
    pub fn verify(&self, token: &str) -> Result<Caller, jsonwebtoken::errors::Error> {
        let token_data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims.into())
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthorized)?;

    let caller = state.jwt_verifier.verify(bearer.token()).map_err(|e| {
        warn!("Failed to validate token: {}", e);
        ApiError::Unauthorized
    })?;
    debug!(user_id = %caller.user_id, role = %caller.role, "Authenticated caller");

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
