//! Access token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the shared secret in [`AuthConfig`]. They are stateless: the server keeps no
//! record of the tokens it has issued, and a token stays valid until it expires.
use std::fmt::Debug;

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The id of the account the token was issued to
    pub sub: i64,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenIssuer (HS256, lifetime {}h)", self.lifetime.num_hours())
    }
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime: config.token_lifetime,
        }
    }

    pub fn issue_token(&self, account_id: i64) -> Result<String, ServerError> {
        self.issue_token_at(account_id, Utc::now())
    }

    /// Issues a token as though the current time were `issued_at`.
    pub fn issue_token_at(&self, account_id: i64, issued_at: DateTime<Utc>) -> Result<String, ServerError> {
        let expires_at = issued_at + self.lifetime;
        let claims = JwtClaims { sub: account_id, iat: issued_at.timestamp(), exp: expires_at.timestamp() };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServerError::CouldNotSerializeAccessToken(e.to_string()))?;
        debug!("🔑️ Issued access token for account #{account_id}, valid until {expires_at}");
        Ok(token)
    }

    /// Checks the signature and expiry of `token` and returns its claims.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("🔑️ Rejected access token. {e}");
            AuthError::InvalidToken(e.to_string())
        })?;
        trace!("🔑️ Access token for account #{} verified", data.claims.sub);
        Ok(data.claims)
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedToken)?;
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedToken),
    }
}
