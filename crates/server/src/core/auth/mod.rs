//! Authentication Module
//!
//! Password hashing and signed bearer tokens. Tokens are HS256 JWTs signed
//! with the server secret; the claims carry the user id and username.

pub mod handlers;
pub mod middleware;

use crate::core::error::{Error, Result};
use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// bcrypt cost factor for stored password hashes.
pub const PASSWORD_HASH_COST: u32 = 10;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Minimum password length, counted after trimming whitespace.
pub const MIN_PASSWORD_LEN: usize = 3;

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: Uuid,
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Issue a token for the given user.
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)
            .context("Failed to sign token")
            .map_err(Error::from)
    }

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// Expired tokens yield [`Error::TokenExpired`]; anything else that fails
    /// verification yields [`Error::InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

/// Hash a raw password for storage.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, PASSWORD_HASH_COST)
        .context("Failed to hash password")
        .map_err(Error::from)
}

/// Check a raw password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

pub fn password_is_acceptable(password: &str) -> bool {
    password.trim().chars().count() >= MIN_PASSWORD_LEN
}
