//! Authentication primitives
//!
//! Password hashing, deterministic customer identity derivation, and the
//! token-issuance capability the bank consumes at login. Plaintext
//! credentials never leave the functions that receive them.

use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Iteration count for password stretching.
const STRETCH_ROUNDS: u32 = 10_000;

/// Calculate SHA-256 and return as hex string
pub(crate) fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Constant-time equality for hex digests.
fn digests_match(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// =========================================================================
// Customer identity
// =========================================================================

/// Stable customer identity, derived deterministically from the email
/// address. The same email always yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    /// Derive the id from an email address. Pure: whitespace is trimmed and
    /// case is folded before hashing, nothing else enters the digest.
    pub fn from_email(email: &str) -> Self {
        let normalized = email.trim().to_lowercase();
        Self(sha256_hex(normalized.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =========================================================================
// Password hashing
// =========================================================================

/// Salted, stretched password hash.
///
/// Each hash carries its own random salt; the digest is an iterated
/// SHA-256 chain over `salt || password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = hex::encode(salt);
        let digest = Self::stretch(&salt, password);
        Self { salt, digest }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        digests_match(&Self::stretch(&self.salt, candidate), &self.digest)
    }

    fn stretch(salt: &str, password: &str) -> String {
        let mut digest = {
            let mut hasher = Sha256::new();
            hasher.update(salt.as_bytes());
            hasher.update(password.as_bytes());
            hasher.finalize()
        };
        for _ in 1..STRETCH_ROUNDS {
            digest = Sha256::digest(digest);
        }
        hex::encode(digest)
    }
}

// =========================================================================
// Token capability
// =========================================================================

/// An opaque, signed, time-limited credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Token verification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is invalid")]
    Invalid,
}

/// Capability for issuing and verifying login credentials.
///
/// Consumed generically so implementations stay free to do real I/O; the
/// bank awaits these calls while holding no lock.
pub trait TokenIssuer {
    fn issue(
        &self,
        customer: &CustomerId,
        ttl: Duration,
    ) -> impl Future<Output = Result<AccessToken, TokenError>> + Send;

    fn verify(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<CustomerId, TokenError>> + Send;
}

/// Token issuer backed by a shared secret: `customer.expiry.signature`,
/// where the signature is a SHA-256 over the secret and the payload.
#[derive(Debug, Clone)]
pub struct SignedTokenIssuer {
    secret: Vec<u8>,
}

impl SignedTokenIssuer {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Fresh issuer with a random secret. Tokens from earlier instances do
    /// not verify against this one.
    pub fn random() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self {
            secret: secret.to_vec(),
        }
    }

    fn sign(&self, payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl TokenIssuer for SignedTokenIssuer {
    async fn issue(
        &self,
        customer: &CustomerId,
        ttl: Duration,
    ) -> Result<AccessToken, TokenError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenError::Invalid)?;
        let expires_at = (Utc::now() + ttl).timestamp();
        let payload = format!("{}.{}", customer.as_str(), expires_at);
        let signature = self.sign(&payload);
        Ok(AccessToken(format!("{payload}.{signature}")))
    }

    async fn verify(&self, token: &AccessToken) -> Result<CustomerId, TokenError> {
        let mut parts = token.0.splitn(3, '.');
        let (customer, expires_at, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(e), Some(s)) => (c, e, s),
            _ => return Err(TokenError::Invalid),
        };

        let payload = format!("{customer}.{expires_at}");
        if !digests_match(&self.sign(&payload), signature) {
            return Err(TokenError::Invalid);
        }

        let expires_at: i64 = expires_at.parse().map_err(|_| TokenError::Invalid)?;
        if Utc::now().timestamp() >= expires_at {
            return Err(TokenError::Expired);
        }

        Ok(CustomerId(customer.to_string()))
    }
}
