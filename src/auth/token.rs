//! Access token issuing and verification (HS256 JWT)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Upper bound on token lifetime (one year)
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// JWT claims carried by access tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated identity (the user's email)
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and checks access tokens with a shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
        }
    }

    /// Generate a random 16-byte secret, hex encoded
    pub fn random_secret() -> String {
        let bytes: Vec<u8> = (0..16).map(|_| rand::thread_rng().gen()).collect();
        hex::encode(bytes)
    }

    pub fn issue(&self, identity: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::Token(e.to_string()))
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// Both the bare token and `Bearer <token>` are accepted.
pub fn extract_token(header: &str) -> Option<&str> {
    let value = header.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None if value.eq_ignore_ascii_case("bearer") => return None,
        None => value,
    };
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
