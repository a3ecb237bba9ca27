//! Signed session tokens.
//!
//! A token is an HS256 JWT carrying the session id and a fixed purpose tag.
//! It has no expiry of its own: it is valid exactly as long as the session
//! row it names exists, so deleting the row revokes every copy.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

pub const SESSION_PURPOSE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sid: Uuid,
    pur: String,
}

pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionTokens {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
        }
    }

    /// # Errors
    /// Fails only if the JWT library cannot serialize the claims.
    pub fn issue(&self, session_id: Uuid) -> Result<String, DomainError> {
        let claims = SessionClaims {
            sid: session_id,
            pur: SESSION_PURPOSE.to_owned(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(anyhow::anyhow!("token signing failed: {e}")))
    }

    /// Session id named by a well-formed, correctly signed session token.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).ok()?;
        (data.claims.pur == SESSION_PURPOSE).then_some(data.claims.sid)
    }
}
