//! Signed activation tokens for the email confirmation flow.
//!
//! Tokens are self-contained HS256 credentials carrying the registering
//! user's id under a `confirm` claim, with the issue time and a fixed
//! time-to-live baked in at encode time. Nothing is stored server-side;
//! validity is purely signature + clock. The signing secret is injected
//! explicitly so both ends of the codec share one configuration object.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, DecodingKey, EncodingKey, Header,
    Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Activation links stay valid for one hour.
pub const ACTIVATION_TTL_SECONDS: u64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
struct ActivationClaims {
    /// Id of the user the link confirms.
    confirm: Uuid,
    iat: u64,
    exp: u64,
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemError {
    /// Signature checked out but the validity window has elapsed.
    Expired,
    /// Malformed, tampered, or signed with a different secret.
    Invalid,
}

impl fmt::Display for RedeemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "activation token has expired"),
            Self::Invalid => write!(f, "activation token is invalid"),
        }
    }
}

impl std::error::Error for RedeemError {}

/// Issues and redeems activation tokens with a shared secret.
pub struct ActivationCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u64,
}

impl ActivationCodec {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self::with_ttl(secret, ACTIVATION_TTL_SECONDS)
    }

    #[must_use]
    pub fn with_ttl(secret: &SecretString, ttl_seconds: u64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    /// Mint a signed token confirming `user_id`.
    ///
    /// # Errors
    /// Returns an error if claim serialization or signing fails.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = get_current_timestamp();
        let claims = ActivationClaims {
            confirm: user_id,
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| anyhow::anyhow!("failed to sign activation token: {err}"))
    }

    /// Redeem a token, returning the embedded user id.
    ///
    /// # Errors
    /// `RedeemError::Expired` once the window has elapsed, `RedeemError::Invalid`
    /// for anything that fails structural or signature checks.
    pub fn redeem(&self, token: &str) -> Result<Uuid, RedeemError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        match decode::<ActivationClaims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims.confirm),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(RedeemError::Expired),
                _ => Err(RedeemError::Invalid),
            },
        }
    }
}

impl fmt::Debug for ActivationCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationCodec")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}
