//! Token codec: HS256 access tokens bound to a server-side session.
//!
//! A token carries the [`Principal`] plus `iat`, `exp` and `iss`. Signature,
//! algorithm and issuer are checked by `jsonwebtoken`; the time window is
//! checked exactly once, here, against the `exp` claim. The library's own
//! expiry validation is switched off so there is a single source of truth.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sentinel_core::error::AuthError;
use sentinel_core::principal::Principal;
use sentinel_core::types::{DbId, SessionId, Timestamp};

/// The only algorithm tokens may be signed with.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: DbId,
    pub email: String,
    pub username: String,
    /// Session this token is bound to. Must resolve to a live session row.
    pub session_id: SessionId,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            email: self.email.clone(),
            username: self.username.clone(),
            session_id: self.session_id,
        }
    }

    pub fn expires_at(&self) -> Timestamp {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// A freshly signed token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signing configuration, resolved once at startup.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Value stamped into and required from the `iss` claim.
    pub issuer: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Mints and verifies access tokens with a process-wide key.
///
/// Keys are derived once in [`TokenCodec::new`] and only read afterwards, so
/// a single codec is shared across all requests behind an `Arc`.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Build a codec from the signing secret. An empty secret cannot sign.
    pub fn new(config: &JwtConfig) -> Result<Self, AuthError> {
        if config.secret.is_empty() {
            return Err(AuthError::SigningError("signing secret is empty".into()));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "iss"]);
        validation.set_issuer(&[config.issuer.as_str()]);

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
        })
    }

    /// Mint a token for `principal` valid from now for `ttl`.
    pub fn mint(&self, principal: &Principal, ttl: Duration) -> Result<MintedToken, AuthError> {
        if ttl <= Duration::zero() {
            return Err(AuthError::SigningError(
                "token lifetime must be positive".into(),
            ));
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: principal.user_id,
            email: principal.email.clone(),
            username: principal.username.clone(),
            session_id: principal.session_id,
            iat: now,
            exp: now + ttl.num_seconds(),
            iss: self.issuer.clone(),
        };

        let token = self.sign(&claims)?;
        Ok(MintedToken { token, claims })
    }

    /// Sign an arbitrary claim set with the codec's key.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding)
            .map_err(|e| AuthError::SigningError(e.to_string()))
    }

    /// Verify signature, algorithm and issuer, then the expiry window.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::TokenInvalid("empty token".into()));
        }

        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| AuthError::TokenInvalid(e.to_string()))?
            .claims;

        if Utc::now().timestamp() > claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
