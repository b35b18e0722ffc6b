use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::principal::Principal;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token lifetime out of range")]
    Lifetime,

    /// Signature, algorithm, expiry and claim-shape failures all collapse here.
    #[error("invalid credential")]
    Invalid,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TokenUse {
    Access,
    Refresh,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
    pub(crate) token_use: TokenUse,
}

#[derive(Debug, Clone)]
pub(crate) struct TokenPair {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) access_ttl_seconds: i64,
    pub(crate) refresh_ttl_seconds: i64,
}

pub(crate) struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl JwtService {
    const DEFAULT_ACCESS_TTL_SECONDS: i64 = 24 * 60 * 60;
    const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
    const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;
    const LEEWAY_SECONDS: u64 = 10;

    /// Non-positive lifetimes fall back to the defaults; lifetimes are capped at a year.
    pub(crate) fn new(secret: &str, access_ttl_minutes: i64, refresh_ttl_minutes: i64) -> Self {
        let access_ttl_seconds = ttl_seconds(access_ttl_minutes, Self::DEFAULT_ACCESS_TTL_SECONDS);
        let refresh_ttl_seconds =
            ttl_seconds(refresh_ttl_minutes, Self::DEFAULT_REFRESH_TTL_SECONDS);

        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    pub(crate) fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    pub(crate) fn issue(&self, principal: Principal) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue_access(principal)?,
            refresh_token: self.sign(principal, TokenUse::Refresh, self.refresh_ttl_seconds)?,
            access_ttl_seconds: self.access_ttl_seconds,
            refresh_ttl_seconds: self.refresh_ttl_seconds,
        })
    }

    pub(crate) fn issue_access(&self, principal: Principal) -> Result<String, JwtError> {
        self.sign(principal, TokenUse::Access, self.access_ttl_seconds)
    }

    pub(crate) fn verify_access(&self, token: &str) -> Result<Principal, JwtError> {
        self.verify(token, TokenUse::Access)
    }

    pub(crate) fn verify_refresh(&self, token: &str) -> Result<Principal, JwtError> {
        self.verify(token, TokenUse::Refresh)
    }

    fn sign(
        &self,
        principal: Principal,
        token_use: TokenUse,
        ttl_seconds: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = Duration::try_seconds(ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(JwtError::Lifetime)?;
        let claims = Claims {
            sub: principal.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            token_use,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::Encode)
    }

    fn verify(&self, token: &str, expected: TokenUse) -> Result<Principal, JwtError> {
        // Only HS256 is accepted; a header naming any other algorithm fails here.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = Self::LEEWAY_SECONDS;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|err| {
            debug!(error = %err, "token rejected");
            JwtError::Invalid
        })?;

        let claims = token_data.claims;
        if claims.token_use != expected {
            debug!(?expected, actual = ?claims.token_use, "token used for the wrong purpose");
            return Err(JwtError::Invalid);
        }

        claims.sub.parse::<Principal>().map_err(|_| JwtError::Invalid)
    }
}

fn ttl_seconds(minutes: i64, default_seconds: i64) -> i64 {
    if minutes <= 0 {
        return default_seconds;
    }
    minutes
        .checked_mul(60)
        .map_or(JwtService::MAX_TTL_SECONDS, |seconds| {
            seconds.min(JwtService::MAX_TTL_SECONDS)
        })
}
