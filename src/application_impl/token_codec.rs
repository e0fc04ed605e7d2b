use crate::application_port::*;
use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    // Random per token. Two tokens minted for the same user in the same
    // second still differ, which keeps session entries duplicate-free.
    jti: String,
}

/// HS256 codec shared by both token kinds; access and refresh differ only in
/// TTL. Verification rejects malformed, tampered and expired tokens with one
/// uniform error per kind so the endpoint cannot be probed for which it was.
pub struct JwtHs256Codec {
    cfg: TokenConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: TokenConfig) -> Self {
        Self { cfg }
    }

    fn sign(&self, user: UserId, ttl: Duration) -> Result<(String, DateTime<Utc>), AuthError> {
        let iat_dt = Utc::now();
        let exp_dt = iat_dt + ttl;
        let claims = Claims {
            sub: user.to_string(),
            exp: exp_dt.timestamp(),
            iat: iat_dt.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((token, exp_dt))
    }

    fn verify(&self, token: &str, uniform_err: fn() -> AuthError) -> Result<UserId, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_audience(&[self.cfg.audience.clone()]);
        validation.set_issuer(&[self.cfg.issuer.clone()]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.cfg.signing_key),
            &validation,
        )
        .map_err(|e| {
            debug!(kind = ?e.kind(), "token verification failed");
            uniform_err()
        })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| uniform_err())
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn sign_access_token(
        &self,
        user: UserId,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = self.sign(user, self.cfg.access_ttl)?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn sign_refresh_token(
        &self,
        user: UserId,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = self.sign(user, self.cfg.refresh_ttl)?;
        Ok((RefreshToken(token), exp_dt))
    }

    async fn verify_access_token(&self, token: &str) -> Result<UserId, AuthError> {
        self.verify(token, || AuthError::InvalidAccessToken)
    }

    async fn verify_refresh_token(&self, token: &str) -> Result<UserId, AuthError> {
        self.verify(token, || AuthError::InvalidRefreshToken)
    }
}
