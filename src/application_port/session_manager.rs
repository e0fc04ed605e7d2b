use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("access token invalid")]
    InvalidAccessToken,
    #[error("refresh token invalid")]
    InvalidRefreshToken,
    #[error("refresh token revoked")]
    RefreshTokenRevoked,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Adapter-level failure: the backing store was unreachable or the write
    /// itself failed. The in-memory adapter never produces this; adapters for
    /// a real store surface their driver errors here and the gateway maps it
    /// to a 503.
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Stateless signing and verification of bearer tokens. Verification fails
/// uniformly for malformed, tampered and expired tokens so callers cannot be
/// used as an oracle; the distinction is only ever logged internally.
#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn sign_access_token(
        &self,
        user: UserId,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError>;
    async fn sign_refresh_token(
        &self,
        user: UserId,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError>;
    /// Fails with `InvalidAccessToken`.
    async fn verify_access_token(&self, token: &str) -> Result<UserId, AuthError>;
    /// Fails with `InvalidRefreshToken`.
    async fn verify_refresh_token(&self, token: &str) -> Result<UserId, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

/// Orchestrates the refresh-token lifecycle: issuance, single-use rotation,
/// revocation and pruning, plus access-token issuance alongside.
///
/// A refresh token is valid only while BOTH hold: its signature verifies and a
/// matching live `SessionEntry` exists in the owner's collection. The second
/// condition is what makes revocation possible for a self-contained token.
#[async_trait::async_trait]
pub trait SessionManager: Send + Sync {
    /// Mint a fresh access/refresh pair for an already-authenticated user,
    /// pruning entries older than the validity window before appending the new
    /// entry. The returned refresh token has exactly one live entry.
    async fn issue_session(&self, user_id: UserId) -> Result<SessionTokens, AuthError>;

    /// Exchange a live refresh token for a new pair. Of N concurrent calls
    /// presenting the same token, at most one succeeds; the rest fail closed.
    /// A signature-valid token with no live entry is treated as replay of an
    /// already-rotated credential: every session for that user is revoked
    /// before the call fails with `RefreshTokenRevoked`.
    async fn rotate(&self, refresh_token: &str) -> Result<SessionTokens, AuthError>;

    /// Remove the entry matching this token, if any. Never fails: logout must
    /// not error visibly, whatever state the token is in.
    async fn revoke_one(&self, user_id: UserId, refresh_token: &str);

    /// Clear every session entry for the user ("log out everywhere").
    async fn revoke_all(&self, user_id: UserId) -> Result<(), AuthError>;

    /// Fails with `InvalidAccessToken`.
    async fn verify_access_token(&self, token: &str) -> Result<UserId, AuthError>;
}
