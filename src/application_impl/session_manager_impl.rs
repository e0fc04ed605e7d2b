use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Session lifecycle over a document store. Correctness rests on one thing:
/// `UserStore::pull_session` is an atomic conditional removal, so for any
/// token value at most one concurrent rotation can consume its entry.
pub struct RefreshSessionManager {
    token_codec: Arc<dyn TokenCodec>,
    user_store: Arc<dyn UserStore>,
    /// Entries older than this are dropped before every insertion. Usually
    /// equal to the refresh TTL, but configured independently.
    validity_window: Duration,
}

impl RefreshSessionManager {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        user_store: Arc<dyn UserStore>,
        validity_window: Duration,
    ) -> Self {
        Self {
            token_codec,
            user_store,
            validity_window,
        }
    }
}

#[async_trait::async_trait]
impl SessionManager for RefreshSessionManager {
    async fn issue_session(&self, user_id: UserId) -> Result<SessionTokens, AuthError> {
        let (access_token, access_token_expires_at) =
            self.token_codec.sign_access_token(user_id).await?;
        let (refresh_token, refresh_token_expires_at) =
            self.token_codec.sign_refresh_token(user_id).await?;

        let cutoff = Utc::now() - self.validity_window;
        self.user_store.prune_sessions(user_id, cutoff).await?;
        self.user_store
            .push_session(user_id, SessionEntry::new(refresh_token.0.clone()))
            .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
            access_token_expires_at,
            refresh_token_expires_at,
        })
    }

    async fn rotate(&self, refresh_token: &str) -> Result<SessionTokens, AuthError> {
        // Signature and expiry first; nothing is read or written for a token
        // we did not mint or that has outlived its own TTL.
        let user_id = self.token_codec.verify_refresh_token(refresh_token).await?;

        let user = self
            .user_store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let is_live = user
            .sessions
            .iter()
            .any(|entry| entry.token == refresh_token);
        if !is_live {
            // We signed this token but it is no longer live: it was already
            // rotated, logged out or flagged. The likeliest explanation is a
            // replay of a credential the real client has moved past, so every
            // outstanding session for this user is revoked.
            warn!(%user_id, "refresh token replay detected, revoking all sessions");
            self.user_store.clear_sessions(user_id).await?;
            return Err(AuthError::RefreshTokenRevoked);
        }

        let consumed = self.user_store.pull_session(user_id, refresh_token).await?;
        if !consumed {
            // Lost the removal race to a concurrent rotation. Fail closed; a
            // retry here would reopen the double-spend window.
            debug!(%user_id, "refresh token already consumed by concurrent rotation");
            return Err(AuthError::InvalidRefreshToken);
        }

        self.issue_session(user_id).await
    }

    async fn revoke_one(&self, user_id: UserId, refresh_token: &str) {
        // Logout is best-effort and must never surface a failure.
        match self.user_store.pull_session(user_id, refresh_token).await {
            Ok(removed) => debug!(%user_id, removed, "logout revocation"),
            Err(e) => warn!(%user_id, error = %e, "logout revocation failed"),
        }
    }

    async fn revoke_all(&self, user_id: UserId) -> Result<(), AuthError> {
        self.user_store.clear_sessions(user_id).await
    }

    async fn verify_access_token(&self, token: &str) -> Result<UserId, AuthError> {
        self.token_codec.verify_access_token(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtHs256Codec, TokenConfig};
    use crate::infra_memory::MemoryUserStore;
    use chrono::DateTime;

    fn codec() -> Arc<dyn TokenCodec> {
        Arc::new(JwtHs256Codec::new(TokenConfig {
            issuer: "mealvault.test".to_string(),
            audience: "mealvault-client".to_string(),
            access_ttl: std::time::Duration::from_secs(900),
            refresh_ttl: std::time::Duration::from_secs(3600),
            signing_key: b"unit-test-secret".to_vec(),
        }))
    }

    async fn seeded_store() -> (Arc<MemoryUserStore>, UserId) {
        let store = Arc::new(MemoryUserStore::new());
        let user = UserRecord::new(
            UserId(uuid::Uuid::new_v4()),
            "s@example.com".to_string(),
            "S".to_string(),
            "$argon2id$fake".to_string(),
        );
        let user_id = user.user_id;
        store.insert_user(user).await.unwrap();
        (store, user_id)
    }

    /// Store that reports the entry live on read but refuses the conditional
    /// removal, which is what the loser of a rotation race observes.
    struct AlwaysLosesRace {
        inner: MemoryUserStore,
    }

    #[async_trait::async_trait]
    impl UserStore for AlwaysLosesRace {
        async fn ping(&self) -> Result<(), AuthError> {
            self.inner.ping().await
        }
        async fn insert_user(&self, user: UserRecord) -> Result<(), AuthError> {
            self.inner.insert_user(user).await
        }
        async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
            self.inner.find_by_id(user_id).await
        }
        async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
            self.inner.find_by_email(email).await
        }
        async fn push_session(
            &self,
            user_id: UserId,
            entry: SessionEntry,
        ) -> Result<(), AuthError> {
            self.inner.push_session(user_id, entry).await
        }
        async fn pull_session(&self, _user_id: UserId, _token: &str) -> Result<bool, AuthError> {
            Ok(false)
        }
        async fn prune_sessions(
            &self,
            user_id: UserId,
            cutoff: DateTime<Utc>,
        ) -> Result<(), AuthError> {
            self.inner.prune_sessions(user_id, cutoff).await
        }
        async fn clear_sessions(&self, user_id: UserId) -> Result<(), AuthError> {
            self.inner.clear_sessions(user_id).await
        }
    }

    #[tokio::test]
    async fn issue_session_leaves_exactly_one_entry_for_the_new_token() {
        let (store, user_id) = seeded_store().await;
        let manager =
            RefreshSessionManager::new(codec(), store.clone(), Duration::days(14));

        let tokens = manager.issue_session(user_id).await.unwrap();

        let doc = store.find_by_id(user_id).await.unwrap().unwrap();
        let matching = doc
            .sessions
            .iter()
            .filter(|e| e.token == tokens.refresh_token.0)
            .count();
        assert_eq!(matching, 1);
    }

    #[tokio::test]
    async fn issue_session_for_deleted_user_fails() {
        let store = Arc::new(MemoryUserStore::new());
        let manager = RefreshSessionManager::new(codec(), store, Duration::days(14));

        let err = manager
            .issue_session(UserId(uuid::Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn rotate_of_garbage_token_touches_nothing() {
        let (store, user_id) = seeded_store().await;
        let manager =
            RefreshSessionManager::new(codec(), store.clone(), Duration::days(14));
        manager.issue_session(user_id).await.unwrap();

        let err = manager.rotate("not-a-token").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));

        let doc = store.find_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(doc.sessions.len(), 1);
    }

    #[tokio::test]
    async fn rotate_for_deleted_account_fails_user_not_found() {
        let (store, user_id) = seeded_store().await;
        let manager =
            RefreshSessionManager::new(codec(), store.clone(), Duration::days(14));
        let tokens = manager.issue_session(user_id).await.unwrap();

        // Simulate account deletion by pointing a fresh manager at an empty
        // store; the token still carries a valid signature.
        let empty = Arc::new(MemoryUserStore::new());
        let orphaned = RefreshSessionManager::new(codec(), empty, Duration::days(14));

        let err = orphaned.rotate(&tokens.refresh_token.0).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn lost_removal_race_fails_closed_without_minting() {
        let store = Arc::new(AlwaysLosesRace {
            inner: MemoryUserStore::new(),
        });
        let user = UserRecord::new(
            UserId(uuid::Uuid::new_v4()),
            "race@example.com".to_string(),
            "R".to_string(),
            "$argon2id$fake".to_string(),
        );
        let user_id = user.user_id;
        store.insert_user(user).await.unwrap();

        let manager =
            RefreshSessionManager::new(codec(), store.clone(), Duration::days(14));
        let tokens = manager.issue_session(user_id).await.unwrap();

        let err = manager.rotate(&tokens.refresh_token.0).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));

        // The loser must not have issued a replacement entry.
        let doc = store.find_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(doc.sessions.len(), 1);
    }
}
