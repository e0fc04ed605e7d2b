use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Key-based document store holding one document per user, session entries
/// embedded. Each method is a single-document atomic operation; that atomicity
/// is the only concurrency primitive the session lifecycle relies on. There is
/// no whole-document save: a read-filter-write of the session array would
/// reintroduce the double-spend race that `pull_session` exists to close.
///
/// Implementations fail with `AuthError::Store` when the backing store cannot
/// be reached or rejects the write; the gateway maps that to a 503.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Connection-health probe for the health endpoint.
    async fn ping(&self) -> Result<(), AuthError>;

    /// Fails with `EmailTaken` if a document with this email already exists.
    async fn insert_user(&self, user: UserRecord) -> Result<(), AuthError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Append one session entry. Fails with `UserNotFound` if the document is
    /// gone.
    async fn push_session(&self, user_id: UserId, entry: SessionEntry) -> Result<(), AuthError>;

    /// Conditionally remove the entry whose token equals `token`. Returns
    /// whether an entry was removed; `false` means the entry was already gone
    /// at the time of the write. This is the serialization point for rotation.
    async fn pull_session(&self, user_id: UserId, token: &str) -> Result<bool, AuthError>;

    /// Remove every entry issued at or before `cutoff`. No-op if none match.
    async fn prune_sessions(&self, user_id: UserId, cutoff: DateTime<Utc>)
    -> Result<(), AuthError>;

    /// Remove every entry for the user. No-op if the document is gone.
    async fn clear_sessions(&self, user_id: UserId) -> Result<(), AuthError>;
}
