use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// In-process document store used in development and tests. A `get_mut` on the
/// shard map yields an exclusive reference to one user document, which is
/// exactly the per-document atomic read-modify-write the `UserStore` contract
/// asks for.
pub struct MemoryUserStore {
    users: DashMap<UserId, UserRecord>,
    email_index: DashMap<String, UserId>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            email_index: DashMap::new(),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn ping(&self) -> Result<(), AuthError> {
        Ok(())
    }

    async fn insert_user(&self, user: UserRecord) -> Result<(), AuthError> {
        // Reserve the email first so two concurrent registrations with the
        // same address cannot both insert.
        match self.email_index.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(AuthError::EmailTaken),
            Entry::Vacant(slot) => {
                slot.insert(user.user_id);
            }
        }
        self.users.insert(user.user_id, user);
        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.users.get(&user_id).map(|doc| doc.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let Some(user_id) = self.email_index.get(email).map(|id| *id.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&user_id).map(|doc| doc.value().clone()))
    }

    async fn push_session(&self, user_id: UserId, entry: SessionEntry) -> Result<(), AuthError> {
        let mut doc = self.users.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
        doc.sessions.push(entry);
        Ok(())
    }

    async fn pull_session(&self, user_id: UserId, token: &str) -> Result<bool, AuthError> {
        let Some(mut doc) = self.users.get_mut(&user_id) else {
            return Ok(false);
        };
        match doc.sessions.iter().position(|entry| entry.token == token) {
            Some(index) => {
                doc.sessions.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn prune_sessions(
        &self,
        user_id: UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        if let Some(mut doc) = self.users.get_mut(&user_id) {
            let entries = std::mem::take(&mut doc.sessions);
            doc.sessions = prune_expired(entries, cutoff);
        }
        Ok(())
    }

    async fn clear_sessions(&self, user_id: UserId) -> Result<(), AuthError> {
        if let Some(mut doc) = self.users.get_mut(&user_id) {
            doc.sessions.clear();
        }
        Ok(())
    }
}
