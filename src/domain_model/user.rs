use crate::domain_model::SessionEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct UserId(pub uuid::Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(UserId)
    }
}

/// One document in the store. Session entries live inside the user document so
/// account deletion cascades them and no cross-document transaction is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub sessions: Vec<SessionEntry>,
}

impl UserRecord {
    pub fn new(
        user_id: UserId,
        email: String,
        display_name: String,
        password_hash: String,
    ) -> Self {
        Self {
            user_id,
            email,
            display_name,
            password_hash,
            created_at: Utc::now(),
            sessions: Vec::new(),
        }
    }
}
