use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side record of one currently-live refresh token. The signed token
/// string itself is the credential; there is no separate random value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl SessionEntry {
    pub fn new(token: String) -> Self {
        Self {
            token,
            issued_at: Utc::now(),
        }
    }
}

/// Keep only entries issued after the cutoff. Pure; callers fold this into
/// whichever insertion is happening anyway rather than scheduling it.
pub fn prune_expired(entries: Vec<SessionEntry>, cutoff: DateTime<Utc>) -> Vec<SessionEntry> {
    entries
        .into_iter()
        .filter(|entry| entry.issued_at > cutoff)
        .collect()
}
