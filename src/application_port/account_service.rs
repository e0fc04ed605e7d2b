use crate::application_port::{AuthError, SessionTokens};
use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthOutcome {
    pub user_id: UserId,
    pub tokens: SessionTokens,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// The user-facing half of the gateway: registration and password login, both
/// ending in `SessionManager::issue_session`, plus profile lookup.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    async fn register(&self, request: RegisterInput) -> Result<AuthOutcome, AuthError>;
    /// Wrong password and unknown email both fail `InvalidCredentials`; the
    /// caller learns nothing about which it was.
    async fn login(&self, request: LoginInput) -> Result<AuthOutcome, AuthError>;
    async fn profile(&self, user_id: UserId) -> Result<ProfileView, AuthError>;
}
